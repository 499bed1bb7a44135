//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Option codes and negotiation verbs.

use crate::consts;
use std::fmt;

/// A Telnet option code.
///
/// Option codes are opaque to the state machine; this type only adds names for logging and
/// a total order so option sets iterate deterministically.
/// See the [IANA registry](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TelnetOption(u8);

impl TelnetOption {
    /// Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    pub const BINARY: TelnetOption = TelnetOption(consts::option::BINARY);
    /// Echo [RFC857](https://tools.ietf.org/html/rfc857)
    pub const ECHO: TelnetOption = TelnetOption(consts::option::ECHO);
    /// Reconnection
    pub const RCP: TelnetOption = TelnetOption(consts::option::RCP);
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    pub const SGA: TelnetOption = TelnetOption(consts::option::SGA);
    /// Approximate Message Size Negotiation
    pub const NAMS: TelnetOption = TelnetOption(consts::option::NAMS);
    /// Status [RFC859](https://tools.ietf.org/html/rfc859)
    pub const STATUS: TelnetOption = TelnetOption(consts::option::STATUS);
    /// Timing Mark [RFC860](https://tools.ietf.org/html/rfc860)
    pub const TM: TelnetOption = TelnetOption(consts::option::TM);
    /// Remote Controlled Transmission and Echo
    pub const RCTE: TelnetOption = TelnetOption(consts::option::RCTE);
    /// Output Line Width
    pub const NAOL: TelnetOption = TelnetOption(consts::option::NAOL);
    /// Output Page Size
    pub const NAOP: TelnetOption = TelnetOption(consts::option::NAOP);
    /// Output Carriage-Return Disposition
    pub const NAOCRD: TelnetOption = TelnetOption(consts::option::NAOCRD);
    /// Output Horizontal Tab Stops
    pub const NAOHTS: TelnetOption = TelnetOption(consts::option::NAOHTS);
    /// Output Horizontal Tab Disposition
    pub const NAOHTD: TelnetOption = TelnetOption(consts::option::NAOHTD);
    /// Output Formfeed Disposition
    pub const NAOFFD: TelnetOption = TelnetOption(consts::option::NAOFFD);
    /// Output Vertical Tabstops
    pub const NAOVTS: TelnetOption = TelnetOption(consts::option::NAOVTS);
    /// Output Vertical Tab Disposition
    pub const NAOVTD: TelnetOption = TelnetOption(consts::option::NAOVTD);
    /// Output Linefeed Disposition
    pub const NAOLFD: TelnetOption = TelnetOption(consts::option::NAOLFD);
    /// Extended ASCII
    pub const XASCII: TelnetOption = TelnetOption(consts::option::XASCII);
    /// Logout
    pub const LOGOUT: TelnetOption = TelnetOption(consts::option::LOGOUT);
    /// Byte Macro
    pub const BM: TelnetOption = TelnetOption(consts::option::BM);
    /// Data Entry Terminal
    pub const DET: TelnetOption = TelnetOption(consts::option::DET);
    /// SUPDUP
    pub const SUPDUP: TelnetOption = TelnetOption(consts::option::SUPDUP);
    /// SUPDUP Output
    pub const SUPDUP_OUTPUT: TelnetOption = TelnetOption(consts::option::SUPDUP_OUTPUT);
    /// Send Location
    pub const SNDLOC: TelnetOption = TelnetOption(consts::option::SNDLOC);
    /// Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091)
    pub const TTYPE: TelnetOption = TelnetOption(consts::option::TTYPE);
    /// End of Record
    pub const EOR: TelnetOption = TelnetOption(consts::option::EOR);
    /// TACACS User Identification
    pub const TUID: TelnetOption = TelnetOption(consts::option::TUID);
    /// Output Marking
    pub const OUTMRK: TelnetOption = TelnetOption(consts::option::OUTMRK);
    /// Terminal Location Number
    pub const TTYLOC: TelnetOption = TelnetOption(consts::option::TTYLOC);
    /// Telnet 3270 Regime
    pub const VT3270REGIME: TelnetOption = TelnetOption(consts::option::VT3270REGIME);
    /// X.3 PAD
    pub const X3PAD: TelnetOption = TelnetOption(consts::option::X3PAD);
    /// Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    pub const NAWS: TelnetOption = TelnetOption(consts::option::NAWS);
    /// Terminal Speed
    pub const TSPEED: TelnetOption = TelnetOption(consts::option::TSPEED);
    /// Remote Flow Control
    pub const LFLOW: TelnetOption = TelnetOption(consts::option::LFLOW);
    /// Linemode [RFC1184](https://tools.ietf.org/html/rfc1184)
    pub const LINEMODE: TelnetOption = TelnetOption(consts::option::LINEMODE);
    /// X Display Location
    pub const XDISPLOC: TelnetOption = TelnetOption(consts::option::XDISPLOC);
    /// Environment Option
    pub const OLD_ENVIRON: TelnetOption = TelnetOption(consts::option::OLD_ENVIRON);
    /// Authentication Option
    pub const AUTHENTICATION: TelnetOption = TelnetOption(consts::option::AUTHENTICATION);
    /// Encryption Option
    pub const ENCRYPT: TelnetOption = TelnetOption(consts::option::ENCRYPT);
    /// New Environment Option
    pub const NEW_ENVIRON: TelnetOption = TelnetOption(consts::option::NEW_ENVIRON);
    /// TN3270E
    pub const TN3270E: TelnetOption = TelnetOption(consts::option::TN3270E);
    /// XAUTH
    pub const XAUTH: TelnetOption = TelnetOption(consts::option::XAUTH);
    /// Charset
    pub const CHARSET: TelnetOption = TelnetOption(consts::option::CHARSET);
    /// Remote Serial Port
    pub const RSP: TelnetOption = TelnetOption(consts::option::RSP);
    /// Com Port Control [RFC2217](https://tools.ietf.org/html/rfc2217)
    pub const COM_PORT_OPTION: TelnetOption = TelnetOption(consts::option::COM_PORT_OPTION);
    /// Suppress Local Echo
    pub const SUPPRESS_LOCAL_ECHO: TelnetOption =
        TelnetOption(consts::option::SUPPRESS_LOCAL_ECHO);
    /// Start TLS
    pub const START_TLS: TelnetOption = TelnetOption(consts::option::START_TLS);
    /// Kermit
    pub const KERMIT: TelnetOption = TelnetOption(consts::option::KERMIT);
    /// Send URL
    pub const SEND_URL: TelnetOption = TelnetOption(consts::option::SEND_URL);
    /// Forward X
    pub const FORWARD_X: TelnetOption = TelnetOption(consts::option::FORWARD_X);
    /// Pragma Logon
    pub const PRAGMA_LOGON: TelnetOption = TelnetOption(consts::option::PRAGMA_LOGON);
    /// SSPI Logon
    pub const SSPI_LOGON: TelnetOption = TelnetOption(consts::option::SSPI_LOGON);
    /// Pragma Heartbeat
    pub const PRAGMA_HEARTBEAT: TelnetOption = TelnetOption(consts::option::PRAGMA_HEARTBEAT);
    /// Extended Options List
    pub const EXOPL: TelnetOption = TelnetOption(consts::option::EXOPL);

    /// Wrap a raw option code.
    pub const fn new(code: u8) -> TelnetOption {
        TelnetOption(code)
    }

    /// The option code as sent on the wire.
    pub const fn to_u8(self) -> u8 {
        self.0
    }

    /// Registered name of this option, if it has one.
    pub fn name(self) -> Option<&'static str> {
        use consts::option::*;
        Some(match self.0 {
            BINARY => "BINARY",
            ECHO => "ECHO",
            RCP => "RCP",
            SGA => "SGA",
            NAMS => "NAMS",
            STATUS => "STATUS",
            TM => "TIMING-MARK",
            RCTE => "RCTE",
            NAOL => "NAOL",
            NAOP => "NAOP",
            NAOCRD => "NAOCRD",
            NAOHTS => "NAOHTS",
            NAOHTD => "NAOHTD",
            NAOFFD => "NAOFFD",
            NAOVTS => "NAOVTS",
            NAOVTD => "NAOVTD",
            NAOLFD => "NAOLFD",
            XASCII => "XASCII",
            LOGOUT => "LOGOUT",
            BM => "BM",
            DET => "DET",
            SUPDUP => "SUPDUP",
            SUPDUP_OUTPUT => "SUPDUP-OUTPUT",
            SNDLOC => "SNDLOC",
            TTYPE => "TTYPE",
            EOR => "EOR",
            TUID => "TUID",
            OUTMRK => "OUTMRK",
            TTYLOC => "TTYLOC",
            VT3270REGIME => "3270-REGIME",
            X3PAD => "X.3-PAD",
            NAWS => "NAWS",
            TSPEED => "TSPEED",
            LFLOW => "LFLOW",
            LINEMODE => "LINEMODE",
            XDISPLOC => "XDISPLOC",
            OLD_ENVIRON => "OLD-ENVIRON",
            AUTHENTICATION => "AUTHENTICATION",
            ENCRYPT => "ENCRYPT",
            NEW_ENVIRON => "NEW-ENVIRON",
            TN3270E => "TN3270E",
            XAUTH => "XAUTH",
            CHARSET => "CHARSET",
            RSP => "RSP",
            COM_PORT_OPTION => "COM-PORT-OPTION",
            SUPPRESS_LOCAL_ECHO => "SUPPRESS-LOCAL-ECHO",
            START_TLS => "START-TLS",
            KERMIT => "KERMIT",
            SEND_URL => "SEND-URL",
            FORWARD_X => "FORWARD-X",
            PRAGMA_LOGON => "PRAGMA-LOGON",
            SSPI_LOGON => "SSPI-LOGON",
            PRAGMA_HEARTBEAT => "PRAGMA-HEARTBEAT",
            EXOPL => "EXOPL",
            _ => return None,
        })
    }
}

impl From<u8> for TelnetOption {
    fn from(code: u8) -> Self {
        TelnetOption(code)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.0
    }
}

impl fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "OPTION-{}", self.0),
        }
    }
}

/// The four option negotiation verbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NegotiationCommand {
    /// Sender offers to perform the option
    Will,
    /// Sender refuses to perform the option
    Wont,
    /// Sender asks the receiver to perform the option
    Do,
    /// Sender asks the receiver not to perform the option
    Dont,
}

impl NegotiationCommand {
    /// Command byte for this verb.
    pub const fn to_u8(self) -> u8 {
        match self {
            NegotiationCommand::Will => consts::WILL,
            NegotiationCommand::Wont => consts::WONT,
            NegotiationCommand::Do => consts::DO,
            NegotiationCommand::Dont => consts::DONT,
        }
    }

    /// Parse a command byte, returning `None` for anything that is not a negotiation verb.
    pub const fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            consts::WILL => Some(NegotiationCommand::Will),
            consts::WONT => Some(NegotiationCommand::Wont),
            consts::DO => Some(NegotiationCommand::Do),
            consts::DONT => Some(NegotiationCommand::Dont),
            _ => None,
        }
    }

    /// `true` for WILL and WONT, which describe the sender's own side of an option.
    pub const fn is_sender_side(self) -> bool {
        matches!(self, NegotiationCommand::Will | NegotiationCommand::Wont)
    }
}

impl fmt::Display for NegotiationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationCommand::Will => write!(f, "WILL"),
            NegotiationCommand::Wont => write!(f, "WONT"),
            NegotiationCommand::Do => write!(f, "DO"),
            NegotiationCommand::Dont => write!(f, "DONT"),
        }
    }
}

/// A single `IAC <verb> <option>` sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Negotiation {
    /// Negotiation verb
    pub command: NegotiationCommand,
    /// Option being negotiated
    pub option: TelnetOption,
}

impl Negotiation {
    /// Create a negotiation from its parts.
    pub fn new(command: NegotiationCommand, option: impl Into<TelnetOption>) -> Self {
        Negotiation {
            command,
            option: option.into(),
        }
    }

    /// `IAC WILL <option>`
    pub fn will(option: impl Into<TelnetOption>) -> Self {
        Negotiation::new(NegotiationCommand::Will, option)
    }

    /// `IAC WONT <option>`
    pub fn wont(option: impl Into<TelnetOption>) -> Self {
        Negotiation::new(NegotiationCommand::Wont, option)
    }

    /// `IAC DO <option>`
    pub fn do_(option: impl Into<TelnetOption>) -> Self {
        Negotiation::new(NegotiationCommand::Do, option)
    }

    /// `IAC DONT <option>`
    pub fn dont(option: impl Into<TelnetOption>) -> Self {
        Negotiation::new(NegotiationCommand::Dont, option)
    }

    /// Wire encoding.
    pub const fn to_bytes(&self) -> [u8; 3] {
        [consts::IAC, self.command.to_u8(), self.option.to_u8()]
    }
}

impl fmt::Display for Negotiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.option)
    }
}
