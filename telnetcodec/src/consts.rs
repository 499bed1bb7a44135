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

//! Telnet protocol byte values.
//!
//! Command bytes follow RFC 854. Option codes follow the IANA "Telnet Options" registry.

/// Interpret As Command
pub const IAC: u8 = 255;
/// Demand the peer stop performing an option
pub const DONT: u8 = 254;
/// Request the peer perform an option
pub const DO: u8 = 253;
/// Refuse to perform an option
pub const WONT: u8 = 252;
/// Offer to perform an option
pub const WILL: u8 = 251;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Go Ahead
pub const GA: u8 = 249;
/// Erase Line
pub const EL: u8 = 248;
/// Erase Character
pub const EC: u8 = 247;
/// Are You There
pub const AYT: u8 = 246;
/// Abort Output
pub const AO: u8 = 245;
/// Interrupt Process
pub const IP: u8 = 244;
/// Break
pub const BRK: u8 = 243;
/// Data Mark
pub const DM: u8 = 242;
/// No Operation
pub const NOP: u8 = 241;
/// Subnegotiation End
pub const SE: u8 = 240;
/// End of Record (RFC 885)
pub const EOR: u8 = 239;

/// Null
pub const NUL: u8 = 0x00;
/// Line Feed
pub const LF: u8 = 0x0A;
/// Carriage Return
pub const CR: u8 = 0x0D;

/// Option codes.
pub mod option {
    /// Binary Transmission (RFC 856)
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857)
    pub const ECHO: u8 = 1;
    /// Reconnection
    pub const RCP: u8 = 2;
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Approx Message Size Negotiation
    pub const NAMS: u8 = 4;
    /// Status (RFC 859)
    pub const STATUS: u8 = 5;
    /// Timing Mark (RFC 860)
    pub const TM: u8 = 6;
    /// Remote Controlled Trans and Echo (RFC 726)
    pub const RCTE: u8 = 7;
    /// Output Line Width
    pub const NAOL: u8 = 8;
    /// Output Page Size
    pub const NAOP: u8 = 9;
    /// Output Carriage-Return Disposition (RFC 652)
    pub const NAOCRD: u8 = 10;
    /// Output Horizontal Tab Stops (RFC 653)
    pub const NAOHTS: u8 = 11;
    /// Output Horizontal Tab Disposition (RFC 654)
    pub const NAOHTD: u8 = 12;
    /// Output Formfeed Disposition (RFC 655)
    pub const NAOFFD: u8 = 13;
    /// Output Vertical Tabstops (RFC 656)
    pub const NAOVTS: u8 = 14;
    /// Output Vertical Tab Disposition (RFC 657)
    pub const NAOVTD: u8 = 15;
    /// Output Linefeed Disposition (RFC 658)
    pub const NAOLFD: u8 = 16;
    /// Extended ASCII (RFC 698)
    pub const XASCII: u8 = 17;
    /// Logout (RFC 727)
    pub const LOGOUT: u8 = 18;
    /// Byte Macro (RFC 735)
    pub const BM: u8 = 19;
    /// Data Entry Terminal (RFC 1043)
    pub const DET: u8 = 20;
    /// SUPDUP (RFC 736)
    pub const SUPDUP: u8 = 21;
    /// SUPDUP Output (RFC 749)
    pub const SUPDUP_OUTPUT: u8 = 22;
    /// Send Location (RFC 779)
    pub const SNDLOC: u8 = 23;
    /// Terminal Type (RFC 1091)
    pub const TTYPE: u8 = 24;
    /// End of Record (RFC 885)
    pub const EOR: u8 = 25;
    /// TACACS User Identification (RFC 927)
    pub const TUID: u8 = 26;
    /// Output Marking (RFC 933)
    pub const OUTMRK: u8 = 27;
    /// Terminal Location Number (RFC 946)
    pub const TTYLOC: u8 = 28;
    /// Telnet 3270 Regime (RFC 1041)
    pub const VT3270REGIME: u8 = 29;
    /// X.3 PAD (RFC 1053)
    pub const X3PAD: u8 = 30;
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: u8 = 31;
    /// Terminal Speed (RFC 1079)
    pub const TSPEED: u8 = 32;
    /// Remote Flow Control (RFC 1372)
    pub const LFLOW: u8 = 33;
    /// Linemode (RFC 1184)
    pub const LINEMODE: u8 = 34;
    /// X Display Location (RFC 1096)
    pub const XDISPLOC: u8 = 35;
    /// Environment Option (RFC 1408)
    pub const OLD_ENVIRON: u8 = 36;
    /// Authentication Option (RFC 2941)
    pub const AUTHENTICATION: u8 = 37;
    /// Encryption Option (RFC 2946)
    pub const ENCRYPT: u8 = 38;
    /// New Environment Option (RFC 1572)
    pub const NEW_ENVIRON: u8 = 39;
    /// TN3270E (RFC 2355)
    pub const TN3270E: u8 = 40;
    /// XAUTH
    pub const XAUTH: u8 = 41;
    /// Charset (RFC 2066)
    pub const CHARSET: u8 = 42;
    /// Telnet Remote Serial Port
    pub const RSP: u8 = 43;
    /// Com Port Control Option (RFC 2217)
    pub const COM_PORT_OPTION: u8 = 44;
    /// Telnet Suppress Local Echo
    pub const SUPPRESS_LOCAL_ECHO: u8 = 45;
    /// Telnet Start TLS
    pub const START_TLS: u8 = 46;
    /// Kermit (RFC 2840)
    pub const KERMIT: u8 = 47;
    /// Send URL
    pub const SEND_URL: u8 = 48;
    /// Forward X
    pub const FORWARD_X: u8 = 49;
    /// Telnet Option Pragma Logon
    pub const PRAGMA_LOGON: u8 = 138;
    /// Telnet Option SSPI Logon
    pub const SSPI_LOGON: u8 = 139;
    /// Telnet Option Pragma Heartbeat
    pub const PRAGMA_HEARTBEAT: u8 = 140;
    /// Extended Options List (RFC 861)
    pub const EXOPL: u8 = 255;
}
