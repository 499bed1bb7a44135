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

//! Frames produced by the byte-stream state machine.

use crate::{Negotiation, TelnetOption, consts};
use bytes::Bytes;

/// One unit of decoded Telnet input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetFrame {
    /// Application data with IAC escaping already removed.
    Data(Bytes),
    /// A command frame.
    ///
    /// Either a single command byte (`[AYT]`, `[NOP]`, ...) or a complete subnegotiation
    /// `[SB, option, payload.., SE]` with escaped IACs in the payload collapsed.
    Command(Bytes),
    /// An `IAC <verb> <option>` negotiation.
    Negotiation(Negotiation),
}

impl TelnetFrame {
    /// `true` if this is a complete `SB .. SE` frame.
    pub fn is_subnegotiation(&self) -> bool {
        matches!(self, TelnetFrame::Command(bytes) if bytes.first() == Some(&consts::SB))
    }

    /// Option code of a subnegotiation frame.
    pub fn subnegotiation_option(&self) -> Option<TelnetOption> {
        match self {
            TelnetFrame::Command(bytes) if bytes.len() >= 3 && bytes[0] == consts::SB => {
                Some(TelnetOption::from(bytes[1]))
            }
            _ => None,
        }
    }

    /// Payload of a subnegotiation frame, between the option code and SE.
    pub fn subnegotiation_payload(&self) -> Option<&[u8]> {
        match self {
            TelnetFrame::Command(bytes) if bytes.len() >= 3 && bytes[0] == consts::SB => {
                Some(&bytes[2..bytes.len() - 1])
            }
            _ => None,
        }
    }
}

impl From<Negotiation> for TelnetFrame {
    fn from(negotiation: Negotiation) -> Self {
        TelnetFrame::Negotiation(negotiation)
    }
}
