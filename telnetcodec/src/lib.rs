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

//! # Telwire Telnet Codec
//!
//! Byte-level framing for the Telnet protocol (RFC 854/855). This crate classifies every
//! incoming byte as application data, a command, or an option negotiation, and hands complete
//! frames to its caller. It does no I/O and has no opinion about what options mean.
//!
//! ## Core Components
//!
//! ### [`TelnetFsm`]
//!
//! The byte-stream state machine. [`TelnetFsm::step`] advances it by one byte. It also
//! implements `tokio_util::codec::Decoder` so it can sit under a `FramedRead`, where runs of
//! data are coalesced into one frame, and `Encoder<TelnetFrame>` for the reverse direction.
//!
//! ### [`TelnetFrame`]
//!
//! - `Data`: application bytes with `IAC IAC` collapsed to a single 0xFF
//! - `Command`: a single command byte such as `[AYT]`, or a whole `[SB .. SE]` subnegotiation
//! - `Negotiation`: a verb and option pair such as `DO ECHO`
//!
//! ### [`TelnetOption`] and [`NegotiationCommand`]
//!
//! Typed wrappers over option codes and the WILL/WONT/DO/DONT verbs. Option codes stay
//! opaque; the names are only for logs.
//!
//! ## Usage Example
//!
//! ```rust
//! use bytes::BytesMut;
//! use telwire_telnetcodec::{TelnetFrame, TelnetFsm, consts};
//! use tokio_util::codec::Decoder;
//!
//! let mut fsm = TelnetFsm::new();
//! let mut input = BytesMut::from(&[b'h', b'i', consts::IAC, consts::AYT][..]);
//!
//! assert_eq!(
//!     fsm.decode(&mut input).unwrap(),
//!     Some(TelnetFrame::Data(bytes::Bytes::from_static(b"hi")))
//! );
//! assert_eq!(
//!     fsm.decode(&mut input).unwrap(),
//!     Some(TelnetFrame::Command(bytes::Bytes::from_static(&[consts::AYT])))
//! );
//! ```
//!
//! ## Protocol Details
//!
//! - 2-byte commands: `IAC <command>` (e.g., `IAC NOP`)
//! - 3-byte negotiation: `IAC <DO|DONT|WILL|WONT> <option>`
//! - Subnegotiation: `IAC SB <option> <data...> IAC SE`
//!
//! A literal 0xFF is sent as `IAC IAC`, both in data and inside subnegotiation payloads.
//! A subnegotiation interrupted by anything other than `IAC SE` or `IAC IAC` is a protocol
//! violation: the frame is dropped with a warning, the next byte is discarded, and parsing
//! resumes in the data state.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod codec;
pub mod consts;
mod frame;
mod options;
mod result;

pub use self::codec::{
    FsmState, TelnetFsm, encode_command, encode_data, encode_negotiation, encode_subnegotiation,
    escape_iac,
};
pub use self::frame::TelnetFrame;
pub use self::options::{Negotiation, NegotiationCommand, TelnetOption};
pub use self::result::{CodecError, CodecResult};

#[cfg(test)]
mod tests {
    use super::{FsmState, TelnetFrame, TelnetFsm};
    use bytes::{Bytes, BytesMut};
    use tokio_util::codec::Decoder;

    #[test]
    fn telnet_decode_line() {
        let mut fsm = TelnetFsm::new();
        let mut input = BytesMut::from("Terminated line\r\n");
        assert_eq!(
            fsm.decode(&mut input).unwrap(),
            Some(TelnetFrame::Data(Bytes::from_static(b"Terminated line\r\n")))
        );
        assert_eq!(fsm.decode(&mut input).unwrap(), None);
        assert_eq!(fsm.state(), FsmState::Data);
    }
}
