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

//! Byte-stream state machine and its `tokio_util` codec implementation.

use crate::{CodecError, Negotiation, NegotiationCommand, TelnetFrame, TelnetOption, consts};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

/// States of the byte-stream state machine.
///
/// `Data` is the initial state. `Error` is entered on a protocol violation and left on the
/// next byte, which is discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FsmState {
    /// Plain application data.
    #[default]
    Data,
    /// An IAC has been seen.
    Command,
    /// A negotiation verb has been seen; the next byte is the option code.
    OptionNegotiation,
    /// Inside an `SB .. IAC SE` frame.
    Subnegotiation,
    /// An IAC has been seen inside a subnegotiation.
    SubnegotiationEnd,
    /// A malformed subnegotiation was dropped.
    Error,
}

/// Result of a single transition.
enum Step {
    Data(u8),
    Frame(TelnetFrame),
}

/// Telnet byte-stream state machine.
///
/// Feed it one byte at a time through [`TelnetFsm::step`], or use it as a
/// [`Decoder`] with `FramedRead`, in which case runs of data bytes are coalesced into a single
/// [`TelnetFrame::Data`]. A data batch never spans a command: pending data is returned the
/// moment an IAC leaves the `Data` state.
///
/// The same type is an [`Encoder`] for [`TelnetFrame`], applying IAC escaping on the way out.
#[derive(Debug, Default)]
pub struct TelnetFsm {
    state: FsmState,
    command: BytesMut,
    pending: BytesMut,
}

impl TelnetFsm {
    /// Create a state machine in [`FsmState::Data`] with an empty command buffer.
    pub fn new() -> TelnetFsm {
        TelnetFsm::default()
    }

    /// Current state.
    pub fn state(&self) -> FsmState {
        self.state
    }

    /// Bytes of the command or subnegotiation currently being assembled.
    pub fn command_buffer(&self) -> &[u8] {
        &self.command
    }

    /// Advance by one byte.
    ///
    /// Returns a one-byte [`TelnetFrame::Data`] for every data byte (including an escaped IAC),
    /// a [`TelnetFrame::Command`] when a single-byte command or a subnegotiation completes,
    /// and a [`TelnetFrame::Negotiation`] when an option code follows a negotiation verb.
    pub fn step(&mut self, byte: u8) -> Option<TelnetFrame> {
        match self.advance(byte)? {
            Step::Data(byte) => Some(TelnetFrame::Data(Bytes::copy_from_slice(&[byte]))),
            Step::Frame(frame) => Some(frame),
        }
    }

    fn advance(&mut self, byte: u8) -> Option<Step> {
        match (self.state, byte) {
            (FsmState::Data, consts::IAC) => {
                self.state = FsmState::Command;
                None
            }
            (FsmState::Data, _) => Some(Step::Data(byte)),
            (FsmState::Command, consts::IAC) => {
                self.state = FsmState::Data;
                Some(Step::Data(consts::IAC))
            }
            (FsmState::Command, consts::DO | consts::DONT | consts::WILL | consts::WONT) => {
                self.command.clear();
                self.command.put_u8(byte);
                self.state = FsmState::OptionNegotiation;
                None
            }
            (FsmState::Command, consts::SB) => {
                self.command.clear();
                self.command.put_u8(byte);
                self.state = FsmState::Subnegotiation;
                None
            }
            (FsmState::Command, _) => {
                self.command.clear();
                self.command.put_u8(byte);
                self.state = FsmState::Data;
                trace!(command = byte, "Command received");
                Some(Step::Frame(TelnetFrame::Command(
                    self.command.split().freeze(),
                )))
            }
            (FsmState::OptionNegotiation, _) => {
                self.command.put_u8(byte);
                let verb = self.command.first().copied();
                self.command.clear();
                self.state = FsmState::Data;
                verb.and_then(NegotiationCommand::from_u8).map(|command| {
                    let negotiation = Negotiation::new(command, TelnetOption::from(byte));
                    trace!(%negotiation, "Negotiation received");
                    Step::Frame(TelnetFrame::Negotiation(negotiation))
                })
            }
            (FsmState::Subnegotiation, consts::IAC) => {
                self.state = FsmState::SubnegotiationEnd;
                None
            }
            (FsmState::Subnegotiation, _) => {
                self.command.put_u8(byte);
                None
            }
            (FsmState::SubnegotiationEnd, consts::SE) => {
                self.command.put_u8(byte);
                self.state = FsmState::Data;
                trace!(length = self.command.len(), "Subnegotiation received");
                Some(Step::Frame(TelnetFrame::Command(
                    self.command.split().freeze(),
                )))
            }
            (FsmState::SubnegotiationEnd, consts::IAC) => {
                self.command.put_u8(byte);
                self.state = FsmState::Subnegotiation;
                None
            }
            (FsmState::SubnegotiationEnd, _) => {
                warn!(
                    byte,
                    buffered = self.command.len(),
                    "Protocol violation: subnegotiation not terminated by IAC SE, dropping frame"
                );
                self.command.clear();
                self.state = FsmState::Error;
                None
            }
            (FsmState::Error, _) => {
                warn!(byte, "Discarding byte after protocol violation, resuming data");
                self.state = FsmState::Data;
                None
            }
        }
    }
}

impl Decoder for TelnetFsm {
    type Item = TelnetFrame;
    type Error = CodecError;

    /// Decodes frames out of `src`, consuming every byte it is given.
    ///
    /// Data bytes are buffered internally and handed out as one [`TelnetFrame::Data`] either
    /// when the state machine leaves `Data` or when `src` runs dry. Command and negotiation
    /// frames are returned as soon as they complete.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetFrame>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            match self.advance(byte) {
                Some(Step::Data(byte)) => self.pending.put_u8(byte),
                Some(Step::Frame(frame)) => return Ok(Some(frame)),
                None => {}
            }
            if self.state != FsmState::Data && !self.pending.is_empty() {
                return Ok(Some(TelnetFrame::Data(self.pending.split().freeze())));
            }
        }
        if self.pending.is_empty() {
            Ok(None)
        } else {
            Ok(Some(TelnetFrame::Data(self.pending.split().freeze())))
        }
    }
}

impl Encoder<TelnetFrame> for TelnetFsm {
    type Error = CodecError;

    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            TelnetFrame::Data(data) => escape_iac(&data, dst),
            TelnetFrame::Negotiation(negotiation) => dst.put_slice(&negotiation.to_bytes()),
            TelnetFrame::Command(command) => match command.as_ref() {
                [] => {
                    return Err(CodecError::InvalidFrame {
                        reason: "empty command".to_string(),
                    });
                }
                [consts::SB, body @ .., consts::SE] => {
                    dst.reserve(body.len() + 4);
                    dst.put_u8(consts::IAC);
                    dst.put_u8(consts::SB);
                    escape_iac(body, dst);
                    dst.put_u8(consts::IAC);
                    dst.put_u8(consts::SE);
                }
                [consts::SB, ..] => {
                    return Err(CodecError::InvalidFrame {
                        reason: "subnegotiation without SE".to_string(),
                    });
                }
                [byte] => {
                    dst.put_u8(consts::IAC);
                    dst.put_u8(*byte);
                }
                _ => {
                    return Err(CodecError::InvalidFrame {
                        reason: format!("{} byte command is not a subnegotiation", command.len()),
                    });
                }
            },
        }
        Ok(())
    }
}

/// Append `data` to `dst`, doubling every IAC.
pub fn escape_iac(data: &[u8], dst: &mut BytesMut) {
    dst.reserve(data.len());
    for &byte in data {
        if byte == consts::IAC {
            dst.put_u8(consts::IAC);
        }
        dst.put_u8(byte);
    }
}

/// Encode application data for the wire.
pub fn encode_data(data: &[u8]) -> Bytes {
    let mut buffer = BytesMut::with_capacity(data.len());
    escape_iac(data, &mut buffer);
    buffer.freeze()
}

/// Encode `IAC <command>`.
pub fn encode_command(command: u8) -> Bytes {
    Bytes::copy_from_slice(&[consts::IAC, command])
}

/// Encode `IAC <verb> <option>`.
pub fn encode_negotiation(negotiation: Negotiation) -> Bytes {
    Bytes::copy_from_slice(&negotiation.to_bytes())
}

/// Encode `IAC SB <option> <payload> IAC SE`, doubling IACs in the option and payload.
pub fn encode_subnegotiation(option: TelnetOption, payload: &[u8]) -> Bytes {
    let mut buffer = BytesMut::with_capacity(payload.len() + 6);
    buffer.put_u8(consts::IAC);
    buffer.put_u8(consts::SB);
    escape_iac(&[option.to_u8()], &mut buffer);
    escape_iac(payload, &mut buffer);
    buffer.put_u8(consts::IAC);
    buffer.put_u8(consts::SE);
    buffer.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::option::{ECHO, SGA};
    use crate::consts::{AO, AYT, DO, IAC, SB, SE, WILL};
    use tracing_test::traced_test;

    fn run(fsm: &mut TelnetFsm, input: &[u8]) -> (Vec<FsmState>, Vec<TelnetFrame>) {
        let mut states = Vec::new();
        let mut frames = Vec::new();
        for &byte in input {
            if let Some(frame) = fsm.step(byte) {
                frames.push(frame);
            }
            states.push(fsm.state());
        }
        (states, frames)
    }

    fn decode_all(input: &[u8]) -> Vec<TelnetFrame> {
        let mut fsm = TelnetFsm::new();
        let mut src = BytesMut::from(input);
        let mut frames = Vec::new();
        while let Some(frame) = fsm.decode(&mut src).unwrap() {
            frames.push(frame);
        }
        frames
    }

    fn data(bytes: &[u8]) -> TelnetFrame {
        TelnetFrame::Data(Bytes::copy_from_slice(bytes))
    }

    fn command(bytes: &[u8]) -> TelnetFrame {
        TelnetFrame::Command(Bytes::copy_from_slice(bytes))
    }

    // ============================================================================
    // Step
    // ============================================================================

    #[test]
    fn plain_data_stays_in_data_state() {
        let mut fsm = TelnetFsm::new();
        let (states, frames) = run(&mut fsm, &[10, 20, 5, 12, 34, 125, 98]);
        assert!(states.iter().all(|s| *s == FsmState::Data));
        let bytes: Vec<u8> = frames
            .into_iter()
            .flat_map(|f| match f {
                TelnetFrame::Data(b) => b.to_vec(),
                other => panic!("unexpected frame {other:?}"),
            })
            .collect();
        assert_eq!(bytes, vec![10, 20, 5, 12, 34, 125, 98]);
    }

    #[test]
    fn negotiations_between_data() {
        let mut fsm = TelnetFsm::new();
        let (states, frames) = run(&mut fsm, &[IAC, DO, ECHO, 10, 20, IAC, WILL, SGA]);
        assert_eq!(
            states,
            vec![
                FsmState::Command,
                FsmState::OptionNegotiation,
                FsmState::Data,
                FsmState::Data,
                FsmState::Data,
                FsmState::Command,
                FsmState::OptionNegotiation,
                FsmState::Data,
            ]
        );
        assert_eq!(
            frames,
            vec![
                TelnetFrame::Negotiation(Negotiation::do_(TelnetOption::ECHO)),
                data(&[10]),
                data(&[20]),
                TelnetFrame::Negotiation(Negotiation::will(TelnetOption::SGA)),
            ]
        );
    }

    #[test]
    fn single_byte_commands() {
        let mut fsm = TelnetFsm::new();
        let (states, frames) = run(&mut fsm, &[10, 20, IAC, AYT, 5, IAC, AO]);
        assert_eq!(
            states,
            vec![
                FsmState::Data,
                FsmState::Data,
                FsmState::Command,
                FsmState::Data,
                FsmState::Data,
                FsmState::Command,
                FsmState::Data,
            ]
        );
        assert_eq!(
            frames,
            vec![
                data(&[10]),
                data(&[20]),
                command(&[AYT]),
                data(&[5]),
                command(&[AO]),
            ]
        );
        assert!(fsm.command_buffer().is_empty());
    }

    #[test]
    fn subnegotiation_frame() {
        let mut fsm = TelnetFsm::new();
        let (states, frames) = run(&mut fsm, &[10, IAC, SB, 5, 12, IAC, SE]);
        assert_eq!(
            states,
            vec![
                FsmState::Data,
                FsmState::Command,
                FsmState::Subnegotiation,
                FsmState::Subnegotiation,
                FsmState::Subnegotiation,
                FsmState::SubnegotiationEnd,
                FsmState::Data,
            ]
        );
        assert_eq!(frames, vec![data(&[10]), command(&[SB, 5, 12, SE])]);
        assert!(fsm.command_buffer().is_empty());
    }

    #[test]
    fn escaped_iac_in_data() {
        let mut fsm = TelnetFsm::new();
        let (states, frames) = run(&mut fsm, &[1, IAC, IAC, 2]);
        assert_eq!(
            states,
            vec![FsmState::Data, FsmState::Command, FsmState::Data, FsmState::Data]
        );
        assert_eq!(frames, vec![data(&[1]), data(&[IAC]), data(&[2])]);
    }

    #[test]
    fn escaped_iac_in_subnegotiation() {
        let mut fsm = TelnetFsm::new();
        let (states, frames) = run(&mut fsm, &[IAC, SB, 24, IAC, IAC, 7, IAC, SE]);
        assert_eq!(states[3], FsmState::SubnegotiationEnd);
        assert_eq!(states[4], FsmState::Subnegotiation);
        assert_eq!(frames, vec![command(&[SB, 24, IAC, 7, SE])]);
    }

    #[test]
    fn command_buffer_tracks_subnegotiation() {
        let mut fsm = TelnetFsm::new();
        run(&mut fsm, &[IAC, SB, 31, 0, 80]);
        assert_eq!(fsm.state(), FsmState::Subnegotiation);
        assert_eq!(fsm.command_buffer(), &[SB, 31, 0, 80]);
    }

    #[test]
    fn negotiation_returns_to_data_for_any_option() {
        let mut fsm = TelnetFsm::new();
        for option in [0u8, 99, 200, 255] {
            let frame = run(&mut fsm, &[IAC, DO, option]).1;
            assert_eq!(
                frame,
                vec![TelnetFrame::Negotiation(Negotiation::do_(option))]
            );
            assert_eq!(fsm.state(), FsmState::Data);
        }
    }

    #[test]
    #[traced_test]
    fn malformed_subnegotiation_is_dropped() {
        let mut fsm = TelnetFsm::new();
        let (states, frames) = run(&mut fsm, &[IAC, SB, 24, 1, IAC, 65, 66, 67]);
        assert_eq!(
            &states[4..],
            &[
                FsmState::SubnegotiationEnd,
                FsmState::Error,
                FsmState::Data,
                FsmState::Data,
            ]
        );
        assert_eq!(frames, vec![data(&[67])]);
        assert!(fsm.command_buffer().is_empty());
        assert!(logs_contain("Protocol violation"));
    }

    // ============================================================================
    // Decoder
    // ============================================================================

    #[test]
    fn decoder_coalesces_data_around_commands() {
        assert_eq!(
            decode_all(&[10, 20, IAC, AYT, 5, IAC, AO]),
            vec![data(&[10, 20]), command(&[AYT]), data(&[5]), command(&[AO])]
        );
    }

    #[test]
    fn decoder_keeps_escaped_iac_in_batch() {
        assert_eq!(decode_all(&[1, IAC, IAC, 2, 3]), vec![data(&[1, IAC, 2, 3])]);
    }

    #[test]
    fn decoder_handles_split_sequences() {
        let mut fsm = TelnetFsm::new();
        let mut src = BytesMut::from(&[b'a', IAC][..]);
        assert_eq!(fsm.decode(&mut src).unwrap(), Some(data(b"a")));
        assert_eq!(fsm.decode(&mut src).unwrap(), None);
        assert_eq!(fsm.state(), FsmState::Command);

        src.extend_from_slice(&[SB, 31, 0]);
        assert_eq!(fsm.decode(&mut src).unwrap(), None);
        src.extend_from_slice(&[80, IAC, SE, b'b']);
        assert_eq!(
            fsm.decode(&mut src).unwrap(),
            Some(command(&[SB, 31, 0, 80, SE]))
        );
        assert_eq!(fsm.decode(&mut src).unwrap(), Some(data(b"b")));
        assert_eq!(fsm.decode(&mut src).unwrap(), None);
    }

    #[test]
    fn decoder_empty_buffer() {
        let mut fsm = TelnetFsm::new();
        let mut src = BytesMut::new();
        assert_eq!(fsm.decode(&mut src).unwrap(), None);
    }

    // ============================================================================
    // Encoder
    // ============================================================================

    #[test]
    fn encode_data_escapes_iac() {
        assert_eq!(encode_data(&[1, IAC, 2]).as_ref(), &[1, IAC, IAC, 2]);
    }

    #[test]
    fn encode_subnegotiation_escapes_payload() {
        assert_eq!(
            encode_subnegotiation(TelnetOption::NAWS, &[0, IAC, 0, 24]).as_ref(),
            &[IAC, SB, 31, 0, IAC, IAC, 0, 24, IAC, SE]
        );
    }

    #[test]
    fn encoder_matches_decoder_for_commands() {
        let mut fsm = TelnetFsm::new();
        let mut dst = BytesMut::new();
        fsm.encode(command(&[SB, 24, IAC, 7, SE]), &mut dst).unwrap();
        fsm.encode(command(&[AYT]), &mut dst).unwrap();
        assert_eq!(
            dst.as_ref(),
            &[IAC, SB, 24, IAC, IAC, 7, IAC, SE, IAC, AYT]
        );
        assert_eq!(
            decode_all(&dst),
            vec![command(&[SB, 24, IAC, 7, SE]), command(&[AYT])]
        );
    }

    #[test]
    fn encoder_rejects_malformed_commands() {
        let mut fsm = TelnetFsm::new();
        let mut dst = BytesMut::new();
        assert!(fsm.encode(command(&[]), &mut dst).is_err());
        assert!(fsm.encode(command(&[SB, 24, 1]), &mut dst).is_err());
        assert!(fsm.encode(command(&[AYT, AO]), &mut dst).is_err());
        assert!(dst.is_empty());
    }
}
