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

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Represents possible errors that can occur while framing a Telnet byte stream.
///
/// Decoding never fails on protocol grounds; malformed input is logged and dropped by the
/// state machine. Errors come from the transport or from asking the encoder to write a frame
/// that has no valid wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// A frame could not be encoded.
    InvalidFrame {
        /// Description of what is wrong with the frame
        reason: String,
    },
}

impl std::error::Error for CodecError {}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::IOError { kind, operation } => {
                write!(f, "I/O error during {}: {:?}", operation, kind)
            }
            CodecError::InvalidFrame { reason } => {
                write!(f, "Invalid frame: {}", reason)
            }
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_conversion_keeps_kind() {
        let err: CodecError =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset").into();
        match err {
            CodecError::IOError { kind, operation } => {
                assert_eq!(kind, std::io::ErrorKind::ConnectionReset);
                assert_eq!(operation, "peer reset");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_frame_display() {
        let err = CodecError::InvalidFrame {
            reason: "empty command".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid frame: empty command");
    }
}
