use std::{fmt, io};

/// Framing errors reported by [`FrameParser`](crate::FrameParser).
///
/// None of them are fatal: the parser has already resynchronized when one is
/// yielded and the next call keeps scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    InvalidChecksum { expect: u16, got: u16 },
    PayloadTooLarge { declared: usize, max: usize },
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::InvalidChecksum { expect, got } => write!(
                f,
                "Not valid packet's checksum, expect {:x}, got {:x}",
                expect, got
            ),
            ParserError::PayloadTooLarge { declared, max } => write!(
                f,
                "Declared payload length {} exceeds maximum {}",
                declared, max
            ),
        }
    }
}

impl std::error::Error for ParserError {}

/// Errors while turning a checksum-valid frame into a typed packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    UnknownClass {
        class: u8,
    },
    UnknownMessage {
        class: &'static str,
        msg_id: u8,
    },
    InvalidPacketLen {
        packet: &'static str,
        expect: usize,
        got: usize,
    },
    ResponseTooShort {
        packet: &'static str,
        min: usize,
        got: usize,
    },
    InvalidField {
        packet: &'static str,
        field: &'static str,
    },
    BlockCountMismatch {
        packet: &'static str,
        declared: usize,
        actual: usize,
    },
    /// Key at `offset` inside the key/value list carries a size class that maps to no width
    InvalidKeySize {
        packet: &'static str,
        key: u32,
        offset: usize,
    },
    /// Key at `offset` announces a value wider than the bytes left in the payload
    TruncatedValue {
        packet: &'static str,
        key: u32,
        offset: usize,
        need: usize,
        have: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownClass { class } => {
                write!(f, "Unknown message class: 0x{:02X}", class)
            },
            DecodeError::UnknownMessage { class, msg_id } => {
                write!(f, "Unknown {} message ID: 0x{:02X}", class, msg_id)
            },
            DecodeError::InvalidPacketLen {
                packet,
                expect,
                got,
            } => write!(
                f,
                "Invalid packet({}) length, expect {}, got {}",
                packet, expect, got
            ),
            DecodeError::ResponseTooShort { packet, min, got } => write!(
                f,
                "{} response too short: need at least {} bytes, got {}",
                packet, min, got
            ),
            DecodeError::InvalidField { packet, field } => {
                write!(f, "Invalid field {} of packet {}", field, packet)
            },
            DecodeError::BlockCountMismatch {
                packet,
                declared,
                actual,
            } => write!(
                f,
                "{} declares {} blocks but carries {}",
                packet, declared, actual
            ),
            DecodeError::InvalidKeySize {
                packet,
                key,
                offset,
            } => write!(
                f,
                "{}: key 0x{:08X} at offset {} has an invalid size class",
                packet, key, offset
            ),
            DecodeError::TruncatedValue {
                packet,
                key,
                offset,
                need,
                have,
            } => write!(
                f,
                "{}: key 0x{:08X} at offset {} needs {} value bytes, {} left",
                packet, key, offset, need, have
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Caller supplied parameters that cannot be encoded.
///
/// Raised before a single byte of the frame is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    OutOfRange {
        packet: &'static str,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    NotRepresentable {
        packet: &'static str,
        field: &'static str,
        value: f64,
    },
    InvalidHex {
        packet: &'static str,
        field: &'static str,
    },
    Empty {
        packet: &'static str,
        field: &'static str,
    },
    TooMany {
        packet: &'static str,
        field: &'static str,
        max: usize,
        got: usize,
    },
    StringTooLong {
        packet: &'static str,
        field: &'static str,
        max: usize,
        got: usize,
    },
    NonAscii {
        packet: &'static str,
        field: &'static str,
    },
    ValueWidth {
        key: u32,
        expect: usize,
        got: usize,
    },
    InvalidKeySize {
        key: u32,
    },
    PayloadTooLarge {
        packet: &'static str,
        len: usize,
        max: usize,
    },
}

impl ValidationError {
    pub(crate) fn check_range(
        packet: &'static str,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    ) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                packet,
                field,
                value,
                min,
                max,
            })
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                packet,
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{}: {} = {} is outside {}..={}",
                packet, field, value, min, max
            ),
            ValidationError::NotRepresentable {
                packet,
                field,
                value,
            } => write!(f, "{}: {} = {} cannot be encoded", packet, field, value),
            ValidationError::InvalidHex { packet, field } => {
                write!(f, "{}: Invalid {} format (must be hex)", packet, field)
            },
            ValidationError::Empty { packet, field } => {
                write!(f, "Error: No valid {} provided for {}", field, packet)
            },
            ValidationError::TooMany {
                packet,
                field,
                max,
                got,
            } => write!(f, "{}: {} {} given, at most {}", packet, got, field, max),
            ValidationError::StringTooLong {
                packet,
                field,
                max,
                got,
            } => write!(
                f,
                "{}: {} is {} characters long, at most {}",
                packet, field, got, max
            ),
            ValidationError::NonAscii { packet, field } => {
                write!(f, "{}: {} must be printable ASCII", packet, field)
            },
            ValidationError::ValueWidth { key, expect, got } => write!(
                f,
                "Key 0x{:08X} takes a {}-byte value, got {} bytes",
                key, expect, got
            ),
            ValidationError::InvalidKeySize { key } => {
                write!(f, "Key 0x{:08X} has an invalid size class", key)
            },
            ValidationError::PayloadTooLarge { packet, len, max } => write!(
                f,
                "{} payload of {} bytes exceeds maximum {}",
                packet, len, max
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failures writing to the attached transport
#[derive(Debug)]
pub enum TransportError {
    NotConnected,
    PartialWrite { written: usize, total: usize },
    Io(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NotConnected => f.write_str("Socket not connected"),
            TransportError::PartialWrite { written, total } => {
                write!(f, "Partial write: {}/{} bytes", written, total)
            },
            TransportError::Io(e) => write!(f, "Transport I/O error: {}", e),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Io(e)
    }
}

/// Handshake and telemetry sequencing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    AlreadyInProgress,
    NotInitialized,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyInProgress => f.write_str("Configuration already in progress"),
            SessionError::NotInitialized => {
                f.write_str("Cannot start sending - initialization not complete")
            },
        }
    }
}

impl std::error::Error for SessionError {}

/// Error returned by every outward facing [`Engine`](crate::Engine) operation
#[derive(Debug)]
pub enum EngineError {
    Validation(ValidationError),
    Transport(TransportError),
    Session(SessionError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(e) => write!(f, "Validation error: {}", e),
            EngineError::Transport(e) => write!(f, "Transport error: {}", e),
            EngineError::Session(e) => write!(f, "Session error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Validation(e) => Some(e),
            EngineError::Transport(e) => Some(e),
            EngineError::Session(e) => Some(e),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        EngineError::Validation(e)
    }
}

impl From<TransportError> for EngineError {
    fn from(e: TransportError) -> Self {
        EngineError::Transport(e)
    }
}

impl From<SessionError> for EngineError {
    fn from(e: SessionError) -> Self {
        EngineError::Session(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    InvalidDate,
    InvalidTime,
    InvalidNanoseconds,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::InvalidDate => f.write_str("invalid date"),
            DateTimeError::InvalidTime => f.write_str("invalid time"),
            DateTimeError::InvalidNanoseconds => f.write_str("invalid nanoseconds"),
        }
    }
}

impl std::error::Error for DateTimeError {}
