use core::fmt;

use crate::{
    ubx_packets::wire::check_ascii, DecodeError, UbxFrame, ValidationError,
};

/// Longest INF text the simulator sends
pub const MAX_INF_TEXT_LEN: usize = 1024;

ubx_enum! {
    /// Severity of an INF message, which is also its message id
    pub enum InfSeverity {
        Error = 0x00 => "INF-ERROR",
        Warning = 0x01 => "INF-WARNING",
        Notice = 0x02 => "INF-NOTICE",
        Test = 0x03 => "INF-TEST",
        Debug = 0x04 => "INF-DEBUG",
    }
}

/// ASCII text message from the receiver.
///
/// INF messages share one layout across five ids, so unlike the other
/// messages the id is carried as data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inf {
    pub severity: InfSeverity,
    pub text: String,
}

impl Inf {
    pub const CLASS: u8 = 0x04;

    pub fn new(severity: InfSeverity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.severity.as_str()
    }

    pub fn to_frame(&self) -> Result<UbxFrame, ValidationError> {
        let packet = self.name();
        if self.text.is_empty() {
            return Err(ValidationError::Empty {
                packet,
                field: "text",
            });
        }
        check_ascii(packet, "text", &self.text)?;
        if self.text.len() > MAX_INF_TEXT_LEN {
            return Err(ValidationError::StringTooLong {
                packet,
                field: "text",
                max: MAX_INF_TEXT_LEN,
                got: self.text.len(),
            });
        }
        UbxFrame::new(
            Self::CLASS,
            self.severity.into(),
            self.text.as_bytes().to_vec(),
        )
    }

    /// Receivers may pad with NUL; anything after the first one is dropped
    pub fn parse(msg_id: u8, payload: &[u8]) -> Result<Self, DecodeError> {
        let severity = InfSeverity::from_u8(msg_id).ok_or(DecodeError::UnknownMessage {
            class: "INF",
            msg_id,
        })?;
        let end = payload.iter().position(|b| *b == 0).unwrap_or(payload.len());
        let text = String::from_utf8_lossy(&payload[..end]).into_owned();
        Ok(Self { severity, text })
    }
}

impl fmt::Display for Inf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inf_frame_uses_severity_id() {
        let frame = Inf::new(InfSeverity::Warning, "antenna open").to_frame().unwrap();
        assert_eq!(frame.class(), 0x04);
        assert_eq!(frame.msg_id(), 0x01);
        assert_eq!(frame.payload(), b"antenna open");
    }

    #[test]
    fn inf_parse_strips_padding() {
        let inf = Inf::parse(0x04, b"ANTSUPERV=AC SD PDoS SR\0\0").unwrap();
        assert_eq!(inf.severity, InfSeverity::Debug);
        assert_eq!(inf.text, "ANTSUPERV=AC SD PDoS SR");
        assert_eq!(inf.to_string(), "INF-DEBUG: ANTSUPERV=AC SD PDoS SR");
    }

    #[test]
    fn inf_rejects_bad_text() {
        assert!(matches!(
            Inf::new(InfSeverity::Error, "").to_frame(),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            Inf::new(InfSeverity::Error, "line\nbreak").to_frame(),
            Err(ValidationError::NonAscii { .. })
        ));
        assert!(Inf::new(InfSeverity::Notice, "x".repeat(MAX_INF_TEXT_LEN + 1))
            .to_frame()
            .is_err());
        assert_eq!(
            Inf::parse(0x07, b"x"),
            Err(DecodeError::UnknownMessage {
                class: "INF",
                msg_id: 7
            })
        );
    }
}
