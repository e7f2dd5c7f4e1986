use core::fmt;

use crate::{
    ubx_packets::{hex_string, wire::PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

/// Unique chip id
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecUniqId {
    /// 1 carries a 5 byte id, 2 a 6 byte id
    pub version: u8,
    pub unique_id: Vec<u8>,
}

const SEC_UNIQ_ID_HEADER_LEN: usize = 4;

fn id_len(version: u8) -> Option<usize> {
    match version {
        1 => Some(5),
        2 => Some(6),
        _ => None,
    }
}

impl SecUniqId {
    /// Build from a hex string such as `"E095650F2A"`; whitespace is ignored
    pub fn from_hex(version: u8, chip_id: &str) -> Result<Self, ValidationError> {
        let invalid = ValidationError::InvalidHex {
            packet: Self::NAME,
            field: "Chip ID",
        };
        let digits: Vec<u8> = chip_id
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if digits.is_empty() {
            return Err(ValidationError::Empty {
                packet: Self::NAME,
                field: "Chip ID",
            });
        }
        if digits.len() % 2 != 0 {
            return Err(invalid);
        }
        let unique_id = digits
            .chunks_exact(2)
            .map(|pair| {
                let hi = char::from(pair[0]).to_digit(16)?;
                let lo = char::from(pair[1]).to_digit(16)?;
                Some(((hi << 4) | lo) as u8)
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or(invalid)?;
        let id = Self { version, unique_id };
        id.check()?;
        Ok(id)
    }

    pub fn hex(&self) -> String {
        self.unique_id.iter().map(|b| format!("{:02X}", b)).collect()
    }

    fn check(&self) -> Result<usize, ValidationError> {
        let len = id_len(self.version).ok_or(ValidationError::OutOfRange {
            packet: Self::NAME,
            field: "version",
            value: i64::from(self.version),
            min: 1,
            max: 2,
        })?;
        ValidationError::check_range(
            Self::NAME,
            "Chip ID length",
            self.unique_id.len() as i64,
            len as i64,
            len as i64,
        )?;
        Ok(len)
    }
}

impl Default for SecUniqId {
    fn default() -> Self {
        Self {
            version: 1,
            unique_id: vec![0xe0, 0x95, 0x65, 0x0f, 0x2a],
        }
    }
}

impl UbxPacketMeta for SecUniqId {
    const CLASS: u8 = 0x27;
    const ID: u8 = 0x03;
    const NAME: &'static str = "SEC-UNIQID";
}

impl UbxPacketCreator for SecUniqId {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        self.check()?;
        out.put_u8(self.version);
        out.extend_from_slice(&[0; 3]);
        out.extend_from_slice(&self.unique_id);
        Ok(())
    }
}

impl UbxPacketParse for SecUniqId {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let version = *payload.first().ok_or(DecodeError::InvalidPacketLen {
            packet: Self::NAME,
            expect: SEC_UNIQ_ID_HEADER_LEN + 5,
            got: 0,
        })?;
        let len = id_len(version).ok_or(DecodeError::InvalidField {
            packet: Self::NAME,
            field: "version",
        })?;
        if payload.len() != SEC_UNIQ_ID_HEADER_LEN + len {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: SEC_UNIQ_ID_HEADER_LEN + len,
                got: payload.len(),
            });
        }
        Ok(Self {
            version,
            unique_id: payload[SEC_UNIQ_ID_HEADER_LEN..].to_vec(),
        })
    }
}

impl fmt::Display for SecUniqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chip ID: 0x{}", self.hex())
    }
}

impl SecUniqId {
    /// Id bytes as spaced hex, the way raw frames are printed
    pub fn spaced_hex(&self) -> String {
        hex_string(&self.unique_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sec_uniq_id_from_hex() {
        let id = SecUniqId::from_hex(1, "e0 95 65 0f 2a").unwrap();
        assert_eq!(id, SecUniqId::default());
        let frame = id.to_frame().unwrap();
        assert_eq!(
            frame.payload(),
            [0x01, 0x00, 0x00, 0x00, 0xe0, 0x95, 0x65, 0x0f, 0x2a]
        );
        assert_eq!(SecUniqId::parse(frame.payload()).unwrap(), id);
        assert_eq!(id.to_string(), "Chip ID: 0xE095650F2A");
        assert_eq!(id.spaced_hex(), "E0 95 65 0F 2A");
    }

    #[test]
    fn sec_uniq_id_version_2() {
        let id = SecUniqId::from_hex(2, "0102030405AB").unwrap();
        assert_eq!(id.to_frame().unwrap().len(), 10);
        assert!(SecUniqId::from_hex(2, "0102030405").is_err());
    }

    #[test]
    fn sec_uniq_id_rejects_bad_hex() {
        assert_eq!(
            SecUniqId::from_hex(1, "E095650FZZ"),
            Err(ValidationError::InvalidHex {
                packet: "SEC-UNIQID",
                field: "Chip ID"
            })
        );
        assert_eq!(
            SecUniqId::from_hex(1, "E09"),
            Err(ValidationError::InvalidHex {
                packet: "SEC-UNIQID",
                field: "Chip ID"
            })
        );
        assert!(matches!(
            SecUniqId::from_hex(1, "  "),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn sec_uniq_id_length_mismatch() {
        assert!(matches!(
            SecUniqId::parse(&[1, 0, 0, 0, 1, 2, 3]),
            Err(DecodeError::InvalidPacketLen {
                expect: 9,
                got: 7,
                ..
            })
        ));
    }
}
