use core::fmt;

use crate::{
    ubx_packets::wire::{get_fixed_str, put_fixed_str},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

const SW_VERSION_LEN: usize = 30;
const HW_VERSION_LEN: usize = 10;
const EXTENSION_LEN: usize = 30;
const MON_VER_HEADER_LEN: usize = SW_VERSION_LEN + HW_VERSION_LEN;
/// Receivers report far fewer; this bounds the payload well below the framer limit
pub const MAX_MON_VER_EXTENSIONS: usize = 32;

/// Receiver and software version
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonVer {
    pub software_version: String,
    pub hardware_version: String,
    /// Extended version strings such as `PROTVER=18.00`
    pub extensions: Vec<String>,
}

impl Default for MonVer {
    fn default() -> Self {
        Self {
            software_version: "ROM CORE 3.01 (107888)".into(),
            hardware_version: "00080000".into(),
            extensions: vec![
                "FWVER=SPG 3.01".into(),
                "PROTVER=18.00".into(),
                "GPS;GLO;GAL;BDS".into(),
                "SBAS;IMES;QZSS".into(),
            ],
        }
    }
}

impl MonVer {
    /// Value of a `KEY=value` extension, e.g. `PROTVER`
    pub fn extension_value(&self, key: &str) -> Option<&str> {
        self.extensions.iter().find_map(|ext| {
            ext.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
        })
    }
}

impl UbxPacketMeta for MonVer {
    const CLASS: u8 = 0x0a;
    const ID: u8 = 0x04;
    const NAME: &'static str = "MON-VER";
}

impl UbxPacketCreator for MonVer {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        if self.extensions.len() > MAX_MON_VER_EXTENSIONS {
            return Err(ValidationError::TooMany {
                packet: Self::NAME,
                field: "extensions",
                max: MAX_MON_VER_EXTENSIONS,
                got: self.extensions.len(),
            });
        }
        let mut payload =
            Vec::with_capacity(MON_VER_HEADER_LEN + EXTENSION_LEN * self.extensions.len());
        put_fixed_str(
            &mut payload,
            Self::NAME,
            "swVersion",
            &self.software_version,
            SW_VERSION_LEN,
        )?;
        put_fixed_str(
            &mut payload,
            Self::NAME,
            "hwVersion",
            &self.hardware_version,
            HW_VERSION_LEN,
        )?;
        for ext in &self.extensions {
            put_fixed_str(&mut payload, Self::NAME, "extension", ext, EXTENSION_LEN)?;
        }
        out.extend_from_slice(&payload);
        Ok(())
    }
}

impl UbxPacketParse for MonVer {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < MON_VER_HEADER_LEN
            || (payload.len() - MON_VER_HEADER_LEN) % EXTENSION_LEN != 0
        {
            let ext = payload.len().saturating_sub(MON_VER_HEADER_LEN) / EXTENSION_LEN;
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: MON_VER_HEADER_LEN + ext * EXTENSION_LEN,
                got: payload.len(),
            });
        }
        let software_version =
            get_fixed_str(Self::NAME, "swVersion", &payload[..SW_VERSION_LEN])?;
        let hardware_version = get_fixed_str(
            Self::NAME,
            "hwVersion",
            &payload[SW_VERSION_LEN..MON_VER_HEADER_LEN],
        )?;
        let extensions = payload[MON_VER_HEADER_LEN..]
            .chunks_exact(EXTENSION_LEN)
            .map(|raw| get_fixed_str(Self::NAME, "extension", raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            software_version,
            hardware_version,
            extensions,
        })
    }
}

impl fmt::Display for MonVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SW={} HW={}",
            self.software_version, self.hardware_version
        )?;
        if !self.extensions.is_empty() {
            write!(f, " Extensions={}", self.extensions.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mon_ver_rom_interpret() {
        let payload: [u8; 160] = [
            82, 79, 77, 32, 67, 79, 82, 69, 32, 51, 46, 48, 49, 32, 40, 49, 48, 55, 56, 56, 56, 41,
            0, 0, 0, 0, 0, 0, 0, 0, 48, 48, 48, 56, 48, 48, 48, 48, 0, 0, 70, 87, 86, 69, 82, 61,
            83, 80, 71, 32, 51, 46, 48, 49, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 80, 82,
            79, 84, 86, 69, 82, 61, 49, 56, 46, 48, 48, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 71, 80, 83, 59, 71, 76, 79, 59, 71, 65, 76, 59, 66, 68, 83, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 83, 66, 65, 83, 59, 73, 77, 69, 83, 59, 81, 90, 83, 83, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let ver = MonVer::parse(&payload).unwrap();
        assert_eq!(ver, MonVer::default());
        assert_eq!(ver.extension_value("PROTVER"), Some("18.00"));

        let frame = ver.to_frame().unwrap();
        assert_eq!(frame.payload(), &payload[..]);
    }

    #[test]
    fn mon_ver_string_limits() {
        let ver = MonVer {
            hardware_version: "0123456789".into(),
            ..MonVer::default()
        };
        assert!(matches!(
            ver.to_frame(),
            Err(ValidationError::StringTooLong {
                field: "hwVersion",
                max: 9,
                got: 10,
                ..
            })
        ));
        let ver = MonVer {
            software_version: "caf\u{e9}".into(),
            ..MonVer::default()
        };
        assert!(matches!(
            ver.to_frame(),
            Err(ValidationError::NonAscii { .. })
        ));
    }

    #[test]
    fn mon_ver_bad_length() {
        assert!(matches!(
            MonVer::parse(&[0u8; 45]),
            Err(DecodeError::InvalidPacketLen { got: 45, .. })
        ));
    }
}
