use core::fmt;

use crate::{DecodeError, ValidationError};

/// Configuration item key of the CFG-VALSET/VALGET interface.
///
/// Bits 28..=30 hold the size class of the value, bits 16..=23 the group and
/// bits 0..=11 the item inside the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSize {
    OneBit,
    OneByte,
    TwoBytes,
    FourBytes,
    EightBytes,
}

impl StorageSize {
    pub const fn to_usize(self) -> usize {
        match self {
            Self::OneBit | Self::OneByte => 1,
            Self::TwoBytes => 2,
            Self::FourBytes => 4,
            Self::EightBytes => 8,
        }
    }
}

impl KeyId {
    pub(crate) const SIZE: usize = 4;

    pub const fn size_class(self) -> u8 {
        ((self.0 >> 28) & 0b111) as u8
    }

    /// Width of the value this key carries, `None` for the reserved size classes 6 and 7
    pub const fn value_size(self) -> Option<StorageSize> {
        match self.size_class() {
            0 | 2 => Some(StorageSize::OneByte),
            1 => Some(StorageSize::OneBit),
            3 => Some(StorageSize::TwoBytes),
            4 => Some(StorageSize::FourBytes),
            5 => Some(StorageSize::EightBytes),
            _ => None,
        }
    }

    pub const fn group_id(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn item_id(self) -> u16 {
        (self.0 & 0x0fff) as u16
    }

    pub fn name(self) -> Option<&'static str> {
        known_key_name(self)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:08X})", name, self.0),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

macro_rules! cfg_keys {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $id:literal => $label:literal, default $default:literal;
        )+
    ) => {
        impl KeyId {
            $(
                $(#[$doc])*
                pub const $name: KeyId = KeyId($id);
            )+
        }

        pub(crate) fn known_key_name(key: KeyId) -> Option<&'static str> {
            match key.0 {
                $($id => Some($label),)+
                _ => None,
            }
        }

        /// Factory default of every key the simulated receiver knows
        pub fn default_key_values() -> Vec<KeyValuePair> {
            let mut out = Vec::new();
            $(
                if let Ok(kv) = KeyValuePair::from_u64(KeyId::$name, $default) {
                    out.push(kv);
                }
            )+
            out
        }
    };
}

cfg_keys! {
    /// Nominal time between GNSS measurements, ms
    RATE_MEAS = 0x3021_0001 => "CFG-RATE-MEAS", default 1000;
    /// Ratio of measurements to navigation solutions
    RATE_NAV = 0x3021_0002 => "CFG-RATE-NAV", default 1;
    RATE_TIMEREF = 0x2021_0003 => "CFG-RATE-TIMEREF", default 1;
    UART1_BAUDRATE = 0x4052_0001 => "CFG-UART1-BAUDRATE", default 115_200;
    UART1INPROT_UBX = 0x1073_0001 => "CFG-UART1INPROT-UBX", default 1;
    UART1INPROT_NMEA = 0x1073_0002 => "CFG-UART1INPROT-NMEA", default 1;
    UART1OUTPROT_UBX = 0x1074_0001 => "CFG-UART1OUTPROT-UBX", default 1;
    UART1OUTPROT_NMEA = 0x1074_0002 => "CFG-UART1OUTPROT-NMEA", default 0;
    NAVSPG_FIXMODE = 0x2011_0011 => "CFG-NAVSPG-FIXMODE", default 3;
    NAVSPG_DYNMODEL = 0x2011_0021 => "CFG-NAVSPG-DYNMODEL", default 0;
    MSGOUT_UBX_NAV_PVT_UART1 = 0x2091_0007 => "CFG-MSGOUT-UBX_NAV_PVT_UART1", default 1;
    MSGOUT_UBX_NAV_STATUS_UART1 = 0x2091_001b => "CFG-MSGOUT-UBX_NAV_STATUS_UART1", default 1;
    MSGOUT_UBX_NAV_SAT_UART1 = 0x2091_0016 => "CFG-MSGOUT-UBX_NAV_SAT_UART1", default 0;
    ITFM_BBTHRESHOLD = 0x2041_0001 => "CFG-ITFM-BBTHRESHOLD", default 3;
    ITFM_CWTHRESHOLD = 0x2041_0002 => "CFG-ITFM-CWTHRESHOLD", default 15;
    ITFM_ENABLE = 0x1041_000d => "CFG-ITFM-ENABLE", default 0;
    HW_ANT_CFG_VOLTCTRL = 0x10a3_002e => "CFG-HW-ANT_CFG_VOLTCTRL", default 0;
}

/// One key followed by its little-endian value, as laid out in CFG-VALSET and CFG-VALGET
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyValuePair {
    key: KeyId,
    value: Vec<u8>,
}

impl KeyValuePair {
    /// Pair with raw value bytes; their count must match the key's size class
    pub fn new(key: KeyId, value: Vec<u8>) -> Result<Self, ValidationError> {
        let expect = key
            .value_size()
            .ok_or(ValidationError::InvalidKeySize { key: key.0 })?
            .to_usize();
        if value.len() != expect {
            return Err(ValidationError::ValueWidth {
                key: key.0,
                expect,
                got: value.len(),
            });
        }
        Ok(Self { key, value })
    }

    /// Pair from an integer that has to fit the key's value width
    pub fn from_u64(key: KeyId, value: u64) -> Result<Self, ValidationError> {
        let size = key
            .value_size()
            .ok_or(ValidationError::InvalidKeySize { key: key.0 })?;
        let max = match size {
            StorageSize::OneBit => 1,
            StorageSize::EightBytes => u64::MAX,
            other => (1u64 << (8 * other.to_usize())) - 1,
        };
        if value > max {
            return Err(ValidationError::OutOfRange {
                packet: "CFG-VALSET",
                field: "value",
                value: i64::try_from(value).unwrap_or(i64::MAX),
                min: 0,
                max: i64::try_from(max).unwrap_or(i64::MAX),
            });
        }
        Ok(Self {
            key,
            value: value.to_le_bytes()[..size.to_usize()].to_vec(),
        })
    }

    pub fn key(&self) -> KeyId {
        self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Value widened to `u64`
    pub fn value_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes[..self.value.len()].copy_from_slice(&self.value);
        u64::from_le_bytes(bytes)
    }

    pub(crate) fn extend_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.key.0.to_le_bytes());
        out.extend_from_slice(&self.value);
    }

    pub(crate) fn wire_len(&self) -> usize {
        KeyId::SIZE + self.value.len()
    }
}

impl fmt::Display for KeyValuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value_u64())
    }
}

/// Iterator over a key/value list without length prefixes.
///
/// A key whose size class is reserved, or whose value runs past the end of the
/// data, makes every following pair unreadable: the iterator yields that error
/// once and then stops.
pub struct CfgValIter<'a> {
    packet: &'static str,
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> CfgValIter<'a> {
    pub fn new(packet: &'static str, data: &'a [u8]) -> Self {
        Self {
            packet,
            data,
            offset: 0,
            failed: false,
        }
    }

    fn fail(&mut self, err: DecodeError) -> Option<Result<KeyValuePair, DecodeError>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl Iterator for CfgValIter<'_> {
    type Item = Result<KeyValuePair, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.offset..];
        if rest.len() < KeyId::SIZE {
            return self.fail(DecodeError::TruncatedValue {
                packet: self.packet,
                key: 0,
                offset: self.offset,
                need: KeyId::SIZE,
                have: rest.len(),
            });
        }
        let key = KeyId(u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]));
        let Some(size) = key.value_size() else {
            return self.fail(DecodeError::InvalidKeySize {
                packet: self.packet,
                key: key.0,
                offset: self.offset,
            });
        };
        let need = size.to_usize();
        let have = rest.len() - KeyId::SIZE;
        if have < need {
            return self.fail(DecodeError::TruncatedValue {
                packet: self.packet,
                key: key.0,
                offset: self.offset,
                need,
                have,
            });
        }
        let value = rest[KeyId::SIZE..KeyId::SIZE + need].to_vec();
        self.offset += KeyId::SIZE + need;
        Some(Ok(KeyValuePair { key, value }))
    }
}

/// Decode a whole key/value list, reporting the first malformed pair
pub(crate) fn parse_key_values(
    packet: &'static str,
    data: &[u8],
) -> Result<Vec<KeyValuePair>, DecodeError> {
    CfgValIter::new(packet, data).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn size_classes() {
        assert_eq!(KeyId(0x1073_0001).value_size(), Some(StorageSize::OneBit));
        assert_eq!(KeyId(0x2021_0003).value_size(), Some(StorageSize::OneByte));
        assert_eq!(KeyId(0x3021_0001).value_size(), Some(StorageSize::TwoBytes));
        assert_eq!(KeyId(0x4052_0001).value_size(), Some(StorageSize::FourBytes));
        assert_eq!(KeyId(0x5000_0001).value_size(), Some(StorageSize::EightBytes));
        assert_eq!(KeyId(0x0000_0001).value_size(), Some(StorageSize::OneByte));
        assert_eq!(KeyId(0x6000_0001).value_size(), None);
        assert_eq!(KeyId(0x7000_0001).value_size(), None);
        // bit 31 is not part of the size class
        assert_eq!(KeyId(0xb021_0001).size_class(), 3);
    }

    #[test]
    fn key_fields() {
        let key = KeyId::UART1_BAUDRATE;
        assert_eq!(key.group_id(), 0x52);
        assert_eq!(key.item_id(), 0x001);
        assert_eq!(key.to_string(), "CFG-UART1-BAUDRATE (0x40520001)");
    }

    #[test]
    fn pair_width_checked() {
        assert!(KeyValuePair::new(KeyId::RATE_MEAS, vec![0xe8, 0x03]).is_ok());
        assert_eq!(
            KeyValuePair::new(KeyId::RATE_MEAS, vec![0xe8]),
            Err(ValidationError::ValueWidth {
                key: 0x3021_0001,
                expect: 2,
                got: 1
            })
        );
        assert!(KeyValuePair::from_u64(KeyId::RATE_MEAS, 70_000).is_err());
        assert!(KeyValuePair::from_u64(KeyId::UART1INPROT_UBX, 2).is_err());
        let kv = KeyValuePair::from_u64(KeyId::UART1_BAUDRATE, 9600).unwrap();
        assert_eq!(kv.value(), &[0x80, 0x25, 0x00, 0x00]);
        assert_eq!(kv.value_u64(), 9600);
    }

    #[test]
    fn iter_stops_on_reserved_size() {
        let data = [
            0x01, 0x00, 0x21, 0x30, 0xc8, 0x00, // RATE-MEAS = 200
            0x01, 0x00, 0x00, 0x70, 0xaa, // size class 7
            0x02, 0x00, 0x21, 0x30, 0x01, 0x00, // never reached
        ];
        let items: Vec<_> = CfgValIter::new("CFG-VALGET", &data).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().value_u64(), 200);
        assert_eq!(
            items[1],
            Err(DecodeError::InvalidKeySize {
                packet: "CFG-VALGET",
                key: 0x7000_0001,
                offset: 6
            })
        );
    }

    #[test]
    fn iter_reports_truncated_value() {
        let data = [0x01, 0x00, 0x52, 0x40, 0x80, 0x25];
        assert_eq!(
            parse_key_values("CFG-VALSET", &data),
            Err(DecodeError::TruncatedValue {
                packet: "CFG-VALSET",
                key: 0x4052_0001,
                offset: 0,
                need: 4,
                have: 2
            })
        );
    }

    #[test]
    fn defaults_fit_their_keys() {
        let defaults = default_key_values();
        assert_eq!(defaults.len(), 17);
        assert!(defaults
            .iter()
            .any(|kv| kv.key() == KeyId::RATE_MEAS && kv.value_u64() == 1000));
    }
}
