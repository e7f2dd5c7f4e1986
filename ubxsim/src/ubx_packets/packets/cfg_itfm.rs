use core::fmt;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

ubx_enum! {
    /// Antenna type the interference monitor assumes
    pub enum ItfmAntennaSetting {
        Unknown = 0 => "Unknown",
        Passive = 1 => "Passive",
        Active = 2 => "Active",
    }
}

/// Jamming/interference monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgItfm {
    /// Broadband jamming detection threshold, dB, 4 bits
    pub bb_threshold: u8,
    /// CW jamming detection threshold, dB, 5 bits
    pub cw_threshold: u8,
    /// Reserved algorithm settings, 22 bits
    pub algorithm_bits: u32,
    pub enable: bool,
    /// General settings, 12 bits
    pub general_bits: u16,
    pub antenna: ItfmAntennaSetting,
    /// Also scan the auxiliary bands
    pub scan_aux_bands: bool,
}

const CFG_ITFM_LEN: usize = 8;
const BB_THRESHOLD_MAX: u8 = 0x0f;
const CW_THRESHOLD_MAX: u8 = 0x1f;
const ALGORITHM_BITS_MASK: u32 = 0x003f_ffff;
const GENERAL_BITS_MASK: u16 = 0x0fff;

impl Default for CfgItfm {
    fn default() -> Self {
        Self {
            bb_threshold: 3,
            cw_threshold: 15,
            algorithm_bits: 0x16b156,
            enable: true,
            general_bits: 0x31e,
            antenna: ItfmAntennaSetting::Active,
            scan_aux_bands: false,
        }
    }
}

impl UbxPacketMeta for CfgItfm {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x39;
    const NAME: &'static str = "CFG-ITFM";
}

impl UbxPacketCreator for CfgItfm {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        ValidationError::check_range(
            Self::NAME,
            "bbThreshold",
            i64::from(self.bb_threshold),
            0,
            i64::from(BB_THRESHOLD_MAX),
        )?;
        ValidationError::check_range(
            Self::NAME,
            "cwThreshold",
            i64::from(self.cw_threshold),
            0,
            i64::from(CW_THRESHOLD_MAX),
        )?;
        ValidationError::check_range(
            Self::NAME,
            "algorithmBits",
            i64::from(self.algorithm_bits),
            0,
            i64::from(ALGORITHM_BITS_MASK),
        )?;
        ValidationError::check_range(
            Self::NAME,
            "generalBits",
            i64::from(self.general_bits),
            0,
            i64::from(GENERAL_BITS_MASK),
        )?;
        let config = u32::from(self.bb_threshold)
            | (u32::from(self.cw_threshold) << 4)
            | (self.algorithm_bits << 9)
            | (u32::from(self.enable) << 31);
        let config2 = u32::from(self.general_bits)
            | (u32::from(u8::from(self.antenna)) << 12)
            | (u32::from(self.scan_aux_bands) << 14);
        out.put_u32(config);
        out.put_u32(config2);
        Ok(())
    }
}

impl UbxPacketParse for CfgItfm {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, CFG_ITFM_LEN)?;
        let mut r = PayloadReader::new(payload);
        let config = r.u32();
        let config2 = r.u32();
        let antenna = ItfmAntennaSetting::from_u8(((config2 >> 12) & 0x03) as u8).ok_or(
            DecodeError::InvalidField {
                packet: Self::NAME,
                field: "antSetting",
            },
        )?;
        Ok(Self {
            bb_threshold: (config & u32::from(BB_THRESHOLD_MAX)) as u8,
            cw_threshold: ((config >> 4) & u32::from(CW_THRESHOLD_MAX)) as u8,
            algorithm_bits: (config >> 9) & ALGORITHM_BITS_MASK,
            enable: config & 0x8000_0000 != 0,
            general_bits: (config2 as u16) & GENERAL_BITS_MASK,
            antenna,
            scan_aux_bands: config2 & (1 << 14) != 0,
        })
    }
}

impl fmt::Display for CfgItfm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BB={}, CW={}, Enable={}, Antenna={}",
            self.bb_threshold, self.cw_threshold, self.enable, self.antenna
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn itfm_default_bits() {
        let frame = CfgItfm::default().to_frame().unwrap();
        // u-center's recommended setting
        assert_eq!(
            frame.payload(),
            [0xf3, 0xac, 0x62, 0xad, 0x1e, 0x23, 0x00, 0x00]
        );
        assert_eq!(CfgItfm::parse(frame.payload()).unwrap(), CfgItfm::default());
    }

    #[test]
    fn itfm_threshold_widths() {
        let bb = CfgItfm {
            bb_threshold: 16,
            ..CfgItfm::default()
        };
        assert!(matches!(
            bb.to_frame(),
            Err(ValidationError::OutOfRange {
                field: "bbThreshold",
                max: 15,
                ..
            })
        ));
        let cw = CfgItfm {
            cw_threshold: 32,
            ..CfgItfm::default()
        };
        assert!(matches!(
            cw.to_frame(),
            Err(ValidationError::OutOfRange {
                field: "cwThreshold",
                max: 31,
                ..
            })
        ));
    }
}
