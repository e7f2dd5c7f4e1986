use core::fmt;

use bitflags::bitflags;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

bitflags! {
    /// Antenna supervisor flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AntennaFlags: u16 {
        /// Enable antenna supply voltage control signal
        const SVCS = 0x01;
        /// Enable short circuit detection
        const SCD = 0x02;
        /// Enable open circuit detection
        const OCD = 0x04;
        /// Power down antenna supply if short circuit is detected
        const PDWN_ON_SCD = 0x08;
        /// Enable automatic recovery from short state
        const RECOVERY = 0x10;
    }
}

/// Antenna control pins, 5 bits each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AntennaPins {
    pub switch_pin: u8,
    pub short_detect_pin: u8,
    pub open_detect_pin: u8,
    /// Apply the pin settings, otherwise they are ignored by the receiver
    pub reconfig: bool,
}

const PIN_MASK: u16 = 0x1f;
const MAX_PIN: u8 = 31;

impl AntennaPins {
    pub fn to_bits(self) -> Result<u16, ValidationError> {
        for (field, pin) in [
            ("pinSwitch", self.switch_pin),
            ("pinSCD", self.short_detect_pin),
            ("pinOCD", self.open_detect_pin),
        ] {
            ValidationError::check_range(CfgAnt::NAME, field, i64::from(pin), 0, i64::from(MAX_PIN))?;
        }
        Ok(u16::from(self.switch_pin)
            | (u16::from(self.short_detect_pin) << 5)
            | (u16::from(self.open_detect_pin) << 10)
            | (u16::from(self.reconfig) << 15))
    }

    pub fn from_bits(bits: u16) -> Self {
        Self {
            switch_pin: (bits & PIN_MASK) as u8,
            short_detect_pin: ((bits >> 5) & PIN_MASK) as u8,
            open_detect_pin: ((bits >> 10) & PIN_MASK) as u8,
            reconfig: bits & 0x8000 != 0,
        }
    }
}

/// Antenna control settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgAnt {
    pub flags: AntennaFlags,
    pub pins: AntennaPins,
}

const CFG_ANT_LEN: usize = 4;

impl Default for CfgAnt {
    fn default() -> Self {
        Self {
            flags: AntennaFlags::SVCS | AntennaFlags::SCD | AntennaFlags::OCD,
            pins: AntennaPins {
                switch_pin: 16,
                short_detect_pin: 15,
                open_detect_pin: 14,
                reconfig: false,
            },
        }
    }
}

impl UbxPacketMeta for CfgAnt {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x13;
    const NAME: &'static str = "CFG-ANT";
}

impl UbxPacketCreator for CfgAnt {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        let pins = self.pins.to_bits()?;
        out.put_u16(self.flags.bits());
        out.put_u16(pins);
        Ok(())
    }
}

impl UbxPacketParse for CfgAnt {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, CFG_ANT_LEN)?;
        let mut r = PayloadReader::new(payload);
        Ok(Self {
            flags: AntennaFlags::from_bits_retain(r.u16()),
            pins: AntennaPins::from_bits(r.u16()),
        })
    }
}

impl fmt::Display for CfgAnt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pins = AntennaPins::to_bits(self.pins).unwrap_or_default();
        write!(
            f,
            "flags=0x{:04X}, pins=0x{:04X}",
            self.flags.bits(),
            pins
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pins_pack_five_bits_each() {
        let pins = AntennaPins {
            switch_pin: 16,
            short_detect_pin: 15,
            open_detect_pin: 14,
            reconfig: true,
        };
        let bits = pins.to_bits().unwrap();
        assert_eq!(bits, 0x10 | (15 << 5) | (14 << 10) | 0x8000);
        assert_eq!(AntennaPins::from_bits(bits), pins);
    }

    #[test]
    fn pin_out_of_range() {
        let ant = CfgAnt {
            pins: AntennaPins {
                switch_pin: 32,
                ..AntennaPins::default()
            },
            ..CfgAnt::default()
        };
        assert!(matches!(
            ant.to_frame(),
            Err(ValidationError::OutOfRange {
                field: "pinSwitch",
                max: 31,
                ..
            })
        ));
    }

    #[test]
    fn roundtrip() {
        let ant = CfgAnt::default();
        let frame = ant.to_frame().unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(CfgAnt::parse(frame.payload()).unwrap(), ant);
    }
}
