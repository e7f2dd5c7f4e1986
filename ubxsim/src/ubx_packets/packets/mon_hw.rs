use core::fmt;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    AntennaPower, AntennaStatus, DecodeError, JammingState, UbxPacketCreator, UbxPacketMeta,
    UbxPacketParse, ValidationError,
};

const MON_HW_LEN: usize = 60;
const VIRTUAL_PIN_COUNT: usize = 17;
/// AGC monitor range, 0..=8191
pub const MAX_AGC_COUNT: u16 = 8191;

/// Hardware status: antenna supervisor, AGC and jamming indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonHw {
    pub pin_sel: u32,
    pub pin_bank: u32,
    pub pin_dir: u32,
    pub pin_val: u32,
    /// Noise level as measured by the GPS core
    pub noise_per_ms: u16,
    pub agc_count: u16,
    pub antenna_status: AntennaStatus,
    pub antenna_power: AntennaPower,
    /// Low level configuration flags, without the jamming bits
    pub flags: u8,
    pub jamming_state: JammingState,
    pub used_mask: u32,
    pub virtual_pins: [u8; VIRTUAL_PIN_COUNT],
    /// CW jamming indicator, 0 = none, 255 = strong
    pub jam_indicator: u8,
    pub pin_irq: u32,
    pub pull_high: u32,
    pub pull_low: u32,
}

impl Default for MonHw {
    fn default() -> Self {
        Self {
            pin_sel: 0,
            pin_bank: 0,
            pin_dir: 0,
            pin_val: 0,
            noise_per_ms: 82,
            agc_count: 5000,
            antenna_status: AntennaStatus::Ok,
            antenna_power: AntennaPower::On,
            flags: 0x01,
            jamming_state: JammingState::Ok,
            used_mask: 0,
            virtual_pins: [0; VIRTUAL_PIN_COUNT],
            jam_indicator: 8,
            pin_irq: 0,
            pull_high: 0,
            pull_low: 0,
        }
    }
}

const JAMMING_SHIFT: u8 = 2;
const JAMMING_MASK: u8 = 0x03 << JAMMING_SHIFT;

impl UbxPacketMeta for MonHw {
    const CLASS: u8 = 0x0a;
    const ID: u8 = 0x09;
    const NAME: &'static str = "MON-HW";
}

impl UbxPacketCreator for MonHw {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        ValidationError::check_range(
            Self::NAME,
            "agcCnt",
            i64::from(self.agc_count),
            0,
            i64::from(MAX_AGC_COUNT),
        )?;
        out.put_u32(self.pin_sel);
        out.put_u32(self.pin_bank);
        out.put_u32(self.pin_dir);
        out.put_u32(self.pin_val);
        out.put_u16(self.noise_per_ms);
        out.put_u16(self.agc_count);
        out.put_u8(self.antenna_status.into());
        out.put_u8(self.antenna_power.into());
        out.put_u8(
            (self.flags & !JAMMING_MASK) | (u8::from(self.jamming_state) << JAMMING_SHIFT),
        );
        out.put_u8(0);
        out.put_u32(self.used_mask);
        out.extend_from_slice(&self.virtual_pins);
        out.put_u8(self.jam_indicator);
        out.extend_from_slice(&[0; 2]);
        out.put_u32(self.pin_irq);
        out.put_u32(self.pull_high);
        out.put_u32(self.pull_low);
        Ok(())
    }
}

impl UbxPacketParse for MonHw {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, MON_HW_LEN)?;
        let invalid = |field| DecodeError::InvalidField {
            packet: Self::NAME,
            field,
        };
        let mut r = PayloadReader::new(payload);
        let pin_sel = r.u32();
        let pin_bank = r.u32();
        let pin_dir = r.u32();
        let pin_val = r.u32();
        let noise_per_ms = r.u16();
        let agc_count = r.u16();
        let antenna_status = AntennaStatus::from_u8(r.u8()).ok_or_else(|| invalid("aStatus"))?;
        let antenna_power = AntennaPower::from_u8(r.u8()).ok_or_else(|| invalid("aPower"))?;
        let raw_flags = r.u8();
        let jamming_state = JammingState::from_u8((raw_flags & JAMMING_MASK) >> JAMMING_SHIFT)
            .ok_or_else(|| invalid("flags"))?;
        let _reserved1 = r.u8();
        let used_mask = r.u32();
        let virtual_pins = r.bytes();
        let jam_indicator = r.u8();
        let _reserved2: [u8; 2] = r.bytes();
        Ok(Self {
            pin_sel,
            pin_bank,
            pin_dir,
            pin_val,
            noise_per_ms,
            agc_count,
            antenna_status,
            antenna_power,
            flags: raw_flags & !JAMMING_MASK,
            jamming_state,
            used_mask,
            virtual_pins,
            jam_indicator,
            pin_irq: r.u32(),
            pull_high: r.u32(),
            pull_low: r.u32(),
        })
    }
}

impl fmt::Display for MonHw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Antenna={} Power={} Jamming={} Noise={} AGC={}",
            self.antenna_status,
            self.antenna_power,
            self.jamming_state,
            self.noise_per_ms,
            self.agc_count
        )
    }
}
