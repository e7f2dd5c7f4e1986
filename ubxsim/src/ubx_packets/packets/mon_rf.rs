use core::fmt;

use tracing::debug;

use crate::{
    constants::{UBX_CHECKSUM_LEN, UBX_HEADER_LEN},
    ubx_packets::wire::{PayloadReader, PayloadWriter},
    AntennaPower, AntennaStatus, DecodeError, JammingState, UbxPacketCreator, UbxPacketMeta,
    UbxPacketParse, ValidationError, MAX_AGC_COUNT,
};

pub(crate) const MON_RF_HEADER_LEN: usize = 4;
pub(crate) const MON_RF_BLOCK_LEN: usize = 24;
const MON_RF_VERSION: u8 = 0;

/// RF front-end status of one antenna path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RfBlock {
    /// RF block id, 0 = L1, 1 = L2/L5
    pub block_id: u8,
    pub jamming_state: JammingState,
    pub antenna_status: AntennaStatus,
    pub antenna_power: AntennaPower,
    /// POST status word
    pub post_status: u32,
    pub noise_per_ms: u16,
    pub agc_count: u16,
    /// CW interference suppression level, 0 = none, 255 = strong
    pub cw_suppression: u8,
    pub ofs_i: i8,
    pub mag_i: u8,
    pub ofs_q: i8,
    pub mag_q: u8,
}

impl RfBlock {
    pub fn new(block_id: u8) -> Self {
        Self {
            block_id,
            jamming_state: JammingState::Ok,
            antenna_status: AntennaStatus::Ok,
            antenna_power: AntennaPower::On,
            post_status: 0,
            noise_per_ms: 82,
            agc_count: 5000,
            cw_suppression: 8,
            ofs_i: 0,
            mag_i: 140,
            ofs_q: 0,
            mag_q: 140,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.put_u8(self.block_id);
        out.put_u8(self.jamming_state.into());
        out.put_u8(self.antenna_status.into());
        out.put_u8(self.antenna_power.into());
        out.put_u32(self.post_status);
        out.extend_from_slice(&[0; 4]);
        out.put_u16(self.noise_per_ms);
        out.put_u16(self.agc_count);
        out.put_u8(self.cw_suppression);
        out.put_i8(self.ofs_i);
        out.put_u8(self.mag_i);
        out.put_i8(self.ofs_q);
        out.put_u8(self.mag_q);
        out.extend_from_slice(&[0; 3]);
    }

    fn read(r: &mut PayloadReader<'_>) -> Result<Self, DecodeError> {
        let invalid = |field| DecodeError::InvalidField {
            packet: MonRf::NAME,
            field,
        };
        let block_id = r.u8();
        let jamming_state =
            JammingState::from_u8(r.u8() & 0x03).ok_or_else(|| invalid("flags"))?;
        let antenna_status =
            AntennaStatus::from_u8(r.u8()).ok_or_else(|| invalid("antStatus"))?;
        let antenna_power = AntennaPower::from_u8(r.u8()).ok_or_else(|| invalid("antPower"))?;
        let post_status = r.u32();
        let _reserved1: [u8; 4] = r.bytes();
        let block = Self {
            block_id,
            jamming_state,
            antenna_status,
            antenna_power,
            post_status,
            noise_per_ms: r.u16(),
            agc_count: r.u16(),
            cw_suppression: r.u8(),
            ofs_i: r.i8(),
            mag_i: r.u8(),
            ofs_q: r.i8(),
            mag_q: r.u8(),
        };
        let _reserved2: [u8; 3] = r.bytes();
        Ok(block)
    }
}

/// RF information, one block per RF path
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonRf {
    pub version: u8,
    pub blocks: Vec<RfBlock>,
}

impl MonRf {
    /// `count` default blocks numbered from zero
    pub fn with_blocks(count: u8) -> Self {
        Self {
            version: MON_RF_VERSION,
            blocks: (0..count).map(RfBlock::new).collect(),
        }
    }

    pub fn payload_len(&self) -> usize {
        MON_RF_HEADER_LEN + self.blocks.len() * MON_RF_BLOCK_LEN
    }

    /// Length of the framed message including sync chars and checksum
    pub fn wire_len(&self) -> usize {
        UBX_HEADER_LEN + self.payload_len() + UBX_CHECKSUM_LEN
    }
}

impl Default for MonRf {
    fn default() -> Self {
        Self::with_blocks(1)
    }
}

impl UbxPacketMeta for MonRf {
    const CLASS: u8 = 0x0a;
    const ID: u8 = 0x38;
    const NAME: &'static str = "MON-RF";
}

impl UbxPacketCreator for MonRf {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        if self.blocks.len() > usize::from(u8::MAX) {
            return Err(ValidationError::TooMany {
                packet: Self::NAME,
                field: "RF blocks",
                max: usize::from(u8::MAX),
                got: self.blocks.len(),
            });
        }
        for block in &self.blocks {
            ValidationError::check_range(
                Self::NAME,
                "agcCnt",
                i64::from(block.agc_count),
                0,
                i64::from(MAX_AGC_COUNT),
            )?;
        }
        debug!(
            "Preparing MON-RF message with {} blocks ({} bytes total)",
            self.blocks.len(),
            self.wire_len()
        );
        out.reserve(self.payload_len());
        out.put_u8(self.version);
        out.put_u8(self.blocks.len() as u8);
        out.extend_from_slice(&[0; 2]);
        for block in &self.blocks {
            block.write(out);
        }
        Ok(())
    }
}

impl UbxPacketParse for MonRf {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < MON_RF_HEADER_LEN
            || (payload.len() - MON_RF_HEADER_LEN) % MON_RF_BLOCK_LEN != 0
        {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: MON_RF_HEADER_LEN
                    + payload.len().saturating_sub(MON_RF_HEADER_LEN) / MON_RF_BLOCK_LEN
                        * MON_RF_BLOCK_LEN,
                got: payload.len(),
            });
        }
        let actual = (payload.len() - MON_RF_HEADER_LEN) / MON_RF_BLOCK_LEN;
        let mut r = PayloadReader::new(payload);
        let version = r.u8();
        let declared = usize::from(r.u8());
        let _reserved: [u8; 2] = r.bytes();
        if declared != actual {
            return Err(DecodeError::BlockCountMismatch {
                packet: Self::NAME,
                declared,
                actual,
            });
        }
        let blocks = (0..actual)
            .map(|_| RfBlock::read(&mut r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { version, blocks })
    }
}

impl fmt::Display for MonRf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} RF blocks", self.blocks.len())?;
        for (i, b) in self.blocks.iter().enumerate() {
            write!(
                f,
                "\nBlock {}: antId={}, jamState={}, antStatus={}, antPower={}, noise={}, agc={}",
                i,
                b.block_id,
                b.jamming_state,
                b.antenna_status,
                b.antenna_power,
                b.noise_per_ms,
                b.agc_count
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mon_rf_wire_len_counts_framing() {
        let rf = MonRf::default();
        assert_eq!(rf.payload_len(), 28);
        assert_eq!(rf.wire_len(), 36);
        assert_eq!(rf.to_frame().unwrap().wire_len(), rf.wire_len());
    }

    #[test]
    fn mon_rf_three_blocks() {
        let rf = MonRf::with_blocks(3);
        let frame = rf.to_frame().unwrap();
        assert_eq!(frame.payload().len(), 4 + 3 * MON_RF_BLOCK_LEN);
        assert_eq!(frame.payload()[1], 3);
        let back = MonRf::parse(frame.payload()).unwrap();
        assert_eq!(back.blocks.len(), 3);
        assert_eq!(back, rf);
    }

    #[test]
    fn mon_rf_block_offsets() {
        let mut block = RfBlock::new(1);
        block.jamming_state = JammingState::Critical;
        block.noise_per_ms = 0x1234;
        block.agc_count = 0x0fed;
        block.ofs_i = -3;
        let payload = MonRf {
            version: 0,
            blocks: vec![block],
        }
        .to_frame()
        .unwrap()
        .into_payload();
        let b = &payload[MON_RF_HEADER_LEN..];
        assert_eq!(b[0], 1);
        assert_eq!(b[1], 3);
        assert_eq!(&b[12..14], &[0x34, 0x12]);
        assert_eq!(&b[14..16], &[0xed, 0x0f]);
        assert_eq!(b[17], 0xfd);
    }

    #[test]
    fn mon_rf_declared_count_mismatch() {
        let mut payload = MonRf::with_blocks(2).to_frame().unwrap().into_payload();
        payload[1] = 3;
        assert_eq!(
            MonRf::parse(&payload),
            Err(DecodeError::BlockCountMismatch {
                packet: "MON-RF",
                declared: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn mon_rf_ragged_length() {
        assert!(matches!(
            MonRf::parse(&[0u8; 4 + 23]),
            Err(DecodeError::InvalidPacketLen { got: 27, .. })
        ));
    }

    #[test]
    fn mon_rf_summary() {
        let text = MonRf::with_blocks(1).to_string();
        assert_eq!(
            text,
            "1 RF blocks\nBlock 0: antId=0, jamState=OK, antStatus=OK, antPower=ON, noise=82, agc=5000"
        );
    }
}
