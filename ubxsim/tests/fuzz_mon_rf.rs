//! A proptest generator for MON-RF frames.
//!
//! The frames are assembled byte by byte, independently of the crate's
//! encoder, and then pushed through the streaming parser and the decoder.

use byteorder::{LittleEndian, WriteBytesExt};
use proptest::prelude::*;
use ubxsim::{
    match_packet, FrameParser, ParserEvent, UbxPacket, UbxPacketCreator, UBX_SYNC_CHAR_1,
    UBX_SYNC_CHAR_2,
};

/// Raw field values of one RF block, compared against the decoded output
#[derive(Debug, Clone)]
pub struct RfBlock {
    pub block_id: u8,
    pub flags: u8,
    pub ant_status: u8,
    pub ant_power: u8,
    pub post_status: u32,
    pub noise_per_ms: u16,
    pub agc_cnt: u16,
    pub jam_ind: u8,
    pub ofs_i: i8,
    pub mag_i: u8,
    pub ofs_q: i8,
    pub mag_q: u8,
}

impl RfBlock {
    pub fn to_bytes(&self, wtr: &mut Vec<u8>) {
        wtr.write_u8(self.block_id).unwrap();
        wtr.write_u8(self.flags).unwrap();
        wtr.write_u8(self.ant_status).unwrap();
        wtr.write_u8(self.ant_power).unwrap();
        wtr.write_u32::<LittleEndian>(self.post_status).unwrap();
        wtr.extend_from_slice(&[0; 4]);
        wtr.write_u16::<LittleEndian>(self.noise_per_ms).unwrap();
        wtr.write_u16::<LittleEndian>(self.agc_cnt).unwrap();
        wtr.write_u8(self.jam_ind).unwrap();
        wtr.write_i8(self.ofs_i).unwrap();
        wtr.write_u8(self.mag_i).unwrap();
        wtr.write_i8(self.ofs_q).unwrap();
        wtr.write_u8(self.mag_q).unwrap();
        wtr.extend_from_slice(&[0; 3]);
    }
}

#[derive(Debug, Clone)]
pub struct MonRf {
    pub version: u8,
    pub blocks: Vec<RfBlock>,
}

impl MonRf {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut wtr = Vec::with_capacity(4 + self.blocks.len() * 24);
        wtr.write_u8(self.version).unwrap();
        wtr.write_u8(self.blocks.len() as u8).unwrap();
        wtr.extend_from_slice(&[0; 2]);
        for block in &self.blocks {
            block.to_bytes(&mut wtr);
        }
        wtr
    }
}

pub fn rf_block_strategy() -> impl Strategy<Value = RfBlock> {
    (
        (
            any::<u8>(),                                                // block_id
            (0..=3u8),                                                  // flags, jamming state only
            prop_oneof![Just(0u8), Just(1), Just(2), Just(3), Just(4)], // ant_status
            prop_oneof![Just(0u8), Just(1), Just(2)],                   // ant_power
            any::<u32>(),                                               // post_status
            any::<u16>(),                                               // noise_per_ms
        ),
        (
            (0..=8191u16), // agc_cnt
            any::<u8>(),   // jam_ind
            any::<i8>(),   // ofs_i
            any::<u8>(),   // mag_i
            any::<i8>(),   // ofs_q
            any::<u8>(),   // mag_q
        ),
    )
        .prop_map(
            |(
                (block_id, flags, ant_status, ant_power, post_status, noise_per_ms),
                (agc_cnt, jam_ind, ofs_i, mag_i, ofs_q, mag_q),
            )| RfBlock {
                block_id,
                flags,
                ant_status,
                ant_power,
                post_status,
                noise_per_ms,
                agc_cnt,
                jam_ind,
                ofs_i,
                mag_i,
                ofs_q,
                mag_q,
            },
        )
}

pub fn mon_rf_payload_strategy() -> impl Strategy<Value = MonRf> {
    prop::collection::vec(rf_block_strategy(), 0..=42)
        .prop_map(|blocks| MonRf { version: 0, blocks })
}

fn calculate_checksum(data: &[u8]) -> (u8, u8) {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for byte in data {
        ck_a = ck_a.wrapping_add(*byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    (ck_a, ck_b)
}

/// A complete MON-RF frame together with the values it was built from
pub fn ubx_mon_rf_frame_strategy() -> impl Strategy<Value = (MonRf, Vec<u8>)> {
    mon_rf_payload_strategy().prop_map(|mon_rf| {
        let payload = mon_rf.to_bytes();

        let mut frame_core = Vec::with_capacity(4 + payload.len());
        frame_core.push(0x0a);
        frame_core.push(0x38);
        frame_core
            .write_u16::<LittleEndian>(payload.len() as u16)
            .unwrap();
        frame_core.extend_from_slice(&payload);

        let (ck_a, ck_b) = calculate_checksum(&frame_core);

        let mut final_frame = Vec::with_capacity(8 + payload.len());
        final_frame.push(UBX_SYNC_CHAR_1);
        final_frame.push(UBX_SYNC_CHAR_2);
        final_frame.extend_from_slice(&frame_core);
        final_frame.push(ck_a);
        final_frame.push(ck_b);

        (mon_rf, final_frame)
    })
}

proptest! {
    #[test]
    fn test_parser_with_generated_mon_rf_frames(
        (expected, frame) in ubx_mon_rf_frame_strategy(),
        chunk in 1usize..64,
    ) {
        let mut parser = FrameParser::new();
        let mut frames = vec![];
        for part in frame.chunks(chunk) {
            for event in parser.feed(part) {
                match event {
                    Ok(ParserEvent::Frame(f)) => frames.push(f),
                    other => panic!("unexpected parser event {:?}", other),
                }
            }
        }
        prop_assert_eq!(frames.len(), 1);
        prop_assert!(parser.is_buffer_empty());

        let f = &frames[0];
        let Ok(UbxPacket::MonRf(p)) = match_packet(f.class(), f.msg_id(), f.payload()) else {
            panic!("Failed to decode a valid MON-RF payload");
        };

        prop_assert_eq!(p.version, expected.version);
        prop_assert_eq!(p.blocks.len(), expected.blocks.len());
        for (block, exp) in p.blocks.iter().zip(expected.blocks.iter()) {
            prop_assert_eq!(block.block_id, exp.block_id);
            prop_assert_eq!(u8::from(block.jamming_state), exp.flags);
            prop_assert_eq!(u8::from(block.antenna_status), exp.ant_status);
            prop_assert_eq!(u8::from(block.antenna_power), exp.ant_power);
            prop_assert_eq!(block.post_status, exp.post_status);
            prop_assert_eq!(block.noise_per_ms, exp.noise_per_ms);
            prop_assert_eq!(block.agc_count, exp.agc_cnt);
            prop_assert_eq!(block.cw_suppression, exp.jam_ind);
            prop_assert_eq!(block.ofs_i, exp.ofs_i);
            prop_assert_eq!(block.mag_i, exp.mag_i);
            prop_assert_eq!(block.ofs_q, exp.ofs_q);
            prop_assert_eq!(block.mag_q, exp.mag_q);
        }

        // the crate's own encoder produces the identical frame
        prop_assert_eq!(p.to_packet_bytes().unwrap(), frame);
    }
}
