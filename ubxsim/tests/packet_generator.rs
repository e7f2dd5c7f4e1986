//! A proptest generator for NAV-PVT frames.
//!
//! Payloads are built from raw field values with `byteorder` so the decoder is
//! checked against an encoding it did not produce itself.

use byteorder::{LittleEndian, WriteBytesExt};
use proptest::prelude::*;
use ubxsim::{match_packet, FrameParser, ParserEvent, UbxPacket, UbxPacketCreator};

#[derive(Debug, Clone)]
pub struct NavPvt {
    pub itow: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub valid: u8,
    pub t_acc: u32,
    pub nano: i32,
    pub fix_type: u8,
    pub flags: u8,
    pub flags2: u8,
    pub num_sv: u8,
    pub lon: i32,
    pub lat: i32,
    pub height: i32,
    pub h_msl: i32,
    pub h_acc: u32,
    pub v_acc: u32,
    pub vel_n: i32,
    pub vel_e: i32,
    pub vel_d: i32,
    pub g_speed: i32,
    pub head_mot: i32,
    pub s_acc: u32,
    pub head_acc: u32,
    pub p_dop: u16,
    pub flags3: u8,
    pub head_veh: i32,
    pub mag_dec: i16,
    pub mag_acc: u16,
}

impl NavPvt {
    /// Serializes the payload into 92 bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut wtr = Vec::with_capacity(92);
        wtr.write_u32::<LittleEndian>(self.itow).unwrap();
        wtr.write_u16::<LittleEndian>(self.year).unwrap();
        wtr.write_u8(self.month).unwrap();
        wtr.write_u8(self.day).unwrap();
        wtr.write_u8(self.hour).unwrap();
        wtr.write_u8(self.min).unwrap();
        wtr.write_u8(self.sec).unwrap();
        wtr.write_u8(self.valid).unwrap();
        wtr.write_u32::<LittleEndian>(self.t_acc).unwrap();
        wtr.write_i32::<LittleEndian>(self.nano).unwrap();
        wtr.write_u8(self.fix_type).unwrap();
        wtr.write_u8(self.flags).unwrap();
        wtr.write_u8(self.flags2).unwrap();
        wtr.write_u8(self.num_sv).unwrap();
        wtr.write_i32::<LittleEndian>(self.lon).unwrap();
        wtr.write_i32::<LittleEndian>(self.lat).unwrap();
        wtr.write_i32::<LittleEndian>(self.height).unwrap();
        wtr.write_i32::<LittleEndian>(self.h_msl).unwrap();
        wtr.write_u32::<LittleEndian>(self.h_acc).unwrap();
        wtr.write_u32::<LittleEndian>(self.v_acc).unwrap();
        wtr.write_i32::<LittleEndian>(self.vel_n).unwrap();
        wtr.write_i32::<LittleEndian>(self.vel_e).unwrap();
        wtr.write_i32::<LittleEndian>(self.vel_d).unwrap();
        wtr.write_i32::<LittleEndian>(self.g_speed).unwrap();
        wtr.write_i32::<LittleEndian>(self.head_mot).unwrap();
        wtr.write_u32::<LittleEndian>(self.s_acc).unwrap();
        wtr.write_u32::<LittleEndian>(self.head_acc).unwrap();
        wtr.write_u16::<LittleEndian>(self.p_dop).unwrap();
        wtr.write_u8(self.flags3).unwrap();
        wtr.extend_from_slice(&[0; 5]);
        wtr.write_i32::<LittleEndian>(self.head_veh).unwrap();
        wtr.write_i16::<LittleEndian>(self.mag_dec).unwrap();
        wtr.write_u16::<LittleEndian>(self.mag_acc).unwrap();
        wtr
    }
}

pub fn nav_pvt_payload_strategy() -> impl Strategy<Value = NavPvt> {
    let time_and_date = (
        any::<u32>(),                        // itow
        (1999..=2099u16),                    // year
        (1..=12u8),                          // month
        (1..=31u8),                          // day
        (0..=23u8),                          // hour
        (0..=59u8),                          // min
        (0..=60u8),                          // sec
        any::<u8>(),                         // valid
        any::<u32>(),                        // t_acc
        (-1_000_000_000..=1_000_000_000i32), // nano
    );

    let fix_and_pos = (
        (0..=5u8),                         // fix_type
        any::<u8>(),                       // flags
        any::<u8>(),                       // flags2
        (0..=99u8),                        // num_sv
        (-1_800_000_000..=1_800_000_000i32), // lon
        (-900_000_000..=900_000_000i32),   // lat
        any::<i32>(),                      // height
        any::<i32>(),                      // h_msl
        any::<u32>(),                      // h_acc
        any::<u32>(),                      // v_acc
    );

    let velocity_and_heading = (
        any::<i32>(), // vel_n
        any::<i32>(), // vel_e
        any::<i32>(), // vel_d
        any::<i32>(), // g_speed
        any::<i32>(), // head_mot
        any::<u32>(), // s_acc
        any::<u32>(), // head_acc
        any::<u16>(), // p_dop
        any::<u8>(),  // flags3
        any::<i32>(), // head_veh
        any::<i16>(), // mag_dec
        any::<u16>(), // mag_acc
    );

    (time_and_date, fix_and_pos, velocity_and_heading).prop_map(
        |(
            (itow, year, month, day, hour, min, sec, valid, t_acc, nano),
            (fix_type, flags, flags2, num_sv, lon, lat, height, h_msl, h_acc, v_acc),
            (
                vel_n,
                vel_e,
                vel_d,
                g_speed,
                head_mot,
                s_acc,
                head_acc,
                p_dop,
                flags3,
                head_veh,
                mag_dec,
                mag_acc,
            ),
        )| NavPvt {
            itow,
            year,
            month,
            day,
            hour,
            min,
            sec,
            valid,
            t_acc,
            nano,
            fix_type,
            flags,
            flags2,
            num_sv,
            lon,
            lat,
            height,
            h_msl,
            h_acc,
            v_acc,
            vel_n,
            vel_e,
            vel_d,
            g_speed,
            head_mot,
            s_acc,
            head_acc,
            p_dop,
            flags3,
            head_veh,
            mag_dec,
            mag_acc,
        },
    )
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

pub fn ubx_nav_pvt_frame_strategy() -> impl Strategy<Value = (NavPvt, Vec<u8>)> {
    nav_pvt_payload_strategy().prop_map(|nav_pvt| {
        let payload = nav_pvt.to_bytes();

        let mut frame_core = Vec::with_capacity(4 + payload.len());
        frame_core.push(0x01);
        frame_core.push(0x07);
        frame_core
            .write_u16::<LittleEndian>(payload.len() as u16)
            .unwrap();
        frame_core.extend_from_slice(&payload);
        let (ck_a, ck_b) = calculate_checksum(&frame_core);

        let mut final_frame = vec![0xb5, 0x62];
        final_frame.extend_from_slice(&frame_core);
        final_frame.push(ck_a);
        final_frame.push(ck_b);
        (nav_pvt, final_frame)
    })
}

proptest! {
    #[test]
    fn test_parser_with_generated_nav_pvt_frames(
        (expected, frame) in ubx_nav_pvt_frame_strategy(),
        garbage in prop::collection::vec(0u8..0xb5, 0..16),
    ) {
        let mut data = garbage.clone();
        data.extend_from_slice(&frame);

        let mut parser = FrameParser::new();
        let frames: Vec<_> = parser
            .feed(&data)
            .filter_map(|event| match event {
                Ok(ParserEvent::Frame(f)) => Some(f),
                _ => None,
            })
            .collect();
        prop_assert_eq!(frames.len(), 1);

        let f = &frames[0];
        let Ok(UbxPacket::NavPvt(p)) = match_packet(f.class(), f.msg_id(), f.payload()) else {
            panic!("Failed to decode a valid NAV-PVT payload");
        };

        prop_assert_eq!(p.itow, expected.itow);
        prop_assert_eq!(p.year, expected.year);
        prop_assert_eq!(p.month, expected.month);
        prop_assert_eq!(p.day, expected.day);
        prop_assert_eq!(p.hour, expected.hour);
        prop_assert_eq!(p.min, expected.min);
        prop_assert_eq!(p.sec, expected.sec);
        prop_assert_eq!(p.valid.bits(), expected.valid);
        prop_assert_eq!(p.time_accuracy, expected.t_acc);
        prop_assert_eq!(p.nano, expected.nano);
        prop_assert_eq!(u8::from(p.fix_type), expected.fix_type);
        prop_assert_eq!(p.flags.bits(), expected.flags);
        prop_assert_eq!(p.flags2, expected.flags2);
        prop_assert_eq!(p.num_satellites, expected.num_sv);
        prop_assert_eq!(p.lon, expected.lon);
        prop_assert_eq!(p.lat, expected.lat);
        prop_assert_eq!(p.height_meters, expected.height);
        prop_assert_eq!(p.height_msl, expected.h_msl);
        prop_assert_eq!(p.horiz_accuracy, expected.h_acc);
        prop_assert_eq!(p.vert_accuracy, expected.v_acc);
        prop_assert_eq!(p.vel_n, expected.vel_n);
        prop_assert_eq!(p.vel_e, expected.vel_e);
        prop_assert_eq!(p.vel_d, expected.vel_d);
        prop_assert_eq!(p.ground_speed, expected.g_speed);
        prop_assert_eq!(p.heading_motion, expected.head_mot);
        prop_assert_eq!(p.speed_accuracy, expected.s_acc);
        prop_assert_eq!(p.heading_accuracy, expected.head_acc);
        prop_assert_eq!(p.pdop, expected.p_dop);
        prop_assert_eq!(p.flags3, expected.flags3);
        prop_assert_eq!(p.heading_vehicle, expected.head_veh);
        prop_assert_eq!(p.magnetic_declination, expected.mag_dec);
        prop_assert_eq!(p.magnetic_declination_accuracy, expected.mag_acc);

        prop_assert!((p.lat_degrees() - f64::from(expected.lat) * 1e-7).abs() < 1e-9);
        prop_assert_eq!(p.to_packet_bytes().unwrap(), frame);
    }
}
