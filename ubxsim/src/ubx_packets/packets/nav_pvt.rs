use core::fmt;

use bitflags::bitflags;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, GnssFixType, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

bitflags! {
    /// Validity of the date and time fields
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NavPvtValidFlags: u8 {
        const VALID_DATE = 0x01;
        const VALID_TIME = 0x02;
        const FULLY_RESOLVED = 0x04;
        const VALID_MAG = 0x08;
    }
}

bitflags! {
    /// Fix status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NavPvtFlags: u8 {
        /// Position and velocity valid and within DOP and accuracy masks
        const GPS_FIX_OK = 0x01;
        /// Differential corrections were applied
        const DIFF_SOLN = 0x02;
        const HEAD_VEH_VALID = 0x20;
        const CARR_SOLN_FLOAT = 0x40;
        const CARR_SOLN_FIXED = 0x80;
    }
}

/// Navigation position velocity time solution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavPvt {
    /// GPS time of week of the navigation epoch, ms
    pub itow: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub valid: NavPvtValidFlags,
    /// Time accuracy estimate, ns
    pub time_accuracy: u32,
    /// Fraction of second, ns
    pub nano: i32,
    pub fix_type: GnssFixType,
    pub flags: NavPvtFlags,
    pub flags2: u8,
    pub num_satellites: u8,
    /// Longitude, 1e-7 degrees
    pub lon: i32,
    /// Latitude, 1e-7 degrees
    pub lat: i32,
    /// Height above ellipsoid, mm
    pub height_meters: i32,
    /// Height above mean sea level, mm
    pub height_msl: i32,
    /// Horizontal accuracy estimate, mm
    pub horiz_accuracy: u32,
    /// Vertical accuracy estimate, mm
    pub vert_accuracy: u32,
    /// NED north velocity, mm/s
    pub vel_n: i32,
    /// NED east velocity, mm/s
    pub vel_e: i32,
    /// NED down velocity, mm/s
    pub vel_d: i32,
    /// Ground speed (2-D), mm/s
    pub ground_speed: i32,
    /// Heading of motion (2-D), 1e-5 degrees
    pub heading_motion: i32,
    /// Speed accuracy estimate, mm/s
    pub speed_accuracy: u32,
    /// Heading accuracy estimate, 1e-5 degrees
    pub heading_accuracy: u32,
    /// Position DOP, 0.01
    pub pdop: u16,
    pub flags3: u8,
    /// Heading of vehicle (2-D), 1e-5 degrees
    pub heading_vehicle: i32,
    /// Magnetic declination, 1e-2 degrees
    pub magnetic_declination: i16,
    /// Magnetic declination accuracy, 1e-2 degrees
    pub magnetic_declination_accuracy: u16,
}

pub(crate) const NAV_PVT_LEN: usize = 92;

impl NavPvt {
    pub fn lon_degrees(&self) -> f64 {
        f64::from(self.lon) * 1e-7
    }

    pub fn lat_degrees(&self) -> f64 {
        f64::from(self.lat) * 1e-7
    }

    /// Height above mean sea level, m
    pub fn height_msl(&self) -> f64 {
        f64::from(self.height_msl) * 1e-3
    }

    /// Ground speed, m/s
    pub fn ground_speed_2d(&self) -> f64 {
        f64::from(self.ground_speed) * 1e-3
    }

    pub fn heading_degrees(&self) -> f64 {
        f64::from(self.heading_motion) * 1e-5
    }

    pub fn pdop_value(&self) -> f64 {
        f64::from(self.pdop) * 1e-2
    }
}

impl UbxPacketMeta for NavPvt {
    const CLASS: u8 = 0x01;
    const ID: u8 = 0x07;
    const NAME: &'static str = "NAV-PVT";
}

impl UbxPacketCreator for NavPvt {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        ValidationError::check_range(Self::NAME, "lat", i64::from(self.lat), -900_000_000, 900_000_000)?;
        ValidationError::check_range(
            Self::NAME,
            "lon",
            i64::from(self.lon),
            -1_800_000_000,
            1_800_000_000,
        )?;
        if self.valid.contains(NavPvtValidFlags::VALID_DATE) {
            ValidationError::check_range(Self::NAME, "month", i64::from(self.month), 1, 12)?;
            ValidationError::check_range(Self::NAME, "day", i64::from(self.day), 1, 31)?;
        }
        if self.valid.contains(NavPvtValidFlags::VALID_TIME) {
            ValidationError::check_range(Self::NAME, "hour", i64::from(self.hour), 0, 23)?;
            ValidationError::check_range(Self::NAME, "min", i64::from(self.min), 0, 59)?;
            ValidationError::check_range(Self::NAME, "sec", i64::from(self.sec), 0, 60)?;
        }

        out.put_u32(self.itow);
        out.put_u16(self.year);
        out.put_u8(self.month);
        out.put_u8(self.day);
        out.put_u8(self.hour);
        out.put_u8(self.min);
        out.put_u8(self.sec);
        out.put_u8(self.valid.bits());
        out.put_u32(self.time_accuracy);
        out.put_i32(self.nano);
        out.put_u8(self.fix_type.into());
        out.put_u8(self.flags.bits());
        out.put_u8(self.flags2);
        out.put_u8(self.num_satellites);
        out.put_i32(self.lon);
        out.put_i32(self.lat);
        out.put_i32(self.height_meters);
        out.put_i32(self.height_msl);
        out.put_u32(self.horiz_accuracy);
        out.put_u32(self.vert_accuracy);
        out.put_i32(self.vel_n);
        out.put_i32(self.vel_e);
        out.put_i32(self.vel_d);
        out.put_i32(self.ground_speed);
        out.put_i32(self.heading_motion);
        out.put_u32(self.speed_accuracy);
        out.put_u32(self.heading_accuracy);
        out.put_u16(self.pdop);
        out.put_u8(self.flags3);
        out.extend_from_slice(&[0; 5]);
        out.put_i32(self.heading_vehicle);
        out.put_i16(self.magnetic_declination);
        out.put_u16(self.magnetic_declination_accuracy);
        Ok(())
    }
}

impl UbxPacketParse for NavPvt {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, NAV_PVT_LEN)?;
        let mut r = PayloadReader::new(payload);
        let itow = r.u32();
        let year = r.u16();
        let month = r.u8();
        let day = r.u8();
        let hour = r.u8();
        let min = r.u8();
        let sec = r.u8();
        let valid = NavPvtValidFlags::from_bits_retain(r.u8());
        let time_accuracy = r.u32();
        let nano = r.i32();
        let fix_type = GnssFixType::from_u8(r.u8()).ok_or(DecodeError::InvalidField {
            packet: Self::NAME,
            field: "fixType",
        })?;
        let flags = NavPvtFlags::from_bits_retain(r.u8());
        let flags2 = r.u8();
        let num_satellites = r.u8();
        let lon = r.i32();
        let lat = r.i32();
        let height_meters = r.i32();
        let height_msl = r.i32();
        let horiz_accuracy = r.u32();
        let vert_accuracy = r.u32();
        let vel_n = r.i32();
        let vel_e = r.i32();
        let vel_d = r.i32();
        let ground_speed = r.i32();
        let heading_motion = r.i32();
        let speed_accuracy = r.u32();
        let heading_accuracy = r.u32();
        let pdop = r.u16();
        let flags3 = r.u8();
        let _reserved1: [u8; 5] = r.bytes();
        Ok(Self {
            itow,
            year,
            month,
            day,
            hour,
            min,
            sec,
            valid,
            time_accuracy,
            nano,
            fix_type,
            flags,
            flags2,
            num_satellites,
            lon,
            lat,
            height_meters,
            height_msl,
            horiz_accuracy,
            vert_accuracy,
            vel_n,
            vel_e,
            vel_d,
            ground_speed,
            heading_motion,
            speed_accuracy,
            heading_accuracy,
            pdop,
            flags3,
            heading_vehicle: r.i32(),
            magnetic_declination: r.i16(),
            magnetic_declination_accuracy: r.u16(),
        })
    }
}

impl fmt::Display for NavPvt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat={:.7} Lon={:.7} Fix={} Sats={}",
            self.lat_degrees(),
            self.lon_degrees(),
            self.fix_type,
            self.num_satellites
        )
    }
}
