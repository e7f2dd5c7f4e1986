use core::fmt;

use bitflags::bitflags;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, UtcStandard, ValidationError,
};

bitflags! {
    /// Validity flags of NAV-TIMEUTC
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NavTimeUtcFlags: u8 {
        /// Valid Time of Week
        const VALID_TOW = 0x01;
        /// Valid Week Number
        const VALID_WKN = 0x02;
        /// Valid UTC (Leap Seconds already known)
        const VALID_UTC = 0x04;
    }
}

/// UTC time solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavTimeUtc {
    pub itow: u32,
    /// Time accuracy estimate, ns
    pub time_accuracy: u32,
    /// Fraction of second, ns
    pub nano: i32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub valid: NavTimeUtcFlags,
    pub utc_standard: UtcStandard,
}

const NAV_TIMEUTC_LEN: usize = 20;

impl UbxPacketMeta for NavTimeUtc {
    const CLASS: u8 = 0x01;
    const ID: u8 = 0x21;
    const NAME: &'static str = "NAV-TIMEUTC";
}

impl UbxPacketCreator for NavTimeUtc {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        if self.valid.contains(NavTimeUtcFlags::VALID_UTC) {
            ValidationError::check_range(Self::NAME, "month", i64::from(self.month), 1, 12)?;
            ValidationError::check_range(Self::NAME, "day", i64::from(self.day), 1, 31)?;
            ValidationError::check_range(Self::NAME, "hour", i64::from(self.hour), 0, 23)?;
            ValidationError::check_range(Self::NAME, "min", i64::from(self.min), 0, 59)?;
            ValidationError::check_range(Self::NAME, "sec", i64::from(self.sec), 0, 60)?;
        }
        out.put_u32(self.itow);
        out.put_u32(self.time_accuracy);
        out.put_i32(self.nano);
        out.put_u16(self.year);
        out.put_u8(self.month);
        out.put_u8(self.day);
        out.put_u8(self.hour);
        out.put_u8(self.min);
        out.put_u8(self.sec);
        out.put_u8(self.valid.bits() | (u8::from(self.utc_standard) << 4));
        Ok(())
    }
}

impl UbxPacketParse for NavTimeUtc {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, NAV_TIMEUTC_LEN)?;
        let mut r = PayloadReader::new(payload);
        let itow = r.u32();
        let time_accuracy = r.u32();
        let nano = r.i32();
        let year = r.u16();
        let month = r.u8();
        let day = r.u8();
        let hour = r.u8();
        let min = r.u8();
        let sec = r.u8();
        let valid = r.u8();
        let utc_standard = UtcStandard::from_u8(valid >> 4).ok_or(DecodeError::InvalidField {
            packet: Self::NAME,
            field: "utcStandard",
        })?;
        Ok(Self {
            itow,
            time_accuracy,
            nano,
            year,
            month,
            day,
            hour,
            min,
            sec,
            valid: NavTimeUtcFlags::from_bits_retain(valid & 0x0f),
            utc_standard,
        })
    }
}

impl fmt::Display for NavTimeUtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC ({}) valid=0x{:02X}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.min,
            self.sec,
            self.utc_standard,
            self.valid.bits()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn time_utc_roundtrip() {
        let t = NavTimeUtc {
            itow: 302_418_000,
            time_accuracy: 20,
            nano: 999_999,
            year: 2024,
            month: 2,
            day: 29,
            hour: 23,
            min: 59,
            sec: 60,
            valid: NavTimeUtcFlags::all(),
            utc_standard: UtcStandard::Usno,
        };
        let frame = t.to_frame().unwrap();
        assert_eq!(frame.len(), 20);
        assert_eq!(frame.payload()[19], 0x37);
        assert_eq!(NavTimeUtc::parse(frame.payload()).unwrap(), t);
        assert_eq!(
            t.to_string(),
            "2024-02-29 23:59:60 UTC (USNO) valid=0x07"
        );
    }

    #[test]
    fn time_utc_unknown_standard() {
        let mut payload = [0u8; 20];
        payload[19] = 0x84;
        assert!(NavTimeUtc::parse(&payload).is_err());
        payload[19] = 0xf4;
        assert_eq!(
            NavTimeUtc::parse(&payload).unwrap().utc_standard,
            UtcStandard::Unknown
        );
    }
}
