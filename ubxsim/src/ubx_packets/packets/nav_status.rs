use core::fmt;

use bitflags::bitflags;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, GnssFixType, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

bitflags! {
    /// Navigation Status Flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NavStatusFlags: u8 {
        /// Position and velocity valid and within DOP and accuracy masks
        const GPS_FIX_OK = 1;
        /// DGPS used
        const DIFF_SOLN = 2;
        /// Week number valid
        const WKN_SET = 4;
        /// Time of week valid
        const TOW_SET = 8;
    }
}

/// Receiver navigation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavStatus {
    /// GPS time of week of the navigation epoch, ms
    pub itow: u32,
    pub fix_type: GnssFixType,
    pub flags: NavStatusFlags,
    /// Differential status and map matching bits
    pub fix_stat: u8,
    /// Power save mode, spoofing and carrier solution bits
    pub flags2: u8,
    /// Time to first fix, ms
    pub time_to_first_fix: u32,
    /// Milliseconds since startup or reset
    pub uptime_ms: u32,
}

const NAV_STATUS_LEN: usize = 16;

impl UbxPacketMeta for NavStatus {
    const CLASS: u8 = 0x01;
    const ID: u8 = 0x03;
    const NAME: &'static str = "NAV-STATUS";
}

impl UbxPacketCreator for NavStatus {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        out.put_u32(self.itow);
        out.put_u8(self.fix_type.into());
        out.put_u8(self.flags.bits());
        out.put_u8(self.fix_stat);
        out.put_u8(self.flags2);
        out.put_u32(self.time_to_first_fix);
        out.put_u32(self.uptime_ms);
        Ok(())
    }
}

impl UbxPacketParse for NavStatus {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, NAV_STATUS_LEN)?;
        let mut r = PayloadReader::new(payload);
        let itow = r.u32();
        let fix_type = GnssFixType::from_u8(r.u8()).ok_or(DecodeError::InvalidField {
            packet: Self::NAME,
            field: "gpsFix",
        })?;
        Ok(Self {
            itow,
            fix_type,
            flags: NavStatusFlags::from_bits_retain(r.u8()),
            fix_stat: r.u8(),
            flags2: r.u8(),
            time_to_first_fix: r.u32(),
            uptime_ms: r.u32(),
        })
    }
}

impl fmt::Display for NavStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fix={} TTFF={}ms",
            self.fix_type, self.time_to_first_fix
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nav_status_layout() {
        let status = NavStatus {
            itow: 0x0102_0304,
            fix_type: GnssFixType::Fix3D,
            flags: NavStatusFlags::GPS_FIX_OK | NavStatusFlags::WKN_SET | NavStatusFlags::TOW_SET,
            fix_stat: 0,
            flags2: 0,
            time_to_first_fix: 28_500,
            uptime_ms: 60_000,
        };
        let frame = status.to_frame().unwrap();
        assert_eq!(
            frame.payload(),
            [
                0x04, 0x03, 0x02, 0x01, 0x03, 0x0d, 0x00, 0x00, 0x54, 0x6f, 0x00, 0x00, 0x60,
                0xea, 0x00, 0x00
            ]
        );
        assert_eq!(NavStatus::parse(frame.payload()).unwrap(), status);
        assert_eq!(status.to_string(), "Fix=3D Fix TTFF=28500ms");
    }

    #[test]
    fn nav_status_wrong_len() {
        assert!(matches!(
            NavStatus::parse(&[0; 15]),
            Err(DecodeError::InvalidPacketLen {
                expect: 16,
                got: 15,
                ..
            })
        ));
    }
}
