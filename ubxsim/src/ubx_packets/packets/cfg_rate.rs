use core::{fmt, time::Duration};

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

ubx_enum! {
    /// Time system to which measurements are aligned
    pub enum AlignmentToReferenceTime {
        Utc = 0 => "UTC",
        Gps = 1 => "GPS",
        Glo = 2 => "GLONASS",
        Bds = 3 => "BeiDou",
        Gal = 4 => "Galileo",
    }
}

/// Navigation/measurement rate settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgRate {
    /// Elapsed time between GNSS measurements, ms
    pub measure_rate_ms: u16,
    /// Number of measurement cycles per navigation solution
    pub nav_rate: u16,
    pub time_ref: AlignmentToReferenceTime,
}

const CFG_RATE_LEN: usize = 6;
pub(crate) const MIN_MEAS_RATE_MS: u16 = 25;
pub(crate) const MAX_NAV_RATE: u16 = 127;

impl Default for CfgRate {
    fn default() -> Self {
        Self {
            measure_rate_ms: 1000,
            nav_rate: 1,
            time_ref: AlignmentToReferenceTime::Gps,
        }
    }
}

impl CfgRate {
    /// Interval between navigation solutions
    pub fn solution_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.measure_rate_ms) * u64::from(self.nav_rate.max(1)))
    }
}

impl UbxPacketMeta for CfgRate {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x08;
    const NAME: &'static str = "CFG-RATE";
}

impl UbxPacketCreator for CfgRate {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        ValidationError::check_range(
            Self::NAME,
            "measRate",
            i64::from(self.measure_rate_ms),
            i64::from(MIN_MEAS_RATE_MS),
            i64::from(u16::MAX),
        )?;
        ValidationError::check_range(
            Self::NAME,
            "navRate",
            i64::from(self.nav_rate),
            1,
            i64::from(MAX_NAV_RATE),
        )?;
        out.put_u16(self.measure_rate_ms);
        out.put_u16(self.nav_rate);
        out.put_u16(u16::from(u8::from(self.time_ref)));
        Ok(())
    }
}

impl UbxPacketParse for CfgRate {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, CFG_RATE_LEN)?;
        let mut r = PayloadReader::new(payload);
        let measure_rate_ms = r.u16();
        let nav_rate = r.u16();
        let time_ref = u8::try_from(r.u16())
            .ok()
            .and_then(AlignmentToReferenceTime::from_u8)
            .ok_or(DecodeError::InvalidField {
                packet: Self::NAME,
                field: "timeRef",
            })?;
        if measure_rate_ms == 0 || nav_rate == 0 {
            return Err(DecodeError::InvalidField {
                packet: Self::NAME,
                field: if measure_rate_ms == 0 {
                    "measRate"
                } else {
                    "navRate"
                },
            });
        }
        Ok(Self {
            measure_rate_ms,
            nav_rate,
            time_ref,
        })
    }
}

impl fmt::Display for CfgRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MeasRate={}ms, NavRate={}, TimeRef={}",
            self.measure_rate_ms, self.nav_rate, self.time_ref
        )
    }
}
