use core::fmt;

use crate::{
    ubx_packets::wire::{PayloadReader, PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

ubx_enum! {
    pub enum GnssId {
        Gps = 0 => "GPS",
        Sbas = 1 => "SBAS",
        Galileo = 2 => "Galileo",
        Beidou = 3 => "BeiDou",
        Imes = 4 => "IMES",
        Qzss = 5 => "QZSS",
        Glonass = 6 => "GLONASS",
        Navic = 7 => "NavIC",
    }
}

ubx_enum! {
    /// Signal quality indicator
    pub enum NavSatQualityIndicator {
        NoSignal = 0 => "no signal",
        Searching = 1 => "searching",
        SignalAcquired = 2 => "acquired",
        SignalDetected = 3 => "unusable",
        CodeLock = 4 => "code locked",
        CarrierLock5 = 5 => "code and carrier locked",
        CarrierLock6 = 6 => "code and carrier locked",
        CarrierLock7 = 7 => "code and carrier locked",
    }
}

ubx_enum! {
    pub enum NavSatSvHealth {
        Unknown = 0 => "unknown",
        Healthy = 1 => "healthy",
        Unhealthy = 2 => "unhealthy",
    }
}

ubx_enum! {
    pub enum NavSatOrbitSource {
        NoInfoAvailable = 0 => "none",
        Ephemeris = 1 => "ephemeris",
        Almanac = 2 => "almanac",
        AssistNowOffline = 3 => "AssistNow Offline",
        AssistNowAutonomous = 4 => "AssistNow Autonomous",
        Other5 = 5 => "other",
        Other6 = 6 => "other",
        Other7 = 7 => "other",
    }
}

/// Per satellite status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavSatSvFlags {
    pub quality: NavSatQualityIndicator,
    /// Used for navigation
    pub sv_used: bool,
    pub health: NavSatSvHealth,
    pub diff_corr: bool,
    pub smoothed: bool,
    pub orbit_source: NavSatOrbitSource,
    pub eph_avail: bool,
    pub alm_avail: bool,
}

impl Default for NavSatSvFlags {
    fn default() -> Self {
        Self {
            quality: NavSatQualityIndicator::CarrierLock7,
            sv_used: true,
            health: NavSatSvHealth::Healthy,
            diff_corr: false,
            smoothed: false,
            orbit_source: NavSatOrbitSource::Ephemeris,
            eph_avail: true,
            alm_avail: true,
        }
    }
}

impl NavSatSvFlags {
    pub fn to_bits(self) -> u32 {
        u32::from(u8::from(self.quality))
            | (u32::from(self.sv_used) << 3)
            | (u32::from(u8::from(self.health)) << 4)
            | (u32::from(self.diff_corr) << 6)
            | (u32::from(self.smoothed) << 7)
            | (u32::from(u8::from(self.orbit_source)) << 8)
            | (u32::from(self.eph_avail) << 11)
            | (u32::from(self.alm_avail) << 12)
    }

    /// `None` for the reserved health value 3
    pub fn from_bits(bits: u32) -> Option<Self> {
        Some(Self {
            quality: NavSatQualityIndicator::from_u8((bits & 0x07) as u8)?,
            sv_used: bits & (1 << 3) != 0,
            health: NavSatSvHealth::from_u8(((bits >> 4) & 0x03) as u8)?,
            diff_corr: bits & (1 << 6) != 0,
            smoothed: bits & (1 << 7) != 0,
            orbit_source: NavSatOrbitSource::from_u8(((bits >> 8) & 0x07) as u8)?,
            eph_avail: bits & (1 << 11) != 0,
            alm_avail: bits & (1 << 12) != 0,
        })
    }
}

/// One satellite in a NAV-SAT message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavSatSvInfo {
    pub gnss_id: GnssId,
    pub sv_id: u8,
    /// Carrier to noise ratio, dBHz
    pub cno: u8,
    /// Elevation, -90..=90 degrees
    pub elev: i8,
    /// Azimuth, 0..=360 degrees
    pub azim: i16,
    /// Pseudorange residual, 0.1 m
    pub pr_res: i16,
    pub flags: NavSatSvFlags,
}

/// Satellite information
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavSat {
    pub itow: u32,
    pub svs: Vec<NavSatSvInfo>,
}

const NAV_SAT_VERSION: u8 = 1;
const NAV_SAT_HEADER_LEN: usize = 8;
const NAV_SAT_BLOCK_LEN: usize = 12;

impl UbxPacketMeta for NavSat {
    const CLASS: u8 = 0x01;
    const ID: u8 = 0x35;
    const NAME: &'static str = "NAV-SAT";
}

impl UbxPacketCreator for NavSat {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        if self.svs.len() > usize::from(u8::MAX) {
            return Err(ValidationError::TooMany {
                packet: Self::NAME,
                field: "satellites",
                max: usize::from(u8::MAX),
                got: self.svs.len(),
            });
        }
        for sv in &self.svs {
            ValidationError::check_range(Self::NAME, "elev", i64::from(sv.elev), -90, 90)?;
            ValidationError::check_range(Self::NAME, "azim", i64::from(sv.azim), 0, 360)?;
        }
        out.put_u32(self.itow);
        out.put_u8(NAV_SAT_VERSION);
        out.put_u8(self.svs.len() as u8);
        out.extend_from_slice(&[0; 2]);
        for sv in &self.svs {
            out.put_u8(sv.gnss_id.into());
            out.put_u8(sv.sv_id);
            out.put_u8(sv.cno);
            out.put_i8(sv.elev);
            out.put_i16(sv.azim);
            out.put_i16(sv.pr_res);
            out.put_u32(sv.flags.to_bits());
        }
        Ok(())
    }
}

impl UbxPacketParse for NavSat {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < NAV_SAT_HEADER_LEN {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: NAV_SAT_HEADER_LEN,
                got: payload.len(),
            });
        }
        let mut r = PayloadReader::new(payload);
        let itow = r.u32();
        let _version = r.u8();
        let num_svs = usize::from(r.u8());
        let _reserved: [u8; 2] = r.bytes();
        let expect = NAV_SAT_HEADER_LEN + num_svs * NAV_SAT_BLOCK_LEN;
        if payload.len() != expect {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect,
                got: payload.len(),
            });
        }
        let invalid = |field| DecodeError::InvalidField {
            packet: Self::NAME,
            field,
        };
        let mut svs = Vec::with_capacity(num_svs);
        for _ in 0..num_svs {
            let gnss_id = GnssId::from_u8(r.u8()).ok_or_else(|| invalid("gnssId"))?;
            let sv_id = r.u8();
            let cno = r.u8();
            let elev = r.i8();
            let azim = r.i16();
            let pr_res = r.i16();
            let flags = NavSatSvFlags::from_bits(r.u32()).ok_or_else(|| invalid("flags"))?;
            svs.push(NavSatSvInfo {
                gnss_id,
                sv_id,
                cno,
                elev,
                azim,
                pr_res,
                flags,
            });
        }
        Ok(Self { itow, svs })
    }
}

impl fmt::Display for NavSat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.svs.iter().filter(|sv| sv.flags.sv_used).count();
        write!(f, "{} satellites ({} used)", self.svs.len(), used)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sv(gnss_id: GnssId, sv_id: u8) -> NavSatSvInfo {
        NavSatSvInfo {
            gnss_id,
            sv_id,
            cno: 42,
            elev: 35,
            azim: 270,
            pr_res: -12,
            flags: NavSatSvFlags::default(),
        }
    }

    #[test]
    fn nav_sat_blocks() {
        let sat = NavSat {
            itow: 1000,
            svs: vec![sv(GnssId::Gps, 5), sv(GnssId::Glonass, 3)],
        };
        let frame = sat.to_frame().unwrap();
        assert_eq!(frame.len(), 8 + 2 * 12);
        let p = frame.payload();
        assert_eq!(p[4], 1);
        assert_eq!(p[5], 2);
        assert_eq!(p[20], 6);
        assert_eq!(p[21], 3);
        assert_eq!(NavSat::parse(p).unwrap(), sat);
        assert_eq!(sat.to_string(), "2 satellites (2 used)");
    }

    #[test]
    fn sv_flag_bits() {
        let flags = NavSatSvFlags::default();
        assert_eq!(flags.to_bits(), 0x7 | 0x8 | 0x10 | 0x100 | 0x800 | 0x1000);
        assert_eq!(NavSatSvFlags::from_bits(flags.to_bits()), Some(flags));
        assert_eq!(NavSatSvFlags::from_bits(0x30), None);
    }

    #[test]
    fn nav_sat_count_mismatch() {
        let mut payload = NavSat {
            itow: 0,
            svs: vec![sv(GnssId::Gps, 1)],
        }
        .to_frame()
        .unwrap()
        .into_payload();
        payload[5] = 2;
        assert!(matches!(
            NavSat::parse(&payload),
            Err(DecodeError::InvalidPacketLen {
                expect: 32,
                got: 20,
                ..
            })
        ));
    }

    #[test]
    fn nav_sat_elevation_checked() {
        let mut bad = sv(GnssId::Gps, 1);
        bad.elev = 91;
        assert!(NavSat {
            itow: 0,
            svs: vec![bad]
        }
        .to_frame()
        .is_err());
    }
}
