use core::fmt;

use bitflags::bitflags;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

bitflags! {
    /// Which CFG-NAV5 parameters are applied
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CfgNav5Params: u16 {
        const DYN = 0x0001;
        const MIN_EL = 0x0002;
        const POS_FIX_MODE = 0x0004;
        const DR_LIM = 0x0008;
        const POS_MASK_APPLY = 0x0010;
        const TIME_MASK = 0x0020;
        const STATIC_HOLD_MASK = 0x0040;
        const DGPS_MASK = 0x0080;
        const CNO_THRESHOLD = 0x0100;
        const UTC = 0x0400;
    }
}

ubx_enum! {
    /// Dynamic platform model
    pub enum NavDynamicModel {
        Portable = 0 => "Portable",
        Stationary = 2 => "Stationary",
        Pedestrian = 3 => "Pedestrian",
        Automotive = 4 => "Automotive",
        Sea = 5 => "Sea",
        AirborneWithLess1gAcceleration = 6 => "Airborne <1g",
        AirborneWithLess2gAcceleration = 7 => "Airborne <2g",
        AirborneWith4gAcceleration = 8 => "Airborne <4g",
        WristWornWatch = 9 => "Wrist",
        Bike = 10 => "Bike",
    }
}

ubx_enum! {
    /// Position fixing mode
    pub enum NavFixMode {
        Only2D = 1 => "2D only",
        Only3D = 2 => "3D only",
        Auto2D3D = 3 => "Auto 2D/3D",
    }
}

ubx_enum! {
    /// UTC standard used for time reporting
    pub enum UtcStandard {
        Automatic = 0 => "Automatic",
        Crl = 1 => "CRL",
        Nist = 2 => "NIST",
        Usno = 3 => "USNO",
        Bipm = 4 => "BIPM",
        European = 5 => "European",
        Soviet = 6 => "SU",
        Ntsc = 7 => "NTSC",
        Unknown = 15 => "Unknown",
    }
}

/// Navigation engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgNav5 {
    pub mask: CfgNav5Params,
    pub dyn_model: NavDynamicModel,
    pub fix_mode: NavFixMode,
    /// Fixed altitude for 2D fix mode, 0.01 m
    pub fixed_alt: i32,
    /// Fixed altitude variance for 2D mode, 0.0001 m^2
    pub fixed_alt_var: u32,
    /// Minimum elevation for a GNSS satellite to be used, degrees
    pub min_elev_degrees: i8,
    /// Reserved in firmware, s
    pub dr_limit: u8,
    /// Position DOP mask, 0.1
    pub pdop: u16,
    /// Time DOP mask, 0.1
    pub tdop: u16,
    /// Position accuracy mask, m
    pub pacc: u16,
    /// Time accuracy mask, m
    pub tacc: u16,
    /// Static hold threshold, cm/s
    pub static_hold_thresh: u8,
    /// DGNSS timeout, s
    pub dgnss_timeout: u8,
    /// Number of satellites required above `cno_thresh`
    pub cno_thresh_num_svs: u8,
    /// C/N0 threshold, dBHz
    pub cno_thresh: u8,
    /// Static hold distance threshold, m
    pub static_hold_max_dist: u16,
    pub utc_standard: UtcStandard,
}

const CFG_NAV5_LEN: usize = 36;

impl Default for CfgNav5 {
    fn default() -> Self {
        Self {
            mask: CfgNav5Params::DYN
                | CfgNav5Params::MIN_EL
                | CfgNav5Params::POS_FIX_MODE
                | CfgNav5Params::POS_MASK_APPLY
                | CfgNav5Params::TIME_MASK,
            dyn_model: NavDynamicModel::Portable,
            fix_mode: NavFixMode::Auto2D3D,
            fixed_alt: 0,
            fixed_alt_var: 10_000,
            min_elev_degrees: 5,
            dr_limit: 0,
            pdop: 250,
            tdop: 250,
            pacc: 100,
            tacc: 300,
            static_hold_thresh: 0,
            dgnss_timeout: 60,
            cno_thresh_num_svs: 0,
            cno_thresh: 0,
            static_hold_max_dist: 0,
            utc_standard: UtcStandard::Automatic,
        }
    }
}

impl UbxPacketMeta for CfgNav5 {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x24;
    const NAME: &'static str = "CFG-NAV5";
}

impl UbxPacketCreator for CfgNav5 {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        ValidationError::check_range(
            Self::NAME,
            "minElev",
            i64::from(self.min_elev_degrees),
            -90,
            90,
        )?;
        out.put_u16(self.mask.bits());
        out.put_u8(self.dyn_model.into());
        out.put_u8(self.fix_mode.into());
        out.put_i32(self.fixed_alt);
        out.put_u32(self.fixed_alt_var);
        out.put_i8(self.min_elev_degrees);
        out.put_u8(self.dr_limit);
        out.put_u16(self.pdop);
        out.put_u16(self.tdop);
        out.put_u16(self.pacc);
        out.put_u16(self.tacc);
        out.put_u8(self.static_hold_thresh);
        out.put_u8(self.dgnss_timeout);
        out.put_u8(self.cno_thresh_num_svs);
        out.put_u8(self.cno_thresh);
        out.extend_from_slice(&[0; 2]);
        out.put_u16(self.static_hold_max_dist);
        out.put_u8(self.utc_standard.into());
        out.extend_from_slice(&[0; 5]);
        Ok(())
    }
}

impl UbxPacketParse for CfgNav5 {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, CFG_NAV5_LEN)?;
        let invalid = |field| DecodeError::InvalidField {
            packet: Self::NAME,
            field,
        };
        let mut r = PayloadReader::new(payload);
        let mask = CfgNav5Params::from_bits_retain(r.u16());
        let dyn_model = NavDynamicModel::from_u8(r.u8()).ok_or_else(|| invalid("dynModel"))?;
        let fix_mode = NavFixMode::from_u8(r.u8()).ok_or_else(|| invalid("fixMode"))?;
        let fixed_alt = r.i32();
        let fixed_alt_var = r.u32();
        let min_elev_degrees = r.i8();
        let dr_limit = r.u8();
        let pdop = r.u16();
        let tdop = r.u16();
        let pacc = r.u16();
        let tacc = r.u16();
        let static_hold_thresh = r.u8();
        let dgnss_timeout = r.u8();
        let cno_thresh_num_svs = r.u8();
        let cno_thresh = r.u8();
        let _reserved1: [u8; 2] = r.bytes();
        let static_hold_max_dist = r.u16();
        let utc_standard = UtcStandard::from_u8(r.u8()).ok_or_else(|| invalid("utcStandard"))?;
        Ok(Self {
            mask,
            dyn_model,
            fix_mode,
            fixed_alt,
            fixed_alt_var,
            min_elev_degrees,
            dr_limit,
            pdop,
            tdop,
            pacc,
            tacc,
            static_hold_thresh,
            dgnss_timeout,
            cno_thresh_num_svs,
            cno_thresh,
            static_hold_max_dist,
            utc_standard,
        })
    }
}

impl fmt::Display for CfgNav5 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DynModel={} FixMode={} MinElev={} PDOP={:.1} PAcc={}m TAcc={}m",
            self.dyn_model,
            self.fix_mode,
            self.min_elev_degrees,
            f64::from(self.pdop) * 0.1,
            self.pacc,
            self.tacc
        )
    }
}
