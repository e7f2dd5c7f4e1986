//! Telemetry inputs of the simulated receiver and the packets built from them

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    ubx_packets::{gps_itow, scaled, UtcFields},
    GnssFixType, GnssId, MonHw, MonRf, MonVer, NavPvt, NavPvtFlags, NavPvtValidFlags, NavSat,
    NavSatSvFlags, NavSatSvInfo, NavStatus, NavStatusFlags, NavTimeUtc, NavTimeUtcFlags,
    NedVelocity, Position, SecUniqId, UbxPacketMeta, UtcStandard, ValidationError,
};

/// What the receiver reports about itself when asked
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReceiverIdentity {
    pub version: MonVer,
    pub unique_id: SecUniqId,
}

/// Values the application feeds into the telemetry messages.
///
/// The engine never changes them; the running time of week and uptime come
/// from the [`SimClock`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulatedReceiverState {
    pub position: Position,
    /// Height of the ellipsoid above mean sea level, m
    pub geoid_separation: f64,
    pub velocity: NedVelocity,
    pub fix_type: GnssFixType,
    pub num_sv: u8,
    pub ttff: Duration,
    pub pdop: f64,
    /// m
    pub horizontal_accuracy: f64,
    /// m
    pub vertical_accuracy: f64,
    /// m/s
    pub speed_accuracy: f64,
    /// degrees
    pub heading_accuracy: f64,
    /// ns
    pub time_accuracy: u32,
    pub satellites: Vec<NavSatSvInfo>,
    pub hardware: MonHw,
    pub rf: MonRf,
}

impl Default for SimulatedReceiverState {
    fn default() -> Self {
        Self {
            position: Position {
                lon: 37.617_300_0,
                lat: 55.755_800_0,
                alt: 156.0,
            },
            geoid_separation: 0.0,
            velocity: NedVelocity::default(),
            fix_type: GnssFixType::Fix3D,
            num_sv: 12,
            ttff: Duration::from_millis(28_500),
            pdop: 1.2,
            horizontal_accuracy: 1.5,
            vertical_accuracy: 2.5,
            speed_accuracy: 0.1,
            heading_accuracy: 1.0,
            time_accuracy: 20,
            satellites: default_satellites(12),
            hardware: MonHw::default(),
            rf: MonRf::default(),
        }
    }
}

/// A spread of GPS satellites around the sky, all used in the fix
pub fn default_satellites(count: u8) -> Vec<NavSatSvInfo> {
    (0..count)
        .map(|i| NavSatSvInfo {
            gnss_id: GnssId::Gps,
            sv_id: i + 1,
            cno: 30 + ((u16::from(i) * 7) % 20) as u8,
            elev: (10 + (i16::from(i) * 13) % 75) as i8,
            azim: (i16::from(i) * 47) % 360,
            pr_res: 0,
            flags: NavSatSvFlags::default(),
        })
        .collect()
}

/// Maps the engine's monotonic clock onto simulated UTC
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    origin: Instant,
    start: DateTime<Utc>,
}

impl SimClock {
    pub fn new(origin: Instant, start: DateTime<Utc>) -> Self {
        Self { origin, start }
    }

    pub fn uptime(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.origin)
    }

    pub fn utc(&self, now: Instant) -> DateTime<Utc> {
        TimeDelta::from_std(self.uptime(now))
            .ok()
            .and_then(|elapsed| self.start.checked_add_signed(elapsed))
            .unwrap_or(self.start)
    }
}

impl SimulatedReceiverState {
    pub fn nav_pvt(&self, utc: &DateTime<Utc>) -> Result<NavPvt, ValidationError> {
        const P: &str = NavPvt::NAME;
        let fields = UtcFields::from_datetime(P, utc)?;
        let flags = if self.fix_type.has_position() {
            NavPvtFlags::GPS_FIX_OK
        } else {
            NavPvtFlags::empty()
        };
        let height_msl: i32 = scaled(P, "hMSL", self.position.alt, 1e3)?;
        let separation: i32 = scaled(P, "height", self.geoid_separation, 1e3)?;
        Ok(NavPvt {
            itow: gps_itow(utc),
            year: fields.year,
            month: fields.month,
            day: fields.day,
            hour: fields.hour,
            min: fields.min,
            sec: fields.sec,
            valid: NavPvtValidFlags::VALID_DATE
                | NavPvtValidFlags::VALID_TIME
                | NavPvtValidFlags::FULLY_RESOLVED,
            time_accuracy: self.time_accuracy,
            nano: fields.nano,
            fix_type: self.fix_type,
            flags,
            flags2: 0,
            num_satellites: self.num_sv,
            lon: scaled(P, "lon", self.position.lon, 1e7)?,
            lat: scaled(P, "lat", self.position.lat, 1e7)?,
            height_meters: height_msl.saturating_add(separation),
            height_msl,
            horiz_accuracy: scaled(P, "hAcc", self.horizontal_accuracy, 1e3)?,
            vert_accuracy: scaled(P, "vAcc", self.vertical_accuracy, 1e3)?,
            vel_n: scaled(P, "velN", self.velocity.north, 1e3)?,
            vel_e: scaled(P, "velE", self.velocity.east, 1e3)?,
            vel_d: scaled(P, "velD", self.velocity.down, 1e3)?,
            ground_speed: scaled(P, "gSpeed", self.velocity.ground_speed(), 1e3)?,
            heading_motion: scaled(P, "headMot", self.velocity.heading_degrees(), 1e5)?,
            speed_accuracy: scaled(P, "sAcc", self.speed_accuracy, 1e3)?,
            heading_accuracy: scaled(P, "headAcc", self.heading_accuracy, 1e5)?,
            pdop: scaled(P, "pDOP", self.pdop, 1e2)?,
            flags3: 0,
            heading_vehicle: 0,
            magnetic_declination: 0,
            magnetic_declination_accuracy: 0,
        })
    }

    pub fn nav_status(&self, utc: &DateTime<Utc>, uptime: Duration) -> NavStatus {
        let mut flags = NavStatusFlags::WKN_SET | NavStatusFlags::TOW_SET;
        let mut time_to_first_fix = 0;
        if self.fix_type.has_position() {
            flags |= NavStatusFlags::GPS_FIX_OK;
            time_to_first_fix = u32::try_from(self.ttff.as_millis()).unwrap_or(u32::MAX);
        }
        NavStatus {
            itow: gps_itow(utc),
            fix_type: self.fix_type,
            flags,
            fix_stat: 0,
            flags2: 0,
            time_to_first_fix,
            uptime_ms: u32::try_from(uptime.as_millis()).unwrap_or(u32::MAX),
        }
    }

    pub fn nav_sat(&self, utc: &DateTime<Utc>) -> NavSat {
        NavSat {
            itow: gps_itow(utc),
            svs: self.satellites.clone(),
        }
    }

    pub fn nav_time_utc(&self, utc: &DateTime<Utc>) -> Result<NavTimeUtc, ValidationError> {
        let fields = UtcFields::from_datetime(NavTimeUtc::NAME, utc)?;
        Ok(NavTimeUtc {
            itow: gps_itow(utc),
            time_accuracy: self.time_accuracy,
            nano: fields.nano,
            year: fields.year,
            month: fields.month,
            day: fields.day,
            hour: fields.hour,
            min: fields.min,
            sec: fields.sec,
            valid: NavTimeUtcFlags::VALID_TOW
                | NavTimeUtcFlags::VALID_WKN
                | NavTimeUtcFlags::VALID_UTC,
            utc_standard: UtcStandard::Usno,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn utc() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_milli_opt(12, 30, 15, 250)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn pvt_from_state() {
        let state = SimulatedReceiverState {
            velocity: NedVelocity {
                north: 3.0,
                east: 4.0,
                down: -0.5,
            },
            ..SimulatedReceiverState::default()
        };
        let pvt = state.nav_pvt(&utc()).unwrap();
        assert_eq!(pvt.lat, 557_558_000);
        assert_eq!(pvt.lon, 376_173_000);
        assert_eq!(pvt.height_msl, 156_000);
        assert_eq!(pvt.ground_speed, 5000);
        assert_eq!(pvt.vel_d, -500);
        assert_eq!(pvt.pdop, 120);
        assert_eq!((pvt.hour, pvt.min, pvt.sec), (12, 30, 15));
        assert_eq!(pvt.nano, 250_000_000);
        assert!(pvt.flags.contains(NavPvtFlags::GPS_FIX_OK));
        assert_eq!(DateTime::<Utc>::try_from(&pvt).unwrap(), utc());
    }

    #[test]
    fn status_without_fix() {
        let state = SimulatedReceiverState {
            fix_type: GnssFixType::NoFix,
            ..SimulatedReceiverState::default()
        };
        let status = state.nav_status(&utc(), Duration::from_secs(3));
        assert_eq!(status.time_to_first_fix, 0);
        assert_eq!(status.uptime_ms, 3000);
        assert!(!status.flags.contains(NavStatusFlags::GPS_FIX_OK));
    }

    #[test]
    fn out_of_range_state_rejected() {
        let state = SimulatedReceiverState {
            pdop: 1000.0,
            ..SimulatedReceiverState::default()
        };
        assert!(matches!(
            state.nav_pvt(&utc()),
            Err(ValidationError::NotRepresentable { field: "pDOP", .. })
        ));
    }

    #[test]
    fn clock_advances() {
        let origin = Instant::now();
        let clock = SimClock::new(origin, utc());
        let later = origin + Duration::from_millis(1500);
        assert_eq!(clock.uptime(later), Duration::from_millis(1500));
        assert_eq!(
            clock.utc(later),
            utc() + TimeDelta::milliseconds(1500)
        );
        assert_eq!(
            gps_itow(&clock.utc(later)) - gps_itow(&utc()),
            1500
        );
    }

    #[test]
    fn satellites_stay_in_range() {
        let sat = NavSat {
            itow: 0,
            svs: default_satellites(40),
        };
        assert!(crate::UbxPacketCreator::to_frame(&sat).is_ok());
    }
}
