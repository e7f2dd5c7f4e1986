use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};

use super::packets::{NavPvt, NavTimeUtc};
use crate::{
    constants::{GPS_EPOCH_UNIX_MS, GPS_LEAP_SECONDS, GPS_WEEK_MS},
    error::DateTimeError,
    ValidationError,
};

ubx_enum! {
    /// GNSS fix type as carried by NAV-PVT and NAV-STATUS
    pub enum GnssFixType {
        NoFix = 0 => "No Fix",
        DeadReckoningOnly = 1 => "Dead Reckoning",
        Fix2D = 2 => "2D Fix",
        Fix3D = 3 => "3D Fix",
        GpsPlusDeadReckoning = 4 => "GNSS + DR",
        TimeOnlyFix = 5 => "Time Only",
    }
}

impl Default for GnssFixType {
    fn default() -> Self {
        GnssFixType::Fix3D
    }
}

impl GnssFixType {
    /// Fix types that carry a usable position
    pub fn has_position(self) -> bool {
        matches!(
            self,
            GnssFixType::Fix2D | GnssFixType::Fix3D | GnssFixType::GpsPlusDeadReckoning
        )
    }
}

ubx_enum! {
    /// Antenna supervisor state machine status
    pub enum AntennaStatus {
        Init = 0 => "INIT",
        DontKnow = 1 => "DONTKNOW",
        Ok = 2 => "OK",
        Short = 3 => "SHORT",
        Open = 4 => "OPEN",
    }
}

ubx_enum! {
    pub enum AntennaPower {
        Off = 0 => "OFF",
        On = 1 => "ON",
        DontKnow = 2 => "DONTKNOW",
    }
}

ubx_enum! {
    /// Jamming/interference monitor state
    pub enum JammingState {
        /// Unknown or feature disabled
        Unknown = 0 => "UNKNOWN",
        /// No significant jamming
        Ok = 1 => "OK",
        /// Interference visible but fix OK
        Warning = 2 => "WARNING",
        /// Interference visible and no fix
        Critical = 3 => "CRITICAL",
    }
}

/// World position in degrees and meters above mean sea level
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Longitude in degrees
    pub lon: f64,

    /// Latitude in degrees
    pub lat: f64,

    /// Altitude in meters
    pub alt: f64,
}

/// Velocity in the local north/east/down frame, m/s
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NedVelocity {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl NedVelocity {
    /// m/s over the ground
    pub fn ground_speed(&self) -> f64 {
        self.north.hypot(self.east)
    }

    /// Heading of motion in degrees, 0..360
    pub fn heading_degrees(&self) -> f64 {
        let heading = self.east.atan2(self.north).to_degrees();
        if heading < 0.0 {
            heading + 360.0
        } else {
            heading
        }
    }
}

impl From<&NavPvt> for Position {
    fn from(packet: &NavPvt) -> Self {
        Position {
            lon: packet.lon_degrees(),
            lat: packet.lat_degrees(),
            alt: packet.height_msl(),
        }
    }
}

impl From<&NavPvt> for NedVelocity {
    fn from(packet: &NavPvt) -> Self {
        NedVelocity {
            north: f64::from(packet.vel_n) * 1e-3,
            east: f64::from(packet.vel_e) * 1e-3,
            down: f64::from(packet.vel_d) * 1e-3,
        }
    }
}

impl TryFrom<&NavPvt> for DateTime<Utc> {
    type Error = DateTimeError;
    fn try_from(sol: &NavPvt) -> Result<Self, Self::Error> {
        to_datetime(
            sol.year, sol.month, sol.day, sol.hour, sol.min, sol.sec, sol.nano,
        )
    }
}

impl TryFrom<&NavTimeUtc> for DateTime<Utc> {
    type Error = DateTimeError;
    fn try_from(sol: &NavTimeUtc) -> Result<Self, Self::Error> {
        to_datetime(
            sol.year, sol.month, sol.day, sol.hour, sol.min, sol.sec, sol.nano,
        )
    }
}

fn to_datetime(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    min: u8,
    sec: u8,
    nano: i32,
) -> Result<DateTime<Utc>, DateTimeError> {
    let date = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .ok_or(DateTimeError::InvalidDate)?;
    let time = NaiveTime::from_hms_opt(u32::from(hour), u32::from(min), u32::from(sec))
        .ok_or(DateTimeError::InvalidTime)?;
    const NANOS_LIM: u32 = 1_000_000_000;
    if nano.unsigned_abs() >= NANOS_LIM {
        return Err(DateTimeError::InvalidNanoseconds);
    }

    let dt = NaiveDateTime::new(date, time) + TimeDelta::nanoseconds(i64::from(nano));
    Ok(dt.and_utc())
}

/// Calendar fields of a UTC time as they are laid out in NAV-PVT and NAV-TIMEUTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UtcFields {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub nano: i32,
}

impl UtcFields {
    pub(crate) fn from_datetime(
        packet: &'static str,
        time: &DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let year = time.year();
        ValidationError::check_range(packet, "year", i64::from(year), 1999, 2099)?;
        Ok(Self {
            year: year as u16,
            month: time.month() as u8,
            day: time.day() as u8,
            hour: time.hour() as u8,
            min: time.minute() as u8,
            // leap second representation in chrono is nanosecond >= 1e9
            sec: time.second() as u8,
            nano: (time.nanosecond() % 1_000_000_000) as i32,
        })
    }
}

/// Milliseconds since the GPS epoch for a UTC time, leap seconds applied
pub fn gps_time_ms(time: &DateTime<Utc>) -> i64 {
    time.timestamp_millis() - GPS_EPOCH_UNIX_MS + GPS_LEAP_SECONDS * 1000
}

/// GPS time of week in milliseconds
pub fn gps_itow(time: &DateTime<Utc>) -> u32 {
    gps_time_ms(time).rem_euclid(i64::from(GPS_WEEK_MS)) as u32
}

/// GPS week number
pub fn gps_week(time: &DateTime<Utc>) -> i64 {
    gps_time_ms(time).div_euclid(i64::from(GPS_WEEK_MS))
}

/// Scale a physical value into its integer wire representation, rounding to nearest
pub(crate) fn scaled<T: num_traits::NumCast>(
    packet: &'static str,
    field: &'static str,
    value: f64,
    scale: f64,
) -> Result<T, ValidationError> {
    let raw = (value * scale).round();
    if !raw.is_finite() {
        return Err(ValidationError::NotRepresentable {
            packet,
            field,
            value,
        });
    }
    <T as num_traits::NumCast>::from(raw).ok_or(ValidationError::NotRepresentable {
        packet,
        field,
        value,
    })
}
