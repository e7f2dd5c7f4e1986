pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub(crate) const UBX_SYNC_SIZE: usize = 2;
pub(crate) const UBX_PAYLOAD_SIZE_LEN: usize = 2;
pub(crate) const UBX_CLASS_LEN: usize = 1;
pub(crate) const UBX_ID_LEN: usize = 1;
pub const UBX_HEADER_LEN: usize =
    UBX_SYNC_SIZE + UBX_PAYLOAD_SIZE_LEN + UBX_CLASS_LEN + UBX_ID_LEN;
pub const UBX_CHECKSUM_LEN: usize = 2;

pub(crate) const UBX_CLASS_OFFSET: usize = 2; // After SYNC_CHAR_1, SYNC_CHAR_2
pub(crate) const UBX_MSG_ID_OFFSET: usize = 3; // After CLASS
pub(crate) const UBX_LENGTH_OFFSET: usize = 4; // After MSG_ID

/// Largest payload the framer accepts; a bigger declared length is treated as a corrupt header
pub const MAX_PAYLOAD_LEN: u16 = 8192;

/// Milliseconds in one GPS week, the range of every iTOW field
pub const GPS_WEEK_MS: u32 = 604_800_000;
/// Unix timestamp of the GPS epoch, 1980-01-06T00:00:00Z
pub(crate) const GPS_EPOCH_UNIX_MS: i64 = 315_964_800_000;
/// GPS-UTC offset in effect since 2017
pub(crate) const GPS_LEAP_SECONDS: i64 = 18;
