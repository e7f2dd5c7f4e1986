//! Little-endian payload helpers shared by the message codecs

use crate::{DecodeError, ValidationError};

/// Sequential reader over a payload whose length has already been checked
pub(crate) struct PayloadReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    pub(crate) fn u8(&mut self) -> u8 {
        self.array::<1>()[0]
    }

    pub(crate) fn i8(&mut self) -> i8 {
        i8::from_le_bytes(self.array())
    }

    pub(crate) fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.array())
    }

    pub(crate) fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.array())
    }

    pub(crate) fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }

    pub(crate) fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.array())
    }

    pub(crate) fn bytes<const N: usize>(&mut self) -> [u8; N] {
        self.array()
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }
}

pub(crate) trait PayloadWriter {
    fn put_u8(&mut self, v: u8);
    fn put_i8(&mut self, v: i8);
    fn put_u16(&mut self, v: u16);
    fn put_i16(&mut self, v: i16);
    fn put_u32(&mut self, v: u32);
    fn put_i32(&mut self, v: i32);
}

impl PayloadWriter for Vec<u8> {
    fn put_u8(&mut self, v: u8) {
        self.push(v);
    }

    fn put_i8(&mut self, v: i8) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u16(&mut self, v: u16) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i16(&mut self, v: i16) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i32(&mut self, v: i32) {
        self.extend_from_slice(&v.to_le_bytes());
    }
}

pub(crate) fn expect_len(packet: &'static str, payload: &[u8], expect: usize) -> Result<(), DecodeError> {
    if payload.len() == expect {
        Ok(())
    } else {
        Err(DecodeError::InvalidPacketLen {
            packet,
            expect,
            got: payload.len(),
        })
    }
}

/// Write `text` into a fixed, zero padded field that must keep at least one terminating NUL
pub(crate) fn put_fixed_str(
    out: &mut Vec<u8>,
    packet: &'static str,
    field: &'static str,
    text: &str,
    width: usize,
) -> Result<(), ValidationError> {
    check_ascii(packet, field, text)?;
    if text.len() >= width {
        return Err(ValidationError::StringTooLong {
            packet,
            field,
            max: width - 1,
            got: text.len(),
        });
    }
    out.extend_from_slice(text.as_bytes());
    out.resize(out.len() + width - text.len(), 0);
    Ok(())
}

/// Read a NUL terminated string out of a fixed width field
pub(crate) fn get_fixed_str(
    packet: &'static str,
    field: &'static str,
    raw: &[u8],
) -> Result<String, DecodeError> {
    let end = raw
        .iter()
        .position(|b| *b == 0)
        .ok_or(DecodeError::InvalidField { packet, field })?;
    if raw[end..].iter().any(|b| *b != 0) {
        return Err(DecodeError::InvalidField { packet, field });
    }
    let text = &raw[..end];
    if !text.iter().all(|b| is_printable_ascii(*b)) {
        return Err(DecodeError::InvalidField { packet, field });
    }
    Ok(text.iter().map(|b| char::from(*b)).collect())
}

pub(crate) fn check_ascii(
    packet: &'static str,
    field: &'static str,
    text: &str,
) -> Result<(), ValidationError> {
    if text.bytes().all(is_printable_ascii) {
        Ok(())
    } else {
        Err(ValidationError::NonAscii { packet, field })
    }
}

pub(crate) fn is_printable_ascii(b: u8) -> bool {
    (0x20..0x7f).contains(&b)
}
