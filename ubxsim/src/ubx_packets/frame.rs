use std::fmt::Write as _;

use crate::{
    constants::{UBX_CHECKSUM_LEN, UBX_HEADER_LEN, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2},
    parser::checksum::compute_checksum,
    ValidationError, MAX_PAYLOAD_LEN,
};

/// One complete UBX frame.
///
/// The length is always the payload length and the checksum always belongs to
/// the other fields: frames are either built by [`UbxFrame::new`], which computes
/// the trailer, or by the parser after it verified the received one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbxFrame {
    class: u8,
    msg_id: u8,
    payload: Vec<u8>,
    checksum: (u8, u8),
}

impl UbxFrame {
    pub fn new(class: u8, msg_id: u8, payload: Vec<u8>) -> Result<Self, ValidationError> {
        if payload.len() > usize::from(MAX_PAYLOAD_LEN) {
            return Err(ValidationError::PayloadTooLarge {
                packet: "UBX frame",
                len: payload.len(),
                max: usize::from(MAX_PAYLOAD_LEN),
            });
        }
        let checksum = compute_checksum(class, msg_id, payload.len() as u16, &payload);
        Ok(Self {
            class,
            msg_id,
            payload,
            checksum,
        })
    }

    /// Zero-length frame, the UBX way of asking for the current value of a message
    pub fn poll(class: u8, msg_id: u8) -> Self {
        Self {
            class,
            msg_id,
            payload: Vec::new(),
            checksum: compute_checksum(class, msg_id, 0, &[]),
        }
    }

    pub(crate) fn from_parts(class: u8, msg_id: u8, payload: Vec<u8>, checksum: (u8, u8)) -> Self {
        Self {
            class,
            msg_id,
            payload,
            checksum,
        }
    }

    pub fn class(&self) -> u8 {
        self.class
    }

    pub fn msg_id(&self) -> u8 {
        self.msg_id
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u16 {
        self.payload.len() as u16
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn checksum(&self) -> (u8, u8) {
        self.checksum
    }

    pub fn wire_len(&self) -> usize {
        UBX_HEADER_LEN + self.payload.len() + UBX_CHECKSUM_LEN
    }

    /// Wire bytes: sync chars, header, payload and checksum trailer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        out.push(UBX_SYNC_CHAR_1);
        out.push(UBX_SYNC_CHAR_2);
        out.push(self.class);
        out.push(self.msg_id);
        out.extend_from_slice(&self.len().to_le_bytes());
        out.extend_from_slice(&self.payload);
        out.push(self.checksum.0);
        out.push(self.checksum.1);
        out
    }

    /// Space separated upper-case hex of the wire bytes, as shown in the communication log
    pub fn raw_hex(&self) -> String {
        hex_string(&self.to_bytes())
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02X}", b);
    }
    out
}
