use crate::{ParserError, UbxFrame};

/// UBX [Fletcher-16 checksum](https://en.wikipedia.org/wiki/Fletcher%27s_checksum) calculator supporting both streaming and single-shot use
#[derive(Default, Clone, Copy)]
pub(crate) struct UbxChecksumCalc {
    ck_a: u8,
    ck_b: u8,
}

impl UbxChecksumCalc {
    pub(crate) const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    /// Update checksum with new bytes
    pub(crate) const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    /// Update checksum with a single byte
    pub(crate) const fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    pub(crate) const fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    pub(crate) const fn validate_result(
        self,
        received_ck_a: u8,
        received_ck_b: u8,
    ) -> Result<(), ParserError> {
        if self.is_valid(received_ck_a, received_ck_b) {
            Ok(())
        } else {
            Err(ParserError::InvalidChecksum {
                expect: u16::from_le_bytes([received_ck_a, received_ck_b]),
                got: u16::from_le_bytes([self.ck_a, self.ck_b]),
            })
        }
    }

    const fn is_valid(&self, received_ck_a: u8, received_ck_b: u8) -> bool {
        self.ck_a == received_ck_a && self.ck_b == received_ck_b
    }
}

/// Checksum over `class, msg_id, length (LE), payload`; the sync chars are never covered.
///
/// `length` is taken as given so a caller can checksum a header that disagrees with the payload.
pub const fn compute_checksum(class: u8, msg_id: u8, length: u16, payload: &[u8]) -> (u8, u8) {
    let mut calc = UbxChecksumCalc::new();
    calc.update_byte(class);
    calc.update_byte(msg_id);
    let len = length.to_le_bytes();
    calc.update_byte(len[0]);
    calc.update_byte(len[1]);
    calc.update(payload);
    calc.result()
}

/// Recompute the checksum of `frame` and compare it with the trailer it carries
pub fn verify_checksum(frame: &UbxFrame) -> bool {
    compute_checksum(
        frame.class(),
        frame.msg_id(),
        frame.len(),
        frame.payload(),
    ) == frame.checksum()
}
