pub(crate) mod checksum;

use tracing::{debug, trace};

use crate::{
    constants::{
        UBX_CHECKSUM_LEN, UBX_CLASS_OFFSET, UBX_HEADER_LEN, UBX_LENGTH_OFFSET, UBX_MSG_ID_OFFSET,
        UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2, UBX_SYNC_SIZE,
    },
    error::ParserError,
    parser::checksum::UbxChecksumCalc,
    UbxFrame, MAX_PAYLOAD_LEN,
};

/// What the parser did with the bytes it looked at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserEvent {
    /// A complete, checksum-valid frame
    Frame(UbxFrame),
    /// Bytes dropped in front of a sync marker
    Discarded(usize),
    /// No sync marker anywhere; the buffer was emptied of this many bytes
    BufferCleared(usize),
}

/// Streaming UBX framer.
///
/// Bytes are appended to an internal buffer; frames are taken off the front as
/// soon as they are complete. The buffer is only compacted when new data is fed,
/// so frames come out in the order they were reassembled regardless of how the
/// stream was chunked.
///
/// ```
/// use ubxsim::{FrameParser, ParserEvent};
///
/// let mut parser = FrameParser::default();
/// let ack = [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38];
/// let mut it = parser.feed(&ack);
/// match it.next() {
///     Some(Ok(ParserEvent::Frame(frame))) => assert_eq!(frame.class(), 0x05),
///     _ => panic!("expected a frame"),
/// }
/// assert!(it.next().is_none());
/// ```
#[derive(Debug, Default)]
pub struct FrameParser {
    buf: Vec<u8>,
    cursor: usize,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `new_data` and iterate over everything that can be extracted.
    ///
    /// Dropping the iterator early is fine: whatever was not yet visited stays
    /// buffered for the next call.
    pub fn feed<'a>(&'a mut self, new_data: &[u8]) -> FrameIter<'a> {
        self.compact();
        self.buf.extend_from_slice(new_data);
        FrameIter { parser: self }
    }

    pub fn buffered_len(&self) -> usize {
        self.buf.len() - self.cursor
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buffered_len() == 0
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    fn compact(&mut self) {
        if self.cursor > 0 {
            self.buf.drain(..self.cursor);
            self.cursor = 0;
        }
    }

    fn extract(&mut self) -> Option<Result<ParserEvent, ParserError>> {
        let data = &self.buf[self.cursor..];
        if data.is_empty() {
            return None;
        }

        match find_sync(data) {
            None => {
                // A lone trailing first sync char may be completed by the next read
                let keep = usize::from(data.last() == Some(&UBX_SYNC_CHAR_1));
                let cleared = data.len() - keep;
                if cleared == 0 {
                    return None;
                }
                debug!("No UBX sync chars found, clearing buffer ({} bytes)", cleared);
                self.cursor += cleared;
                return Some(Ok(ParserEvent::BufferCleared(cleared)));
            },
            Some(pos) if pos > 0 => {
                debug!("Discarding {} bytes before sync chars", pos);
                self.cursor += pos;
                return Some(Ok(ParserEvent::Discarded(pos)));
            },
            Some(_) => {},
        }

        if data.len() < UBX_HEADER_LEN {
            trace!("Waiting for more data (header incomplete)");
            return None;
        }

        let pack_len = u16::from_le_bytes([data[UBX_LENGTH_OFFSET], data[UBX_LENGTH_OFFSET + 1]]);
        if pack_len > MAX_PAYLOAD_LEN {
            self.cursor += UBX_SYNC_SIZE;
            return Some(Err(ParserError::PayloadTooLarge {
                declared: usize::from(pack_len),
                max: usize::from(MAX_PAYLOAD_LEN),
            }));
        }

        let pack_len = usize::from(pack_len);
        let frame_len = UBX_HEADER_LEN + pack_len + UBX_CHECKSUM_LEN;
        if data.len() < frame_len {
            trace!(
                "Waiting for more data. Need: {} Have: {}",
                frame_len,
                data.len()
            );
            return None;
        }

        let mut calc = UbxChecksumCalc::new();
        calc.update(&data[UBX_CLASS_OFFSET..UBX_HEADER_LEN + pack_len]);
        let (ck_a, ck_b) = (data[frame_len - 2], data[frame_len - 1]);
        if let Err(e) = calc.validate_result(ck_a, ck_b) {
            // The length field itself may be what got corrupted, so only the
            // sync chars are dropped and the scan restarts right after them.
            self.cursor += UBX_SYNC_SIZE;
            return Some(Err(e));
        }

        let frame = UbxFrame::from_parts(
            data[UBX_CLASS_OFFSET],
            data[UBX_MSG_ID_OFFSET],
            data[UBX_HEADER_LEN..UBX_HEADER_LEN + pack_len].to_vec(),
            (ck_a, ck_b),
        );
        self.cursor += frame_len;
        Some(Ok(ParserEvent::Frame(frame)))
    }
}

fn find_sync(data: &[u8]) -> Option<usize> {
    data.windows(2)
        .position(|w| w[0] == UBX_SYNC_CHAR_1 && w[1] == UBX_SYNC_CHAR_2)
}

/// Iterator over the events produced by one [`FrameParser::feed`] call
pub struct FrameIter<'a> {
    parser: &'a mut FrameParser,
}

impl Iterator for FrameIter<'_> {
    type Item = Result<ParserEvent, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.extract()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ACK_ACK: [u8; 10] = [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38];

    fn frames(events: Vec<Result<ParserEvent, ParserError>>) -> Vec<UbxFrame> {
        events
            .into_iter()
            .filter_map(|e| match e {
                Ok(ParserEvent::Frame(f)) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parse_single_frame() {
        let mut parser = FrameParser::new();
        let events: Vec<_> = parser.feed(&ACK_ACK).collect();
        assert_eq!(events.len(), 1);
        let frames = frames(events);
        assert_eq!(frames[0].class(), 0x05);
        assert_eq!(frames[0].msg_id(), 0x01);
        assert_eq!(frames[0].payload(), &[0x06, 0x01]);
        assert!(parser.is_buffer_empty());
    }

    #[test]
    fn header_incomplete_waits() {
        let mut parser = FrameParser::new();
        assert!(parser.feed(&ACK_ACK[..5]).next().is_none());
        assert_eq!(parser.buffered_len(), 5);
        assert!(parser.feed(&ACK_ACK[5..9]).next().is_none());
        assert_eq!(parser.buffered_len(), 9);
        let events: Vec<_> = parser.feed(&ACK_ACK[9..]).collect();
        assert_eq!(frames(events).len(), 1);
    }

    #[test]
    fn garbage_without_sync_is_cleared() {
        let mut parser = FrameParser::new();
        let events: Vec<_> = parser.feed(&[1, 2, 3, 4]).collect();
        assert_eq!(events, vec![Ok(ParserEvent::BufferCleared(4))]);
        assert!(parser.is_buffer_empty());
    }

    #[test]
    fn trailing_sync_char_is_kept() {
        let mut parser = FrameParser::new();
        let events: Vec<_> = parser.feed(&[1, 2, 0xb5]).collect();
        assert_eq!(events, vec![Ok(ParserEvent::BufferCleared(2))]);
        assert_eq!(parser.buffered_len(), 1);
        let events: Vec<_> = parser.feed(&ACK_ACK[1..]).collect();
        assert_eq!(frames(events).len(), 1);
    }

    #[test]
    fn garbage_before_frame_reported() {
        let mut data = vec![0x00, 0xb5, 0x11, 0x62, 0xff];
        data.extend_from_slice(&ACK_ACK);
        let mut parser = FrameParser::new();
        let events: Vec<_> = parser.feed(&data).collect();
        assert_eq!(events[0], Ok(ParserEvent::Discarded(5)));
        assert_eq!(frames(events).len(), 1);
    }

    #[test]
    fn bad_checksum_drops_only_sync() {
        let mut data = ACK_ACK.to_vec();
        data[9] ^= 0xff;
        data.extend_from_slice(&ACK_ACK);
        let mut parser = FrameParser::new();
        let events: Vec<_> = parser.feed(&data).collect();
        assert!(matches!(
            events[0],
            Err(ParserError::InvalidChecksum { .. })
        ));
        // rest of the corrupt frame is discarded as garbage in front of the next sync
        assert_eq!(events[1], Ok(ParserEvent::Discarded(8)));
        assert_eq!(frames(events).len(), 1);
    }

    #[test]
    fn oversize_length_resyncs() {
        let mut data = vec![0xb5, 0x62, 0x06, 0x8a, 0xff, 0xff];
        data.extend_from_slice(&ACK_ACK);
        let mut parser = FrameParser::new();
        let events: Vec<_> = parser.feed(&data).collect();
        assert_eq!(
            events[0],
            Err(ParserError::PayloadTooLarge {
                declared: 0xffff,
                max: usize::from(MAX_PAYLOAD_LEN)
            })
        );
        assert_eq!(frames(events).len(), 1);
    }

    #[test]
    fn unfinished_iteration_keeps_frames() {
        let mut data = ACK_ACK.to_vec();
        data.extend_from_slice(&ACK_ACK);
        let mut parser = FrameParser::new();
        {
            let mut it = parser.feed(&data);
            assert!(matches!(it.next(), Some(Ok(ParserEvent::Frame(_)))));
        }
        let events: Vec<_> = parser.feed(&[]).collect();
        assert_eq!(frames(events).len(), 1);
        assert!(parser.is_buffer_empty());
    }
}
