#[macro_use]
extern crate afl;

use ubxsim::{match_packet, FrameParser, ParserEvent};

const ACK_ACK: [u8; 10] = [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x04, 0x05, 0x11, 0x38];

fn parse(chunksize: usize, data: &[u8]) {
    let mut parser = FrameParser::new();
    let mut whole = Vec::new();
    for chunk in data.chunks(chunksize) {
        for event in parser.feed(chunk) {
            if let Ok(ParserEvent::Frame(frame)) = event {
                // decode errors are fine, panics are not
                let _ = match_packet(frame.class(), frame.msg_id(), frame.payload());
                whole.push(frame);
            }
        }
    }

    // chunking must not change what comes out
    let mut single = FrameParser::new();
    let frames: Vec<_> = single
        .feed(data)
        .filter_map(|event| match event {
            Ok(ParserEvent::Frame(frame)) => Some(frame),
            _ => None,
        })
        .collect();
    assert_eq!(frames, whole);

    // a valid frame after arbitrary garbage is still found; the tail of the
    // garbage may itself complete into more frames first
    let num_acks = parser
        .feed(&ACK_ACK)
        .filter(|event| {
            matches!(event, Ok(ParserEvent::Frame(f)) if f.class() == 0x05 && f.msg_id() == 0x01)
        })
        .count();
    let pending = parser.buffered_len();
    assert!(num_acks >= 1 || pending > 0);
}

fn main() {
    fuzz!(|data: &[u8]| {
        if data.len() > 1 {
            let chunksize = usize::from(data[0]);
            if chunksize != 0 {
                parse(chunksize, &data[1..]);
            }
        }
    });
}
