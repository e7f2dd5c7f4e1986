use criterion::{criterion_group, criterion_main, Criterion};
use std::{
    hint::black_box,
    time::{Duration, Instant},
};
use ubxsim::*;

/// A stream as the simulator would emit it: telemetry epochs interleaved with MON and NAV-SAT
fn recorded_stream(epochs: u32) -> Vec<u8> {
    let config = EngineConfig {
        handshake: None,
        ..EngineConfig::default()
    };
    let mut engine: Engine<Vec<u8>, Vec<EngineEvent>> =
        Engine::new(config, Vec::new()).unwrap();
    let t0 = Instant::now();
    engine.connect(Vec::new(), t0);
    engine.start_handshake(t0).unwrap();
    for i in 0..epochs {
        let now = t0 + Duration::from_secs(u64::from(i));
        engine.tick(now).unwrap();
        if i % 10 == 0 {
            engine.send_nav_sat(now).unwrap();
            engine.send_mon_rf().unwrap();
        }
    }
    engine.disconnect().unwrap()
}

fn parse_all(mut parser: FrameParser, data: &[u8], chunk_size: usize) -> usize {
    let mut count = 0;
    for chunk in data.chunks(chunk_size) {
        for event in parser.feed(chunk) {
            match event {
                Ok(ParserEvent::Frame(frame)) => {
                    black_box(match_packet(frame.class(), frame.msg_id(), frame.payload()).ok());
                    count += 1;
                },
                Ok(_) => {},
                Err(e) => panic!("No errors allowed! got: {:?}", e),
            }
        }
    }
    count
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let data = recorded_stream(1000);
    // two telemetry messages per epoch plus NAV-SAT and MON-RF every tenth
    let expected = 2 * 1000 + 2 * 100;
    for chunk in &[99, 100, 101, 256, 512, 1000, 1024] {
        c.bench_function(&format!("vec_parse_sim_{}", chunk), |b| {
            b.iter(|| {
                let parser = FrameParser::default();
                assert_eq!(parse_all(parser, &data, *chunk), expected);
            })
        });
    }

    let state = SimulatedReceiverState::default();
    let utc = EngineConfig::default().start_time;
    c.bench_function("encode_nav_pvt", |b| {
        b.iter(|| {
            let pvt = state.nav_pvt(black_box(&utc)).unwrap();
            black_box(pvt.to_packet_bytes().unwrap())
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
