//! # ubxsim
//!
//! A headless UBX protocol engine that behaves like a u-blox GNSS receiver,
//! for exercising ground-control and autopilot software without hardware.
//!
//! The engine is driven by three inputs: received bytes, the current time, and
//! requests to send something. It produces bytes for the transport and
//! [`EngineEvent`]s describing what happened.
//!
//! Constructing Packets
//! ====================
//!
//! Every message is a plain struct; encoding validates the fields first and
//! never produces a partial frame:
//! ```
//! use ubxsim::{CfgRate, AlignmentToReferenceTime, UbxPacketCreator};
//!
//! let bytes = CfgRate {
//!     measure_rate_ms: 200,
//!     nav_rate: 1,
//!     time_ref: AlignmentToReferenceTime::Utc,
//! }
//! .to_packet_bytes()
//! .unwrap();
//! assert_eq!(&bytes[..6], &[0xb5, 0x62, 0x06, 0x08, 0x06, 0x00]);
//! ```
//!
//! Running the Engine
//! ==================
//!
//! ```
//! use std::time::{Duration, Instant};
//! use ubxsim::{Engine, EngineConfig, EngineEvent};
//!
//! let mut engine: Engine<Vec<u8>, Vec<EngineEvent>> =
//!     Engine::new(EngineConfig::default(), Vec::new()).unwrap();
//! let t0 = Instant::now();
//! engine.connect(Vec::new(), t0);
//! engine.start_handshake(t0).unwrap();
//!
//! // nobody answers: every step times out and the handshake still completes
//! let mut now = t0;
//! for _ in 0..5 {
//!     now += Duration::from_secs(4);
//!     engine.tick(now).unwrap();
//! }
//! assert!(engine.sink().contains(&EngineEvent::HandshakeComplete));
//! ```

pub use crate::{
    ack_tracker::{AckOutcome, AckResolution, AckTracker, DEFAULT_ACK_TIMEOUT},
    config_store::ConfigStore,
    constants::{
        GPS_WEEK_MS, MAX_PAYLOAD_LEN, UBX_CHECKSUM_LEN, UBX_HEADER_LEN, UBX_SYNC_CHAR_1,
        UBX_SYNC_CHAR_2,
    },
    engine::{Engine, EngineConfig, EngineEvent, EventSink, FnSink},
    error::{
        DateTimeError, DecodeError, EngineError, ParserError, SessionError, TransportError,
        ValidationError,
    },
    handshake::{
        HandshakeConfig, HandshakeSession, HandshakeState, HandshakeStep, StepResolution,
        StepState,
    },
    parser::{
        checksum::{compute_checksum, verify_checksum},
        FrameIter, FrameParser, ParserEvent,
    },
    state::{default_satellites, ReceiverIdentity, SimClock, SimulatedReceiverState},
    telemetry::{TelemetryScheduler, MAX_RATE_HZ, MIN_RATE_HZ},
    transport::Transport,
    ubx_packets::*,
};

mod ack_tracker;
mod config_store;
mod constants;
mod engine;
mod error;
mod handshake;
mod parser;
mod state;
mod telemetry;
mod transport;
mod ubx_packets;
