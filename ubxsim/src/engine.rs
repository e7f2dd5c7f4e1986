//! The protocol engine for one connection

use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, trace, warn, Level};

use crate::{
    match_packet, message_name, AckAck, AckNak, AckOutcome, AckResolution, AckTracker,
    ConfigStore, EngineError, FrameParser, HandshakeConfig, HandshakeSession, HandshakeState,
    Inf, InfSeverity, KeyId, KeyValuePair, MonHw, MonRf, MonVer, NavPvt, NavSat, NavStatus, NavTimeUtc,
    ParserEvent, ReceiverIdentity, SecUniqId, SessionError, SimClock, SimulatedReceiverState,
    TelemetryScheduler, Transport, TransportError, UbxClass, UbxFrame, UbxPacket,
    UbxPacketCreator, UbxPacketMeta, ValidationError, DEFAULT_ACK_TIMEOUT,
};

/// Everything the engine reports to the application
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Received {
        class: u8,
        msg_id: u8,
        name: &'static str,
        summary: String,
        raw_hex: String,
    },
    Sent {
        class: u8,
        msg_id: u8,
        name: &'static str,
        summary: String,
        raw_hex: String,
        bytes: usize,
    },
    Log {
        level: Level,
        message: String,
    },
    AckResolved(AckResolution),
    HandshakeStep {
        index: usize,
        class: u8,
        msg_id: u8,
        outcome: AckOutcome,
    },
    HandshakeComplete,
    Disconnected,
}

/// Receiver of [`EngineEvent`]s
pub trait EventSink {
    fn emit(&mut self, event: EngineEvent);
}

impl EventSink for Vec<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        self.push(event);
    }
}

/// A dropped receiver just means nobody is listening any more
impl EventSink for mpsc::Sender<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        let _ = self.send(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: EngineEvent) {
        (**self).emit(event);
    }
}

/// Adapts a closure into an [`EventSink`]
pub struct FnSink<F>(pub F);

impl<F: FnMut(EngineEvent)> EventSink for FnSink<F> {
    fn emit(&mut self, event: EngineEvent) {
        (self.0)(event);
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    pub ack_timeout: Duration,
    /// NAV-PVT / NAV-STATUS epochs per second
    pub telemetry_rate_hz: u32,
    /// Start periodic telemetry as soon as the handshake completes
    pub auto_telemetry: bool,
    /// `None` skips the handshake: it completes as soon as it is started
    pub handshake: Option<HandshakeConfig>,
    pub identity: ReceiverIdentity,
    /// Simulated UTC at the moment of connecting
    pub start_time: DateTime<Utc>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            telemetry_rate_hz: 1,
            auto_telemetry: true,
            handshake: Some(HandshakeConfig::default()),
            identity: ReceiverIdentity::default(),
            start_time: default_start_time(),
        }
    }
}

fn default_start_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .unwrap_or_default()
}

/// Simulated receiver speaking UBX on one connection.
///
/// The engine never blocks and never reads the clock itself: bytes come in
/// through [`feed`](Self::feed), time moves through [`tick`](Self::tick), and
/// everything worth showing goes out through the [`EventSink`].
pub struct Engine<T: Transport, S: EventSink> {
    config: EngineConfig,
    transport: Option<T>,
    sink: S,
    parser: FrameParser,
    acks: AckTracker,
    handshake: HandshakeSession,
    telemetry: TelemetryScheduler,
    store: ConfigStore,
    state: SimulatedReceiverState,
    clock: Option<SimClock>,
}

impl<T: Transport, S: EventSink> Engine<T, S> {
    pub fn new(config: EngineConfig, sink: S) -> Result<Self, ValidationError> {
        let handshake = match &config.handshake {
            Some(hs) => hs.session()?,
            None => HandshakeSession::new(Vec::new()),
        };
        let telemetry = TelemetryScheduler::with_rate_hz(config.telemetry_rate_hz)?;
        Ok(Self {
            acks: AckTracker::new(config.ack_timeout),
            config,
            transport: None,
            sink,
            parser: FrameParser::new(),
            handshake,
            telemetry,
            store: ConfigStore::default(),
            state: SimulatedReceiverState::default(),
            clock: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulatedReceiverState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulatedReceiverState {
        &mut self.state
    }

    pub fn set_state(&mut self, state: SimulatedReceiverState) {
        self.state = state;
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake.state()
    }

    pub fn handshake(&self) -> &HandshakeSession {
        &self.handshake
    }

    pub fn acks(&self) -> &AckTracker {
        &self.acks
    }

    pub fn telemetry(&self) -> &TelemetryScheduler {
        &self.telemetry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_connected())
    }

    /// Attach the transport of a fresh connection; simulated time starts at `now`
    pub fn connect(&mut self, transport: T, now: Instant) {
        if self.transport.is_some() {
            self.disconnect();
        }
        self.transport = Some(transport);
        self.clock = Some(SimClock::new(now, self.config.start_time));
        self.log(Level::INFO, "Connected".to_string());
    }

    /// Drop all per-connection state and hand the transport back
    pub fn disconnect(&mut self) -> Option<T> {
        self.handshake.reset();
        for res in self.acks.cancel_all() {
            self.sink.emit(EngineEvent::AckResolved(res));
        }
        self.telemetry.stop();
        self.parser.clear();
        self.clock = None;
        let transport = self.transport.take();
        if transport.is_some() {
            self.log(Level::INFO, "Disconnected".to_string());
            self.sink.emit(EngineEvent::Disconnected);
        }
        transport
    }

    /// Change the telemetry period, e.g. from the user interface
    pub fn set_telemetry_rate(&mut self, rate_hz: u32) -> Result<(), ValidationError> {
        self.telemetry.set_rate_hz(rate_hz)?;
        self.config.telemetry_rate_hz = rate_hz;
        Ok(())
    }

    /// Process received bytes, returning the number of frames extracted.
    ///
    /// Frames are handled in stream order. Replies that fail to go out do not
    /// stop the remaining frames from being handled; the first such error is
    /// returned once all of them were processed.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) -> Result<usize, EngineError> {
        let events: Vec<_> = self.parser.feed(bytes).collect();
        let mut frames = 0;
        let mut first_err = None;
        for event in events {
            match event {
                Ok(ParserEvent::Frame(frame)) => {
                    frames += 1;
                    if let Err(e) = self.dispatch(&frame, now) {
                        first_err.get_or_insert(e);
                    }
                },
                Ok(ParserEvent::Discarded(n)) => {
                    self.log(Level::DEBUG, format!("Discarded {} bytes before sync chars", n));
                },
                Ok(ParserEvent::BufferCleared(n)) => self.log(
                    Level::DEBUG,
                    format!("No UBX sync chars found, buffer cleared ({} bytes)", n),
                ),
                Err(e) => self.log(Level::WARN, e.to_string()),
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(frames),
        }
    }

    /// Advance time: expire ACK waits, move the handshake on and emit due telemetry
    ///
    /// Every expired wait is reported even if one of them fails; the first error is returned.
    pub fn tick(&mut self, now: Instant) -> Result<(), EngineError> {
        let mut first_err = None;
        for res in self.acks.check_timeouts(now) {
            if let Err(e) = self.on_ack_resolution(res, now) {
                first_err.get_or_insert(e);
            }
        }
        if self.telemetry.poll_due(now) {
            let sent = self
                .send_nav_pvt_once(now)
                .and_then(|()| self.send_nav_status_once(now));
            if let Err(e) = sent {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn start_handshake(&mut self, now: Instant) -> Result<(), EngineError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected.into());
        }
        if let Err(e) = self.handshake.start() {
            self.log(Level::WARN, e.to_string());
            return Err(e.into());
        }
        self.emit_log(
            Level::INFO,
            format!(
                "Starting configuration handshake ({} steps)",
                self.handshake.steps().len()
            ),
        );
        if self.handshake.is_complete() {
            self.on_handshake_complete(now);
            return Ok(());
        }
        self.send_next_step(now)
    }

    /// Enable periodic NAV-PVT / NAV-STATUS; only allowed once the handshake completed
    pub fn start_periodic(&mut self, now: Instant) -> Result<(), SessionError> {
        if !self.handshake.is_complete() {
            let e = SessionError::NotInitialized;
            self.log(Level::WARN, e.to_string());
            return Err(e);
        }
        self.telemetry.set_enabled(true);
        self.telemetry.start(now);
        self.log(
            Level::INFO,
            format!(
                "Started periodic sending every {} ms",
                self.telemetry.period().as_millis()
            ),
        );
        Ok(())
    }

    pub fn stop_periodic(&mut self) {
        if self.telemetry.is_running() {
            self.telemetry.stop();
            self.log(Level::INFO, "Stopped periodic sending".to_string());
        }
    }

    /// Encode and write any message
    pub fn send<P: UbxPacketCreator>(&mut self, packet: &P) -> Result<(), EngineError> {
        let frame = match packet.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.log(Level::ERROR, e.to_string());
                return Err(e.into());
            },
        };
        self.write_frame(&frame)?;
        Ok(())
    }

    /// Send a configuration message and wait for its acknowledgement
    pub fn send_cfg<P: UbxPacketCreator>(
        &mut self,
        packet: &P,
        now: Instant,
    ) -> Result<Instant, EngineError> {
        self.send(packet)?;
        Ok(self.register_ack(P::CLASS, P::ID, now))
    }

    pub fn send_nav_pvt_once(&mut self, now: Instant) -> Result<(), EngineError> {
        let utc = self.clock(now).utc(now);
        let pvt = self.state.nav_pvt(&utc);
        self.send_built(pvt)
    }

    pub fn send_nav_status_once(&mut self, now: Instant) -> Result<(), EngineError> {
        let clock = self.clock(now);
        let status = self.state.nav_status(&clock.utc(now), clock.uptime(now));
        self.send(&status)
    }

    pub fn send_nav_sat(&mut self, now: Instant) -> Result<(), EngineError> {
        let sat = self.state.nav_sat(&self.clock(now).utc(now));
        self.send(&sat)
    }

    pub fn send_nav_time_utc(&mut self, now: Instant) -> Result<(), EngineError> {
        let utc = self.clock(now).utc(now);
        let time = self.state.nav_time_utc(&utc);
        self.send_built(time)
    }

    pub fn send_mon_ver(&mut self) -> Result<(), EngineError> {
        let ver: MonVer = self.config.identity.version.clone();
        self.send(&ver)
    }

    pub fn send_mon_hw(&mut self) -> Result<(), EngineError> {
        let hw: MonHw = self.state.hardware;
        self.send(&hw)
    }

    pub fn send_mon_rf(&mut self) -> Result<(), EngineError> {
        let rf: MonRf = self.state.rf.clone();
        self.emit_log(
            Level::DEBUG,
            format!(
                "Preparing MON-RF message with {} blocks ({} bytes total)",
                rf.blocks.len(),
                rf.wire_len()
            ),
        );
        self.send(&rf)
    }

    pub fn send_sec_uniq_id(&mut self) -> Result<(), EngineError> {
        let id: SecUniqId = self.config.identity.unique_id.clone();
        self.send(&id)
    }

    pub fn send_inf(&mut self, severity: InfSeverity, text: &str) -> Result<(), EngineError> {
        let frame = match Inf::new(severity, text).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.log(Level::ERROR, e.to_string());
                return Err(e.into());
            },
        };
        self.write_frame(&frame)?;
        Ok(())
    }

    fn send_built<P: UbxPacketCreator>(
        &mut self,
        packet: Result<P, ValidationError>,
    ) -> Result<(), EngineError> {
        match packet {
            Ok(packet) => self.send(&packet),
            Err(e) => {
                self.log(Level::ERROR, e.to_string());
                Err(e.into())
            },
        }
    }

    fn clock(&self, now: Instant) -> SimClock {
        self.clock
            .unwrap_or_else(|| SimClock::new(now, self.config.start_time))
    }

    fn write_frame(&mut self, frame: &UbxFrame) -> Result<(), TransportError> {
        let bytes = frame.to_bytes();
        let result = match self.transport.as_mut() {
            Some(t) if t.is_connected() => t.write(&bytes).map_err(TransportError::from).and_then(
                |written| {
                    if written != bytes.len() {
                        return Err(TransportError::PartialWrite {
                            written,
                            total: bytes.len(),
                        });
                    }
                    t.flush().map_err(TransportError::from)
                },
            ),
            _ => Err(TransportError::NotConnected),
        };
        let name = message_name(frame.class(), frame.msg_id()).unwrap_or("UNKNOWN");
        if let Err(e) = result {
            self.log(Level::ERROR, format!("Failed to send {}: {}", name, e));
            return Err(e);
        }
        let summary = summarize(frame);
        info!("Sent {}: {}", name, summary);
        self.sink.emit(EngineEvent::Sent {
            class: frame.class(),
            msg_id: frame.msg_id(),
            name,
            summary,
            raw_hex: frame.raw_hex(),
            bytes: bytes.len(),
        });
        Ok(())
    }

    fn send_next_step(&mut self, now: Instant) -> Result<(), EngineError> {
        let Some((_, step)) = self.handshake.step_to_send() else {
            return Ok(());
        };
        let frame = step.frame().clone();
        if let Err(e) = self.write_frame(&frame) {
            self.handshake.reset();
            for res in self.acks.cancel_all() {
                self.sink.emit(EngineEvent::AckResolved(res));
            }
            return Err(e.into());
        }
        let deadline = self.register_ack(frame.class(), frame.msg_id(), now);
        self.handshake.step_sent(deadline);
        Ok(())
    }

    fn register_ack(&mut self, class: u8, msg_id: u8, now: Instant) -> Instant {
        if self.acks.is_pending(class, msg_id) {
            self.emit_log(
                Level::DEBUG,
                format!(
                    "Replacing pending ACK wait for Class=0x{:02X} ID=0x{:02X}",
                    class, msg_id
                ),
            );
        }
        self.acks.register(class, msg_id, now)
    }

    fn emit_unsolicited(&mut self, name: &str, class: u8, msg_id: u8) {
        self.emit_log(
            Level::DEBUG,
            format!(
                "Unsolicited {} for Class=0x{:02X} ID=0x{:02X}",
                name, class, msg_id
            ),
        );
    }

    fn on_ack_resolution(&mut self, res: AckResolution, now: Instant) -> Result<(), EngineError> {
        self.sink.emit(EngineEvent::AckResolved(res));
        match res.outcome {
            AckOutcome::Acked => self.emit_log(
                Level::INFO,
                format!(
                    "Received ACK for Class=0x{:02X} ID=0x{:02X}",
                    res.class, res.msg_id
                ),
            ),
            AckOutcome::Nacked => self.emit_log(
                Level::WARN,
                format!(
                    "Received NACK for Class=0x{:02X} ID=0x{:02X}",
                    res.class, res.msg_id
                ),
            ),
            AckOutcome::TimedOut => self.emit_log(
                Level::WARN,
                format!(
                    "ACK timeout for Class=0x{:02X} ID=0x{:02X}",
                    res.class, res.msg_id
                ),
            ),
            AckOutcome::Cancelled => {},
        }

        let Some(step) = self.handshake.resolve(res.class, res.msg_id, res.outcome) else {
            return Ok(());
        };
        self.sink.emit(EngineEvent::HandshakeStep {
            index: step.index,
            class: res.class,
            msg_id: res.msg_id,
            outcome: step.outcome,
        });
        match step.outcome {
            AckOutcome::Nacked => self.emit_log(
                Level::WARN,
                "Configuration rejected - configuration may be incomplete".to_string(),
            ),
            AckOutcome::TimedOut => self.emit_log(
                Level::WARN,
                "Configuration timeout - proceeding without ACK".to_string(),
            ),
            _ => {},
        }
        if step.completed {
            self.on_handshake_complete(now);
            Ok(())
        } else {
            self.send_next_step(now)
        }
    }

    fn on_handshake_complete(&mut self, now: Instant) {
        self.emit_log(Level::INFO, "Configuration complete".to_string());
        self.sink.emit(EngineEvent::HandshakeComplete);
        if self.config.auto_telemetry {
            self.telemetry.set_enabled(true);
            self.telemetry.start(now);
        }
    }

    fn dispatch(&mut self, frame: &UbxFrame, now: Instant) -> Result<(), EngineError> {
        let (class, msg_id) = (frame.class(), frame.msg_id());
        let packet = match match_packet(class, msg_id, frame.payload()) {
            Ok(packet) => packet,
            Err(e) => {
                self.log(Level::WARN, e.to_string());
                // a set message we know but could not accept
                if class == u8::from(UbxClass::Cfg) && message_name(class, msg_id).is_some() {
                    self.reply_nak(class, msg_id)?;
                }
                return Ok(());
            },
        };

        let name = packet.name();
        let summary = packet.to_string();
        info!("Received {}: {}", name, summary);
        self.sink.emit(EngineEvent::Received {
            class,
            msg_id,
            name,
            summary,
            raw_hex: frame.raw_hex(),
        });

        match (self.acks.on_frame(frame), &packet) {
            (Some(res), _) => self.on_ack_resolution(res, now)?,
            (None, UbxPacket::AckAck(ack)) => {
                self.emit_unsolicited(AckAck::NAME, ack.class, ack.msg_id)
            },
            (None, UbxPacket::AckNak(nak)) => {
                self.emit_unsolicited(AckNak::NAME, nak.class, nak.msg_id)
            },
            (None, _) => {},
        }
        self.handle_packet(packet, now)
    }

    fn handle_packet(&mut self, packet: UbxPacket, now: Instant) -> Result<(), EngineError> {
        let (class, msg_id) = packet.class_id();
        match packet {
            UbxPacket::CfgRate(rate) => {
                self.telemetry.set_period(rate.solution_period());
                self.store.apply(&rate_pairs(
                    u64::from(rate.measure_rate_ms),
                    u64::from(rate.nav_rate),
                )?);
                self.log(
                    Level::INFO,
                    format!(
                        "Navigation rate set to {} ms",
                        rate.solution_period().as_millis()
                    ),
                );
                self.reply_ack(class, msg_id)
            },
            UbxPacket::CfgMsg(msg) => {
                let name = message_name(msg.msg_class, msg.msg_id).unwrap_or("UNKNOWN");
                self.log(
                    Level::INFO,
                    format!("Message rate for {}: {}", name, msg),
                );
                self.reply_ack(class, msg_id)
            },
            UbxPacket::CfgPrt(_)
            | UbxPacket::CfgAnt(_)
            | UbxPacket::CfgNav5(_)
            | UbxPacket::CfgItfm(_) => self.reply_ack(class, msg_id),
            UbxPacket::CfgValSet(set) => {
                self.store.apply(&set.values);
                if set
                    .values
                    .iter()
                    .any(|kv| kv.key() == KeyId::RATE_MEAS || kv.key() == KeyId::RATE_NAV)
                {
                    self.apply_stored_rate();
                }
                for kv in set.values.iter().filter(|kv| {
                    kv.key() == KeyId::MSGOUT_UBX_NAV_PVT_UART1
                        || kv.key() == KeyId::MSGOUT_UBX_NAV_STATUS_UART1
                }) {
                    self.log(Level::INFO, format!("Message output {}", kv));
                }
                self.reply_ack(class, msg_id)
            },
            UbxPacket::CfgValGetRequest(request) => match self.store.lookup(&request) {
                Some(response) => {
                    self.send(&response)?;
                    self.reply_ack(class, msg_id)
                },
                None => {
                    let unknown = request.keys.iter().find(|k| self.store.get(**k).is_none());
                    if let Some(key) = unknown {
                        self.emit_log(Level::WARN, format!("CFG-VALGET for unknown key {}", key));
                    }
                    self.reply_nak(class, msg_id)
                },
            },
            UbxPacket::Poll { class, msg_id } => self.answer_poll(class, msg_id, now),
            UbxPacket::Inf(inf) => {
                let level = match inf.severity {
                    InfSeverity::Error => Level::ERROR,
                    InfSeverity::Warning => Level::WARN,
                    InfSeverity::Notice => Level::INFO,
                    InfSeverity::Test | InfSeverity::Debug => Level::DEBUG,
                };
                self.log(level, inf.to_string());
                Ok(())
            },
            UbxPacket::AckAck(_)
            | UbxPacket::AckNak(_)
            | UbxPacket::CfgValGetResponse(_)
            | UbxPacket::NavPvt(_)
            | UbxPacket::NavStatus(_)
            | UbxPacket::NavSat(_)
            | UbxPacket::NavTimeUtc(_)
            | UbxPacket::MonVer(_)
            | UbxPacket::MonHw(_)
            | UbxPacket::MonRf(_)
            | UbxPacket::SecUniqId(_) => Ok(()),
        }
    }

    fn answer_poll(&mut self, class: u8, msg_id: u8, now: Instant) -> Result<(), EngineError> {
        match (class, msg_id) {
            (NavPvt::CLASS, NavPvt::ID) => self.send_nav_pvt_once(now),
            (NavStatus::CLASS, NavStatus::ID) => self.send_nav_status_once(now),
            (NavSat::CLASS, NavSat::ID) => self.send_nav_sat(now),
            (NavTimeUtc::CLASS, NavTimeUtc::ID) => self.send_nav_time_utc(now),
            (MonVer::CLASS, MonVer::ID) => self.send_mon_ver(),
            (SecUniqId::CLASS, SecUniqId::ID) => self.send_sec_uniq_id(),
            _ => {
                let name = message_name(class, msg_id).unwrap_or("UNKNOWN");
                self.log(Level::DEBUG, format!("Ignoring poll for {}", name));
                Ok(())
            },
        }
    }

    fn apply_stored_rate(&mut self) {
        let meas = self.store.get_u64(KeyId::RATE_MEAS).unwrap_or(1000);
        let nav = self.store.get_u64(KeyId::RATE_NAV).unwrap_or(1);
        let period = Duration::from_millis(meas.saturating_mul(nav));
        self.telemetry.set_period(period);
        self.log(
            Level::INFO,
            format!("Navigation rate set to {} ms", period.as_millis()),
        );
    }

    fn reply_ack(&mut self, class: u8, msg_id: u8) -> Result<(), EngineError> {
        self.send(&AckAck { class, msg_id })?;
        self.log(
            Level::DEBUG,
            format!("Sent ACK for Class=0x{:02X} ID=0x{:02X}", class, msg_id),
        );
        Ok(())
    }

    fn reply_nak(&mut self, class: u8, msg_id: u8) -> Result<(), EngineError> {
        self.send(&AckNak { class, msg_id })?;
        self.log(
            Level::DEBUG,
            format!("Sent NACK for Class=0x{:02X} ID=0x{:02X}", class, msg_id),
        );
        Ok(())
    }

    /// `tracing` plus a [`EngineEvent::Log`]
    fn log(&mut self, level: Level, message: String) {
        if level == Level::ERROR {
            error!("{}", message);
        } else if level == Level::WARN {
            warn!("{}", message);
        } else if level == Level::INFO {
            info!("{}", message);
        } else if level == Level::DEBUG {
            debug!("{}", message);
        } else {
            trace!("{}", message);
        }
        self.emit_log(level, message);
    }

    /// Only the event, for diagnostics the owning component already traced
    fn emit_log(&mut self, level: Level, message: String) {
        self.sink.emit(EngineEvent::Log { level, message });
    }
}

fn rate_pairs(meas_ms: u64, nav: u64) -> Result<Vec<KeyValuePair>, ValidationError> {
    Ok(vec![
        KeyValuePair::from_u64(KeyId::RATE_MEAS, meas_ms)?,
        KeyValuePair::from_u64(KeyId::RATE_NAV, nav)?,
    ])
}

fn summarize(frame: &UbxFrame) -> String {
    match match_packet(frame.class(), frame.msg_id(), frame.payload()) {
        Ok(packet) => packet.to_string(),
        Err(e) => e.to_string(),
    }
}
