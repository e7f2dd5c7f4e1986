use std::{
    io::{self, Read},
    net::{SocketAddr, TcpListener, TcpStream},
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use chrono::prelude::*;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ubxsim::*;

/// Simulated u-blox receiver speaking UBX over TCP
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Address of the ground station to connect to
    #[arg(value_name = "ADDR", required_unless_present = "listen")]
    address: Option<SocketAddr>,

    /// Wait for incoming connections on this address instead of connecting
    #[arg(short, long, value_name = "ADDR", conflicts_with = "address")]
    listen: Option<SocketAddr>,

    /// NAV-PVT / NAV-STATUS epochs per second
    #[arg(short, long, default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(i64::from(MIN_RATE_HZ)..=i64::from(MAX_RATE_HZ)))]
    rate: u32,

    /// Latitude, degrees
    #[arg(long, default_value_t = 55.7558, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude, degrees
    #[arg(long, default_value_t = 37.6173, allow_negative_numbers = true)]
    lon: f64,

    /// Height above mean sea level, m
    #[arg(long, default_value_t = 156.0, allow_negative_numbers = true)]
    alt: f64,

    /// Velocity north, east, down in m/s
    #[arg(long, num_args = 3, value_names = ["N", "E", "D"], allow_negative_numbers = true)]
    velocity: Option<Vec<f64>>,

    /// Fix type: 0 no fix, 1 dead reckoning, 2 2D, 3 3D, 4 GNSS + DR, 5 time only
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=5))]
    fix: u8,

    /// Number of satellites used in the solution
    #[arg(long, default_value_t = 12)]
    sats: u8,

    /// How long to wait for ACK-ACK / ACK-NAK, ms
    #[arg(long, default_value_t = 3000)]
    ack_timeout: u64,

    /// Skip the configuration handshake and start telemetry right away
    #[arg(long)]
    no_handshake: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            ack_timeout: Duration::from_millis(self.ack_timeout),
            telemetry_rate_hz: self.rate,
            handshake: (!self.no_handshake).then(HandshakeConfig::default),
            start_time: Utc::now(),
            ..EngineConfig::default()
        }
    }

    fn receiver_state(&self) -> Result<SimulatedReceiverState> {
        let fix_type =
            GnssFixType::from_u8(self.fix).ok_or_else(|| anyhow!("invalid fix type {}", self.fix))?;
        let velocity = match self.velocity.as_deref() {
            Some(&[north, east, down]) => NedVelocity { north, east, down },
            Some(other) => return Err(anyhow!("expected 3 velocity components, got {}", other.len())),
            None => NedVelocity::default(),
        };
        Ok(SimulatedReceiverState {
            position: Position {
                lon: self.lon,
                lat: self.lat,
                alt: self.alt,
            },
            velocity,
            fix_type,
            num_sv: self.sats,
            satellites: default_satellites(self.sats),
            ..SimulatedReceiverState::default()
        })
    }
}

type SimEngine = Engine<TcpStream, FnSink<fn(EngineEvent)>>;

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut engine: SimEngine = Engine::new(cli.engine_config(), FnSink(print_event as fn(EngineEvent)))
        .context("Invalid engine configuration")?;
    engine.set_state(cli.receiver_state()?);

    match (cli.listen, cli.address) {
        (Some(addr), _) => {
            let listener =
                TcpListener::bind(addr).with_context(|| format!("Could not listen on {}", addr))?;
            info!("Waiting for connections on {}", addr);
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        if let Err(e) = serve(&mut engine, stream) {
                            warn!("Connection ended: {:#}", e);
                        }
                    },
                    Err(e) => warn!("Accept failed: {}", e),
                }
            }
            Ok(())
        },
        (None, Some(addr)) => {
            let stream =
                TcpStream::connect(addr).with_context(|| format!("Could not connect to {}", addr))?;
            serve(&mut engine, stream)
        },
        (None, None) => Err(anyhow!("either an address or --listen is required")),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ubxsim=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Run one connection until the peer closes it
fn serve(engine: &mut SimEngine, stream: TcpStream) -> Result<()> {
    let peer = stream.peer_addr().context("Socket has no peer")?;
    stream.set_nodelay(true).context("Could not disable Nagle")?;
    stream
        .set_read_timeout(Some(Duration::from_millis(10)))
        .context("Could not set read timeout")?;
    let mut reader = stream.try_clone().context("Could not clone socket")?;

    info!("Connected to {}", peer);
    engine.connect(stream, Instant::now());
    let result = run(engine, &mut reader);
    engine.disconnect();
    result
}

fn run(engine: &mut SimEngine, reader: &mut TcpStream) -> Result<()> {
    engine
        .start_handshake(Instant::now())
        .context("Could not start configuration")?;

    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                if let Err(e) = engine.feed(&buf[..n], Instant::now()) {
                    warn!("{}", e);
                }
            },
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {},
            Err(e) => return Err(e).context("Read failed"),
        }
        engine.tick(Instant::now()).context("Could not send telemetry")?;
    }
}

fn print_event(event: EngineEvent) {
    let ts = Local::now().format("%H:%M:%S%.3f");
    match event {
        EngineEvent::Received {
            name,
            summary,
            raw_hex,
            ..
        } => {
            println!("[{}] <- {}: {}", ts, name, summary);
            println!("           {}", raw_hex);
        },
        EngineEvent::Sent {
            name,
            summary,
            bytes,
            ..
        } => println!("[{}] -> {} ({} bytes): {}", ts, name, bytes, summary),
        EngineEvent::HandshakeStep {
            index,
            class,
            msg_id,
            outcome,
        } => println!(
            "[{}] configuration step {} (Class=0x{:02X} ID=0x{:02X}): {:?}",
            ts,
            index + 1,
            class,
            msg_id,
            outcome
        ),
        EngineEvent::HandshakeComplete => println!("[{}] configuration complete", ts),
        EngineEvent::Disconnected => println!("[{}] disconnected", ts),
        EngineEvent::AckResolved(_) | EngineEvent::Log { .. } => {},
    }
}
