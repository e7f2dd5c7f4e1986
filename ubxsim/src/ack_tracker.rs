//! Correlation of ACK-ACK / ACK-NAK frames with outstanding requests

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{AckAck, AckNak, UbxFrame, UbxPacketMeta, UbxPacketParse};

/// How long a configuration message waits for its acknowledgement
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AckOutcome {
    Acked,
    Nacked,
    TimedOut,
    /// The wait was dropped by a disconnect
    Cancelled,
}

/// Final state of one pending wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckResolution {
    pub class: u8,
    pub msg_id: u8,
    pub outcome: AckOutcome,
}

#[derive(Debug, Clone, Copy)]
struct PendingAck {
    deadline: Instant,
}

/// Outstanding acknowledgement waits, at most one per `(class, id)`.
///
/// Every wait is removed from the table as it resolves, so a wait resolves
/// exactly once whatever arrives afterwards.
#[derive(Debug)]
pub struct AckTracker {
    pending: HashMap<(u8, u8), PendingAck>,
    timeout: Duration,
}

impl Default for AckTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ACK_TIMEOUT)
    }
}

impl AckTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start waiting for `(class, msg_id)` and return the deadline.
    ///
    /// A wait already registered for the same pair is replaced.
    pub fn register(&mut self, class: u8, msg_id: u8, now: Instant) -> Instant {
        let deadline = now + self.timeout;
        if self
            .pending
            .insert((class, msg_id), PendingAck { deadline })
            .is_some()
        {
            debug!(
                "Replacing pending ACK wait for Class=0x{:02X} ID=0x{:02X}",
                class, msg_id
            );
        }
        deadline
    }

    /// Resolve the wait an ACK-ACK / ACK-NAK frame answers.
    ///
    /// Frames of other classes and unsolicited acknowledgements give `None`.
    pub fn on_frame(&mut self, frame: &UbxFrame) -> Option<AckResolution> {
        if frame.class() != AckAck::CLASS {
            return None;
        }
        let (class, msg_id, outcome) = match frame.msg_id() {
            AckAck::ID => {
                let ack = AckAck::parse(frame.payload()).ok()?;
                (ack.class, ack.msg_id, AckOutcome::Acked)
            },
            AckNak::ID => {
                let nak = AckNak::parse(frame.payload()).ok()?;
                (nak.class, nak.msg_id, AckOutcome::Nacked)
            },
            _ => return None,
        };
        if self.pending.remove(&(class, msg_id)).is_none() {
            debug!(
                "Unsolicited {} for Class=0x{:02X} ID=0x{:02X}",
                if outcome == AckOutcome::Acked {
                    AckAck::NAME
                } else {
                    AckNak::NAME
                },
                class,
                msg_id
            );
            return None;
        }
        if outcome == AckOutcome::Nacked {
            warn!(
                "Received NACK for Class=0x{:02X} ID=0x{:02X}",
                class, msg_id
            );
        }
        Some(AckResolution {
            class,
            msg_id,
            outcome,
        })
    }

    /// Expire every wait whose deadline is not after `now`, in `(class, id)` order
    pub fn check_timeouts(&mut self, now: Instant) -> Vec<AckResolution> {
        let mut expired: Vec<(u8, u8)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| *k)
            .collect();
        expired.sort_unstable();
        expired
            .into_iter()
            .map(|(class, msg_id)| {
                self.pending.remove(&(class, msg_id));
                warn!(
                    "ACK timeout for Class=0x{:02X} ID=0x{:02X}",
                    class, msg_id
                );
                AckResolution {
                    class,
                    msg_id,
                    outcome: AckOutcome::TimedOut,
                }
            })
            .collect()
    }

    /// Drop every wait, reporting each as cancelled
    pub fn cancel_all(&mut self) -> Vec<AckResolution> {
        let mut cancelled: Vec<AckResolution> = self
            .pending
            .drain()
            .map(|((class, msg_id), _)| AckResolution {
                class,
                msg_id,
                outcome: AckOutcome::Cancelled,
            })
            .collect();
        cancelled.sort_unstable_by_key(|r| (r.class, r.msg_id));
        cancelled
    }

    pub fn is_pending(&self, class: u8, msg_id: u8) -> bool {
        self.pending.contains_key(&(class, msg_id))
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Earliest deadline still outstanding
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }
}
