//! Ordered startup configuration exchange

use std::time::Instant;

use tracing::{info, warn};

use crate::{
    AckOutcome, CfgMsg, CfgNav5, CfgPrt, CfgRate, NavPvt, NavStatus, SessionError, UbxFrame,
    UbxPacketCreator, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Waiting,
    Acked,
    Nacked,
    TimedOut,
}

/// One configuration message of the handshake, already encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeStep {
    frame: UbxFrame,
    name: &'static str,
    state: StepState,
    deadline: Option<Instant>,
}

impl HandshakeStep {
    pub fn new<P: UbxPacketCreator>(packet: &P) -> Result<Self, ValidationError> {
        Ok(Self {
            frame: packet.to_frame()?,
            name: P::NAME,
            state: StepState::Pending,
            deadline: None,
        })
    }

    pub fn class(&self) -> u8 {
        self.frame.class()
    }

    pub fn msg_id(&self) -> u8 {
        self.frame.msg_id()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn frame(&self) -> &UbxFrame {
        &self.frame
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Idle,
    SendingStep(usize),
    AwaitingAck(usize),
    Complete,
}

/// Result of an acknowledgement applied to the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResolution {
    pub index: usize,
    pub outcome: AckOutcome,
    /// Set on the one resolution that finished the handshake
    pub completed: bool,
}

/// Drives the steps one at a time: `Idle -> SendingStep(i) -> AwaitingAck(i)`,
/// then on to the next step or `Complete`.
///
/// An ACK, a NAK and a timeout all move the session forward, so a receiver
/// that rejects or ignores a step never stalls telemetry.
#[derive(Debug, Clone)]
pub struct HandshakeSession {
    steps: Vec<HandshakeStep>,
    state: HandshakeState,
}

impl HandshakeSession {
    pub fn new(steps: Vec<HandshakeStep>) -> Self {
        Self {
            steps,
            state: HandshakeState::Idle,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn steps(&self) -> &[HandshakeStep] {
        &self.steps
    }

    pub fn is_complete(&self) -> bool {
        self.state == HandshakeState::Complete
    }

    pub fn start(&mut self) -> Result<HandshakeState, SessionError> {
        if self.state != HandshakeState::Idle {
            return Err(SessionError::AlreadyInProgress);
        }
        self.state = if self.steps.is_empty() {
            HandshakeState::Complete
        } else {
            HandshakeState::SendingStep(0)
        };
        info!("Starting configuration handshake ({} steps)", self.steps.len());
        Ok(self.state)
    }

    /// The step that has to go out next, if the session is in `SendingStep`
    pub fn step_to_send(&self) -> Option<(usize, &HandshakeStep)> {
        match self.state {
            HandshakeState::SendingStep(i) => self.steps.get(i).map(|s| (i, s)),
            _ => None,
        }
    }

    /// Mark the current step as written, waiting for its answer until `deadline`
    pub fn step_sent(&mut self, deadline: Instant) {
        if let HandshakeState::SendingStep(i) = self.state {
            if let Some(step) = self.steps.get_mut(i) {
                step.state = StepState::Waiting;
                step.deadline = Some(deadline);
                self.state = HandshakeState::AwaitingAck(i);
            }
        }
    }

    /// Apply an acknowledgement outcome for `(class, msg_id)`.
    ///
    /// Only the step currently awaiting its answer is affected; anything else,
    /// including a cancelled wait, gives `None`.
    pub fn resolve(
        &mut self,
        class: u8,
        msg_id: u8,
        outcome: AckOutcome,
    ) -> Option<StepResolution> {
        let HandshakeState::AwaitingAck(index) = self.state else {
            return None;
        };
        let step = self.steps.get_mut(index)?;
        if step.class() != class || step.msg_id() != msg_id {
            return None;
        }
        step.state = match outcome {
            AckOutcome::Acked => StepState::Acked,
            AckOutcome::Nacked => {
                warn!(
                    "{} rejected - configuration may be incomplete",
                    step.name
                );
                StepState::Nacked
            },
            AckOutcome::TimedOut => {
                warn!(
                    "{}: Configuration timeout - proceeding without ACK",
                    step.name
                );
                StepState::TimedOut
            },
            AckOutcome::Cancelled => return None,
        };
        step.deadline = None;

        let next = index + 1;
        let completed = next >= self.steps.len();
        self.state = if completed {
            info!("Configuration handshake complete");
            HandshakeState::Complete
        } else {
            HandshakeState::SendingStep(next)
        };
        Some(StepResolution {
            index,
            outcome,
            completed,
        })
    }

    /// Back to `Idle` with every step pending again
    pub fn reset(&mut self) {
        self.state = HandshakeState::Idle;
        for step in &mut self.steps {
            step.state = StepState::Pending;
            step.deadline = None;
        }
    }
}

/// Messages sent during the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandshakeConfig {
    pub port: CfgPrt,
    pub rate: CfgRate,
    pub nav5: CfgNav5,
    /// Output rate, in navigation solutions, of NAV-PVT and NAV-STATUS
    pub nav_output_rate: u8,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            port: CfgPrt::default(),
            rate: CfgRate::default(),
            nav5: CfgNav5::default(),
            nav_output_rate: 1,
        }
    }
}

impl HandshakeConfig {
    /// Encode port, rate, navigation engine, then message rate steps
    pub fn steps(&self) -> Result<Vec<HandshakeStep>, ValidationError> {
        Ok(vec![
            HandshakeStep::new(&self.port)?,
            HandshakeStep::new(&self.rate)?,
            HandshakeStep::new(&self.nav5)?,
            HandshakeStep::new(&CfgMsg::for_packet::<NavPvt>(self.nav_output_rate))?,
            HandshakeStep::new(&CfgMsg::for_packet::<NavStatus>(self.nav_output_rate))?,
        ])
    }

    pub fn session(&self) -> Result<HandshakeSession, ValidationError> {
        Ok(HandshakeSession::new(self.steps()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CfgAnt, CfgItfm};
    use std::time::Duration;

    fn three_steps() -> HandshakeSession {
        HandshakeSession::new(vec![
            HandshakeStep::new(&CfgRate::default()).unwrap(),
            HandshakeStep::new(&CfgAnt::default()).unwrap(),
            HandshakeStep::new(&CfgItfm::default()).unwrap(),
        ])
    }

    #[test]
    fn walks_through_every_outcome() {
        let now = Instant::now();
        let mut session = three_steps();
        assert_eq!(session.state(), HandshakeState::Idle);
        assert_eq!(session.start(), Ok(HandshakeState::SendingStep(0)));

        let mut completions = 0;
        for outcome in [AckOutcome::Acked, AckOutcome::TimedOut, AckOutcome::Nacked] {
            let (index, step) = session.step_to_send().unwrap();
            let (class, id) = (step.class(), step.msg_id());
            session.step_sent(now + Duration::from_secs(1));
            assert_eq!(session.state(), HandshakeState::AwaitingAck(index));
            let res = session.resolve(class, id, outcome).unwrap();
            assert_eq!(res.index, index);
            completions += usize::from(res.completed);
        }
        assert_eq!(completions, 1);
        assert!(session.is_complete());
        let states: Vec<_> = session.steps().iter().map(|s| s.state()).collect();
        assert_eq!(
            states,
            [StepState::Acked, StepState::TimedOut, StepState::Nacked]
        );
    }

    #[test]
    fn second_start_rejected() {
        let mut session = three_steps();
        session.start().unwrap();
        assert_eq!(session.start(), Err(SessionError::AlreadyInProgress));
        session.reset();
        assert_eq!(session.state(), HandshakeState::Idle);
        assert!(session.start().is_ok());
    }

    #[test]
    fn ignores_unrelated_answers() {
        let mut session = three_steps();
        session.start().unwrap();
        // nothing sent yet
        assert_eq!(session.resolve(0x06, 0x08, AckOutcome::Acked), None);
        session.step_sent(Instant::now());
        assert_eq!(session.resolve(0x06, 0x13, AckOutcome::Acked), None);
        assert_eq!(session.resolve(0x06, 0x08, AckOutcome::Cancelled), None);
        assert_eq!(session.state(), HandshakeState::AwaitingAck(0));
    }

    #[test]
    fn empty_handshake_completes_immediately() {
        let mut session = HandshakeSession::new(Vec::new());
        assert_eq!(session.start(), Ok(HandshakeState::Complete));
    }

    #[test]
    fn default_steps_order() {
        let steps = HandshakeConfig::default().steps().unwrap();
        let names: Vec<_> = steps.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["CFG-PRT", "CFG-RATE", "CFG-NAV5", "CFG-MSG", "CFG-MSG"]
        );
        assert_eq!(steps[3].frame().payload(), [0x01, 0x07, 0x01]);
        assert_eq!(steps[4].frame().payload(), [0x01, 0x03, 0x01]);
    }
}
