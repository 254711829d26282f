//! HDLC frame sequence numbering
//!
//! Keeps the N(S)/N(R) state of one HDLC link. The sequencer never sees whole
//! frames, only control bytes: the framing layer hands over the control byte of
//! every received frame in wire order and asks for a control byte every time it
//! assembles a frame to send.
//!
//! Both counters hold a complete control byte rather than bare sequence
//! numbers. Bits 1..3 carry N(S), bits 5..7 carry N(R), bit 4 is the poll/final
//! bit and bit 0 tells information frames (0) from supervisory frames (1).

use crate::hdlc::control::{ControlField, HdlcFrameType, SNRM, UA, UI};
use crate::hdlc::statistics::SequenceStatistics;
use dlms_core::{DlmsError, Role};
use std::fmt;

/// Server sender frame sequence starting value
pub const SERVER_START_SENDER_FRAME_SEQUENCE: u8 = 0x1E;
/// Server receiver frame sequence starting value
pub const SERVER_START_RECEIVER_FRAME_SEQUENCE: u8 = 0xEE;
/// Client sender frame sequence starting value
pub const CLIENT_START_SENDER_FRAME_SEQUENCE: u8 = 0x10;
/// Client receiver frame sequence starting value
pub const CLIENT_START_RECEIVER_FRAME_SEQUENCE: u8 = 0x0E;

/// Advance the N(R) bits of a control byte
///
/// Adds one to N(R), sets the poll/final bit and keeps N(S) and bit 0.
pub fn increase_receiver_sequence(value: u8) -> u8 {
    value.wrapping_add(0x20) | 0x10 | (value & 0x0E)
}

/// Advance the N(S) bits of a control byte
///
/// N(S) lives in bits 1..3, so it steps by two and wraps inside those bits.
/// The high nibble is kept and bit 0 is cleared.
pub fn increase_send_sequence(value: u8) -> u8 {
    (value & 0xF0) | (value.wrapping_add(0x02) & 0x0E)
}

/// Starting `(sender, receiver)` values for a role
pub fn initial_frame_sequence(role: Role) -> (u8, u8) {
    match role {
        Role::Server => (
            SERVER_START_SENDER_FRAME_SEQUENCE,
            SERVER_START_RECEIVER_FRAME_SEQUENCE,
        ),
        Role::Client => (
            CLIENT_START_SENDER_FRAME_SEQUENCE,
            CLIENT_START_RECEIVER_FRAME_SEQUENCE,
        ),
    }
}

/// Diagnostic record for an I-frame that arrived out of sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMismatch {
    pub actual: u8,
    pub expected: u8,
}

impl SequenceMismatch {
    pub fn into_error(self) -> DlmsError {
        DlmsError::SequenceMismatch {
            actual: self.actual,
            expected: self.expected,
        }
    }
}

impl fmt::Display for SequenceMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid HDLC frame: 0x{:02X} expected: 0x{:02X}",
            self.actual, self.expected
        )
    }
}

impl From<SequenceMismatch> for DlmsError {
    fn from(mismatch: SequenceMismatch) -> Self {
        mismatch.into_error()
    }
}

/// Outcome of checking one received control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCheck {
    /// Unnumbered information; state untouched
    Notify,
    /// SNRM or UA; sequence reset to the starting values
    Reset,
    /// Supervisory or other unnumbered frame; receiver window advanced
    Supervisory,
    /// I-frame in sequence
    Information,
    /// I-frame out of sequence, accepted because validation is skipped
    Forced(SequenceMismatch),
    /// I-frame out of sequence
    Rejected(SequenceMismatch),
}

impl FrameCheck {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, FrameCheck::Rejected(_))
    }

    pub fn mismatch(&self) -> Option<SequenceMismatch> {
        match self {
            FrameCheck::Forced(mismatch) | FrameCheck::Rejected(mismatch) => Some(*mismatch),
            _ => None,
        }
    }

    /// Turn a rejection into an error so callers can use `?`
    pub fn into_result(self) -> Result<FrameCheck, DlmsError> {
        match self {
            FrameCheck::Rejected(mismatch) => Err(mismatch.into_error()),
            other => Ok(other),
        }
    }
}

/// Send/receive sequence state of one HDLC link
///
/// One instance per connection. Every call mutates the state, so calls must be
/// made in the order frames cross the wire.
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    role: Role,
    sender_frame: u8,
    receiver_frame: u8,
    skip_validation: bool,
    last_mismatch: Option<SequenceMismatch>,
    statistics: SequenceStatistics,
}

impl FrameSequencer {
    pub fn new(role: Role) -> Self {
        let (sender_frame, receiver_frame) = initial_frame_sequence(role);
        Self {
            role,
            sender_frame,
            receiver_frame,
            skip_validation: false,
            last_mismatch: None,
            statistics: SequenceStatistics::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Last generated or accepted sender control byte
    pub fn sender_frame(&self) -> u8 {
        self.sender_frame
    }

    /// Last accepted receiver control byte
    pub fn receiver_frame(&self) -> u8 {
        self.receiver_frame
    }

    pub fn skip_validation(&self) -> bool {
        self.skip_validation
    }

    /// Accept out-of-sequence I-frames instead of rejecting them
    ///
    /// Only meant for replaying captured or synthetic traffic in tests.
    pub fn set_skip_validation(&mut self, skip: bool) {
        self.skip_validation = skip;
    }

    /// Most recent out-of-sequence I-frame, rejected or forced
    pub fn last_mismatch(&self) -> Option<SequenceMismatch> {
        self.last_mismatch
    }

    pub fn statistics(&self) -> &SequenceStatistics {
        &self.statistics
    }

    pub fn clear_statistics(&mut self) {
        self.statistics.clear();
    }

    /// Restore both counters to the starting values of the role
    pub fn reset(&mut self) {
        let (sender_frame, receiver_frame) = initial_frame_sequence(self.role);
        self.sender_frame = sender_frame;
        self.receiver_frame = receiver_frame;
    }

    /// Validate the control byte of a received frame
    ///
    /// Returns `false` only for an out-of-sequence I-frame while validation is
    /// enabled. In that case the state is left as it was.
    pub fn check_frame(&mut self, control: u8) -> bool {
        self.check_frame_detailed(control).is_accepted()
    }

    /// Validate the control byte of a received frame and report what happened
    pub fn check_frame_detailed(&mut self, control: u8) -> FrameCheck {
        if control == UI {
            self.statistics.unnumbered_information += 1;
            return FrameCheck::Notify;
        }
        if HdlcFrameType::Unnumbered.matches(control) && (control == UA || control == SNRM) {
            log::debug!(
                "{} received, resetting {:?} frame sequence",
                ControlField::decode(control),
                self.role
            );
            self.reset();
            self.statistics.resets += 1;
            return FrameCheck::Reset;
        }
        if HdlcFrameType::Supervisory.matches(control) {
            self.receiver_frame = increase_receiver_sequence(self.receiver_frame);
            self.statistics.supervisory_accepted += 1;
            return FrameCheck::Supervisory;
        }

        let expected = self.expected_information();
        if control == expected {
            self.receiver_frame = control;
            self.statistics.information_accepted += 1;
            return FrameCheck::Information;
        }

        let mismatch = SequenceMismatch {
            actual: control,
            expected,
        };
        self.last_mismatch = Some(mismatch);
        if self.skip_validation {
            log::debug!("{}, accepted because frame check is skipped", mismatch);
            self.receiver_frame = control;
            self.statistics.forced_accepts += 1;
            return FrameCheck::Forced(mismatch);
        }
        log::warn!("{}", mismatch);
        self.statistics.sequence_errors += 1;
        FrameCheck::Rejected(mismatch)
    }

    /// Control byte the next received I-frame must carry
    ///
    /// After an I-frame of our own (sender bit 0 clear) the peer acknowledges it,
    /// so both N(S) and N(R) move on. After an RR or keep-alive only N(S) moves.
    pub fn expected_information(&self) -> u8 {
        if self.sender_frame & 0x01 == 0 {
            increase_receiver_sequence(increase_send_sequence(self.receiver_frame))
        } else {
            increase_send_sequence(self.receiver_frame)
        }
    }

    /// Control byte for the next I-frame to send
    ///
    /// `first` marks the first frame of a message, which also acknowledges what
    /// was received so far. Continuation segments only advance N(S).
    pub fn next_send(&mut self, first: bool) -> u8 {
        self.sender_frame = if first {
            increase_receiver_sequence(increase_send_sequence(self.sender_frame))
        } else {
            increase_send_sequence(self.sender_frame)
        };
        self.statistics.information_sent += 1;
        log::trace!("Next I-frame: {}", ControlField::decode(self.sender_frame));
        self.sender_frame
    }

    /// Control byte for a receiver ready S-frame
    pub fn receiver_ready(&mut self) -> u8 {
        self.sender_frame = increase_receiver_sequence(self.sender_frame | 0x01);
        self.statistics.receiver_ready_sent += 1;
        self.sender_frame & 0xF1
    }

    /// Control byte for a keep-alive S-frame
    ///
    /// Marks the sender state as supervisory without advancing N(R).
    pub fn keep_alive(&mut self) -> u8 {
        self.sender_frame |= 0x01;
        self.statistics.keep_alive_sent += 1;
        self.sender_frame & 0xF1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdlc::control::DISC;

    #[test]
    fn test_increase_receiver_sequence() {
        assert_eq!(increase_receiver_sequence(0x12), 0x32);
        assert_eq!(increase_receiver_sequence(0xE0), 0x10);
        assert_eq!(increase_receiver_sequence(0x0E), 0x3E);
        assert_eq!(increase_receiver_sequence(0xFF), 0x1F);
    }

    #[test]
    fn test_increase_send_sequence() {
        assert_eq!(increase_send_sequence(0x10), 0x12);
        assert_eq!(increase_send_sequence(0xEE), 0xE0);
        assert_eq!(increase_send_sequence(0x1E), 0x10);
        assert_eq!(increase_send_sequence(0x0E), 0x00);
        assert_eq!(increase_send_sequence(0xFF), 0xF0);
    }

    #[test]
    fn test_sequence_functions_over_byte_domain() {
        for value in 0..=u8::MAX {
            let received = increase_receiver_sequence(value);
            let sent = increase_send_sequence(value);
            // Deterministic
            assert_eq!(received, increase_receiver_sequence(value));
            assert_eq!(sent, increase_send_sequence(value));
            // N(S) is kept, P/F set, N(R) moved by one
            assert_eq!(received & 0x0E, value & 0x0E);
            assert_eq!(received & 0x10, 0x10);
            assert_eq!(received >> 5, ((value >> 5) + 1) & 0x07);
            // High nibble kept, N(S) moved by one
            assert_eq!(sent & 0xF0, value & 0xF0);
            assert_eq!((sent >> 1) & 0x07, (((value >> 1) & 0x07) + 1) & 0x07);
            assert_eq!(sent & 0x01, 0);
        }
    }

    #[test]
    fn test_initial_values() {
        let server = FrameSequencer::new(Role::Server);
        assert_eq!(server.sender_frame(), 0x1E);
        assert_eq!(server.receiver_frame(), 0xEE);

        let client = FrameSequencer::new(Role::Client);
        assert_eq!(client.sender_frame(), 0x10);
        assert_eq!(client.receiver_frame(), 0x0E);
        assert!(!client.skip_validation());
    }

    #[test]
    fn test_reset_restores_role_values() {
        let mut server = FrameSequencer::new(Role::Server);
        server.next_send(true);
        server.check_frame(0x31);
        server.reset();
        assert_eq!(server.sender_frame(), 0x1E);
        assert_eq!(server.receiver_frame(), 0xEE);

        let mut client = FrameSequencer::new(Role::Client);
        client.receiver_ready();
        client.check_frame(0x51);
        client.reset();
        assert_eq!(client.sender_frame(), 0x10);
        assert_eq!(client.receiver_frame(), 0x0E);
    }

    #[test]
    fn test_notify_keeps_state() {
        let mut client = FrameSequencer::new(Role::Client);
        client.next_send(true);
        let (sender, receiver) = (client.sender_frame(), client.receiver_frame());
        assert!(client.check_frame(UI));
        assert_eq!(client.check_frame_detailed(UI), FrameCheck::Notify);
        assert_eq!(client.sender_frame(), sender);
        assert_eq!(client.receiver_frame(), receiver);
        assert_eq!(client.statistics().unnumbered_information, 2);
    }

    #[test]
    fn test_snrm_and_ua_reset() {
        for control in [SNRM, UA] {
            let mut server = FrameSequencer::new(Role::Server);
            server.next_send(true);
            server.receiver_ready();
            assert_eq!(server.check_frame_detailed(control), FrameCheck::Reset);
            assert_eq!(server.sender_frame(), SERVER_START_SENDER_FRAME_SEQUENCE);
            assert_eq!(server.receiver_frame(), SERVER_START_RECEIVER_FRAME_SEQUENCE);
            assert_eq!(server.statistics().resets, 1);
        }
    }

    #[test]
    fn test_supervisory_advances_receiver() {
        let mut client = FrameSequencer::new(Role::Client);
        assert_eq!(client.check_frame_detailed(0x31), FrameCheck::Supervisory);
        assert_eq!(client.receiver_frame(), 0x3E);
        assert_eq!(client.sender_frame(), 0x10);
    }

    #[test]
    fn test_other_unnumbered_frames_advance_receiver() {
        let mut client = FrameSequencer::new(Role::Client);
        assert_eq!(client.check_frame_detailed(DISC), FrameCheck::Supervisory);
        assert_eq!(client.receiver_frame(), increase_receiver_sequence(0x0E));
    }

    #[test]
    fn test_information_in_sequence() {
        let mut server = FrameSequencer::new(Role::Server);
        assert_eq!(server.expected_information(), 0x10);
        assert_eq!(server.check_frame_detailed(0x10), FrameCheck::Information);
        assert_eq!(server.receiver_frame(), 0x10);

        let mut client = FrameSequencer::new(Role::Client);
        assert!(client.check_frame(0x30));
        assert_eq!(client.receiver_frame(), 0x30);
    }

    #[test]
    fn test_information_after_keep_alive() {
        let mut client = FrameSequencer::new(Role::Client);
        client.keep_alive();
        // Sender is odd now, so only N(S) is expected to move
        assert_eq!(client.expected_information(), 0x00);
        assert!(client.check_frame(0x00));
        assert_eq!(client.receiver_frame(), 0x00);
    }

    #[test]
    fn test_information_mismatch_rejected() {
        let mut server = FrameSequencer::new(Role::Server);
        let mismatch = SequenceMismatch {
            actual: 0x32,
            expected: 0x10,
        };
        assert!(!server.check_frame(0x32));
        assert_eq!(server.receiver_frame(), 0xEE);
        assert_eq!(server.sender_frame(), 0x1E);
        assert_eq!(server.last_mismatch(), Some(mismatch));
        assert_eq!(server.statistics().sequence_errors, 1);
        assert_eq!(
            server.check_frame_detailed(0x32),
            FrameCheck::Rejected(mismatch)
        );
        assert_eq!(
            server.check_frame_detailed(0x32).into_result(),
            Err(DlmsError::SequenceMismatch {
                actual: 0x32,
                expected: 0x10,
            })
        );
    }

    #[test]
    fn test_information_mismatch_forced() {
        let mut server = FrameSequencer::new(Role::Server);
        server.set_skip_validation(true);
        assert!(server.check_frame(0x32));
        assert_eq!(server.receiver_frame(), 0x32);
        assert_eq!(server.statistics().forced_accepts, 1);
        assert_eq!(server.statistics().sequence_errors, 0);
        assert_eq!(
            server.last_mismatch(),
            Some(SequenceMismatch {
                actual: 0x32,
                expected: 0x10,
            })
        );
    }

    #[test]
    fn test_next_send() {
        let mut client = FrameSequencer::new(Role::Client);
        assert_eq!(client.next_send(true), 0x32);
        assert_eq!(client.next_send(false), 0x34);
        assert_eq!(client.next_send(true), 0x56);
        assert_eq!(client.sender_frame(), 0x56);

        let mut server = FrameSequencer::new(Role::Server);
        assert_eq!(server.next_send(true), 0x30);
        assert_eq!(server.statistics().information_sent, 1);
    }

    #[test]
    fn test_receiver_ready() {
        let mut client = FrameSequencer::new(Role::Client);
        assert_eq!(client.receiver_ready(), 0x31);
        assert_eq!(client.receiver_ready(), 0x51);

        let mut server = FrameSequencer::new(Role::Server);
        for _ in 0..20 {
            let previous = server.sender_frame();
            let control = server.receiver_ready();
            assert_eq!(server.sender_frame(), increase_receiver_sequence(previous | 0x01));
            assert_eq!(control, server.sender_frame() & 0xF1);
            assert_eq!(control & 0x0F, 0x01);
        }
    }

    #[test]
    fn test_keep_alive_does_not_advance() {
        let mut client = FrameSequencer::new(Role::Client);
        assert_eq!(client.keep_alive(), 0x11);
        assert_eq!(client.keep_alive(), 0x11);
        assert_eq!(client.sender_frame(), 0x11);
        assert_eq!(client.receiver_frame(), 0x0E);
        assert_eq!(client.statistics().keep_alive_sent, 2);
    }
}
