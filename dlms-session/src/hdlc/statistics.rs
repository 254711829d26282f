//! HDLC frame sequence statistics

/// Counters kept by a [`FrameSequencer`](super::sequence::FrameSequencer)
///
/// Updated on every checked or generated control byte. Useful for spotting
/// a link that keeps falling out of sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceStatistics {
    /// I-frames accepted in sequence
    pub information_accepted: u64,
    /// S-frames (and non-resetting U-frames) accepted
    pub supervisory_accepted: u64,
    /// UI frames seen
    pub unnumbered_information: u64,
    /// Sequence resets triggered by SNRM/UA
    pub resets: u64,
    /// I-frames rejected because of a sequence mismatch
    pub sequence_errors: u64,
    /// Out-of-sequence I-frames accepted because validation was skipped
    pub forced_accepts: u64,
    /// I-frame control bytes generated
    pub information_sent: u64,
    /// Receiver ready control bytes generated
    pub receiver_ready_sent: u64,
    /// Keep-alive control bytes generated
    pub keep_alive_sent: u64,
}

impl SequenceStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every counter to zero
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Total number of control bytes passed to `check_frame`
    pub fn frames_checked(&self) -> u64 {
        self.information_accepted
            + self.supervisory_accepted
            + self.unnumbered_information
            + self.resets
            + self.sequence_errors
            + self.forced_accepts
    }

    /// Total number of control bytes generated for sending
    pub fn frames_generated(&self) -> u64 {
        self.information_sent + self.receiver_ready_sent + self.keep_alive_sent
    }

    /// Share of checked frames that were out of sequence, as a percentage
    ///
    /// Forced accepts count as errors. Returns 0.0 before any frame was checked.
    pub fn error_rate(&self) -> f64 {
        let checked = self.frames_checked();
        if checked == 0 {
            0.0
        } else {
            ((self.sequence_errors + self.forced_accepts) as f64 / checked as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rate_empty() {
        assert_eq!(SequenceStatistics::new().error_rate(), 0.0);
    }

    #[test]
    fn test_error_rate() {
        let stats = SequenceStatistics {
            information_accepted: 2,
            supervisory_accepted: 1,
            sequence_errors: 1,
            ..Default::default()
        };
        assert_eq!(stats.frames_checked(), 4);
        assert_eq!(stats.error_rate(), 25.0);
    }

    #[test]
    fn test_clear() {
        let mut stats = SequenceStatistics {
            information_sent: 3,
            keep_alive_sent: 1,
            ..Default::default()
        };
        assert_eq!(stats.frames_generated(), 4);
        stats.clear();
        assert_eq!(stats, SequenceStatistics::default());
    }
}
