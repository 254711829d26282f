//! HDLC session layer module

pub mod control;
pub mod sequence;
pub mod statistics;

pub use control::{ControlField, FrameKind, HdlcFrameType, UnnumberedCommand};
pub use sequence::{
    increase_receiver_sequence, increase_send_sequence, FrameCheck, FrameSequencer,
    SequenceMismatch,
};
pub use statistics::SequenceStatistics;
