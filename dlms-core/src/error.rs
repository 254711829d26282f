use thiserror::Error;

/// Main error type for DLMS/COSEM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DlmsError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Frame invalid: {0}")]
    FrameInvalid(String),

    /// An I-frame arrived whose control byte does not follow the expected sequence
    #[error("Invalid HDLC frame sequence: 0x{actual:02X}, expected 0x{expected:02X}")]
    SequenceMismatch { actual: u8, expected: u8 },
}

/// Result type alias for DLMS/COSEM operations
pub type DlmsResult<T> = Result<T, DlmsError>;
