//! HDLC control field classification
//!
//! The control byte of a DLMS HDLC frame is laid out as
//! `RRR P SSS 0` for information frames, `RRR P xx 0 1` for supervisory
//! frames and `xxx P xx 1 1` for unnumbered frames, where `RRR` is N(R),
//! `SSS` is N(S) and `P` is the poll/final bit.

use std::fmt;

/// Unnumbered information (used for notifications)
pub const UI: u8 = 0x13;
/// Unnumbered acknowledge
pub const UA: u8 = 0x73;
/// Set normal response mode
pub const SNRM: u8 = 0x93;
/// Disconnect
pub const DISC: u8 = 0x53;
/// Disconnected mode
pub const DM: u8 = 0x1F;
/// Frame reject
pub const FRMR: u8 = 0x97;

/// Poll/final bit
pub const POLL_FINAL: u8 = 0x10;

/// Frame type bit patterns in the low two bits of the control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HdlcFrameType {
    Information = 0x00,
    Supervisory = 0x01,
    Unnumbered = 0x03,
}

impl HdlcFrameType {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Mask test `(control & pattern) == pattern`
    ///
    /// Every byte matches `Information`, and every unnumbered byte also
    /// matches `Supervisory`; callers test the narrower patterns first.
    pub fn matches(self, control: u8) -> bool {
        control & self.value() == self.value()
    }
}

/// Unnumbered command or response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnnumberedCommand {
    SetNormalResponseMode,
    Disconnect,
    UnnumberedAcknowledge,
    DisconnectMode,
    FrameReject,
    UnnumberedInformation,
    Other(u8),
}

impl UnnumberedCommand {
    fn from_control(control: u8) -> Self {
        match control | POLL_FINAL {
            SNRM => UnnumberedCommand::SetNormalResponseMode,
            DISC => UnnumberedCommand::Disconnect,
            UA => UnnumberedCommand::UnnumberedAcknowledge,
            DM => UnnumberedCommand::DisconnectMode,
            FRMR => UnnumberedCommand::FrameReject,
            UI => UnnumberedCommand::UnnumberedInformation,
            _ => UnnumberedCommand::Other(control),
        }
    }
}

/// Decoded meaning of a control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Information {
        send_sequence: u8,
        receive_sequence: u8,
        poll_final: bool,
    },
    ReceiveReady {
        receive_sequence: u8,
        poll_final: bool,
    },
    ReceiveNotReady {
        receive_sequence: u8,
        poll_final: bool,
    },
    Unnumbered {
        command: UnnumberedCommand,
        poll_final: bool,
    },
}

/// A raw control byte together with its decoded form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlField {
    raw: u8,
    kind: FrameKind,
}

impl ControlField {
    pub fn decode(raw: u8) -> Self {
        let poll_final = raw & POLL_FINAL != 0;
        let receive_sequence = (raw >> 5) & 0x07;
        let kind = if raw & 0x01 == 0 {
            FrameKind::Information {
                send_sequence: (raw >> 1) & 0x07,
                receive_sequence,
                poll_final,
            }
        } else if raw & 0x03 == 0x01 {
            if raw & 0x0F == 0x05 {
                FrameKind::ReceiveNotReady {
                    receive_sequence,
                    poll_final,
                }
            } else {
                FrameKind::ReceiveReady {
                    receive_sequence,
                    poll_final,
                }
            }
        } else {
            FrameKind::Unnumbered {
                command: UnnumberedCommand::from_control(raw),
                poll_final,
            }
        };
        Self { raw, kind }
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn frame_type(&self) -> HdlcFrameType {
        match self.kind {
            FrameKind::Information { .. } => HdlcFrameType::Information,
            FrameKind::ReceiveReady { .. } | FrameKind::ReceiveNotReady { .. } => {
                HdlcFrameType::Supervisory
            }
            FrameKind::Unnumbered { .. } => HdlcFrameType::Unnumbered,
        }
    }

    pub fn is_information(&self) -> bool {
        matches!(self.kind, FrameKind::Information { .. })
    }
}

impl fmt::Display for ControlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FrameKind::Information {
                send_sequence,
                receive_sequence,
                ..
            } => write!(
                f,
                "I(0x{:02X} N(S)={} N(R)={})",
                self.raw, send_sequence, receive_sequence
            ),
            FrameKind::ReceiveReady {
                receive_sequence, ..
            } => write!(f, "RR(0x{:02X} N(R)={})", self.raw, receive_sequence),
            FrameKind::ReceiveNotReady {
                receive_sequence, ..
            } => write!(f, "RNR(0x{:02X} N(R)={})", self.raw, receive_sequence),
            FrameKind::Unnumbered { command, .. } => write!(f, "U(0x{:02X} {:?})", self.raw, command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_type_masks() {
        assert!(HdlcFrameType::Unnumbered.matches(SNRM));
        assert!(HdlcFrameType::Supervisory.matches(SNRM));
        assert!(!HdlcFrameType::Unnumbered.matches(0x31));
        assert!(HdlcFrameType::Supervisory.matches(0x31));
        assert!(!HdlcFrameType::Supervisory.matches(0x32));
    }

    #[test]
    fn test_decode_information() {
        let field = ControlField::decode(0x32);
        assert_eq!(
            field.kind(),
            FrameKind::Information {
                send_sequence: 1,
                receive_sequence: 1,
                poll_final: true,
            }
        );
        assert_eq!(field.frame_type(), HdlcFrameType::Information);
        assert_eq!(field.to_string(), "I(0x32 N(S)=1 N(R)=1)");
    }

    #[test]
    fn test_decode_supervisory() {
        assert_eq!(
            ControlField::decode(0x51).kind(),
            FrameKind::ReceiveReady {
                receive_sequence: 2,
                poll_final: true,
            }
        );
        assert_eq!(
            ControlField::decode(0x35).kind(),
            FrameKind::ReceiveNotReady {
                receive_sequence: 1,
                poll_final: true,
            }
        );
    }

    #[test]
    fn test_decode_unnumbered() {
        let cases = [
            (SNRM, UnnumberedCommand::SetNormalResponseMode),
            (UA, UnnumberedCommand::UnnumberedAcknowledge),
            (DISC, UnnumberedCommand::Disconnect),
            (DM, UnnumberedCommand::DisconnectMode),
            (FRMR, UnnumberedCommand::FrameReject),
            (UI, UnnumberedCommand::UnnumberedInformation),
        ];
        for (raw, command) in cases {
            let field = ControlField::decode(raw);
            assert_eq!(field.frame_type(), HdlcFrameType::Unnumbered);
            assert_eq!(
                field.kind(),
                FrameKind::Unnumbered {
                    command,
                    poll_final: true,
                }
            );
        }
        // Poll bit cleared still decodes to the same command
        assert_eq!(
            ControlField::decode(0x83).kind(),
            FrameKind::Unnumbered {
                command: UnnumberedCommand::SetNormalResponseMode,
                poll_final: false,
            }
        );
    }
}
