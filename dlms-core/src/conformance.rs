//! Conformance bit set
//!
//! The conformance block tells which xDLMS services the client proposes and
//! the server finally grants. It is a 24-bit field; bit numbering follows
//! Green Book table "Conformance block".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conformance {
    bits: u32,
}

impl Conformance {
    pub const GENERAL_PROTECTION: Self = Self { bits: 0x0000_0001 };
    pub const GENERAL_BLOCK_TRANSFER: Self = Self { bits: 0x0000_0002 };
    /// Short Name referencing
    pub const READ: Self = Self { bits: 0x0000_0004 };
    /// Short Name referencing
    pub const WRITE: Self = Self { bits: 0x0000_0008 };
    pub const UNCONFIRMED_WRITE: Self = Self { bits: 0x0000_0010 };
    pub const ATTRIBUTE_0_SUPPORTED_WITH_SET: Self = Self { bits: 0x0000_0020 };
    pub const PRIORITY_MGMT_SUPPORTED: Self = Self { bits: 0x0000_0040 };
    pub const ATTRIBUTE_0_SUPPORTED_WITH_GET: Self = Self { bits: 0x0000_0080 };
    pub const BLOCK_TRANSFER_WITH_GET_OR_READ: Self = Self { bits: 0x0000_0100 };
    pub const BLOCK_TRANSFER_WITH_SET_OR_WRITE: Self = Self { bits: 0x0000_0200 };
    pub const BLOCK_TRANSFER_WITH_ACTION: Self = Self { bits: 0x0000_0400 };
    pub const MULTIPLE_REFERENCES: Self = Self { bits: 0x0000_0800 };
    pub const INFORMATION_REPORT: Self = Self { bits: 0x0000_1000 };
    pub const DATA_NOTIFICATION: Self = Self { bits: 0x0000_2000 };
    pub const PARAMETERIZED_ACCESS: Self = Self { bits: 0x0000_4000 };
    /// Logical Name referencing
    pub const GET: Self = Self { bits: 0x0000_8000 };
    /// Logical Name referencing
    pub const SET: Self = Self { bits: 0x0001_0000 };
    pub const SELECTIVE_ACCESS: Self = Self { bits: 0x0002_0000 };
    pub const EVENT_NOTIFICATION: Self = Self { bits: 0x0004_0000 };
    /// Logical Name referencing
    pub const ACTION: Self = Self { bits: 0x0008_0000 };

    pub const EMPTY: Self = Self { bits: 0 };

    /// Conformance a client proposes before anything has been negotiated
    ///
    /// Logical Name referencing proposes the GET/SET/ACTION family with block
    /// transfer; Short Name referencing proposes READ/WRITE with information
    /// report and parameterized access.
    pub const fn initial(use_logical_name_referencing: bool) -> Self {
        if use_logical_name_referencing {
            Self {
                bits: Self::BLOCK_TRANSFER_WITH_ACTION.bits
                    | Self::BLOCK_TRANSFER_WITH_SET_OR_WRITE.bits
                    | Self::BLOCK_TRANSFER_WITH_GET_OR_READ.bits
                    | Self::SET.bits
                    | Self::SELECTIVE_ACCESS.bits
                    | Self::ACTION.bits
                    | Self::MULTIPLE_REFERENCES.bits
                    | Self::GET.bits,
            }
        } else {
            Self {
                bits: Self::INFORMATION_REPORT.bits
                    | Self::READ.bits
                    | Self::UNCONFIRMED_WRITE.bits
                    | Self::WRITE.bits
                    | Self::PARAMETERIZED_ACCESS.bits
                    | Self::MULTIPLE_REFERENCES.bits,
            }
        }
    }

    /// Build from raw bits, dropping anything above bit 23
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            bits: bits & 0x00FF_FFFF,
        }
    }

    pub const fn bits(&self) -> u32 {
        self.bits
    }

    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::from_bits(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32))
    }

    pub const fn to_bytes(self) -> [u8; 3] {
        [
            ((self.bits >> 16) & 0xFF) as u8,
            ((self.bits >> 8) & 0xFF) as u8,
            (self.bits & 0xFF) as u8,
        ]
    }

    pub const fn contains(self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl BitOr for Conformance {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

impl BitOrAssign for Conformance {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl BitAnd for Conformance {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self {
            bits: self.bits & rhs.bits,
        }
    }
}

impl BitAndAssign for Conformance {
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits &= rhs.bits;
    }
}

impl fmt::Debug for Conformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conformance")
            .field("bits", &format_args!("0x{:06X}", self.bits))
            .finish()
    }
}

impl fmt::Display for Conformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Conformance(0x{:06X})", self.bits)
    }
}
