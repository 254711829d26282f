//! Enumerations shared by the DLMS/COSEM session and application layers

use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Side of the association a settings context acts for
///
/// The role decides the starting values of the HDLC frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Client,
    Server,
}

impl Role {
    pub fn is_server(&self) -> bool {
        matches!(self, Role::Server)
    }
}

/// Priority carried in the invoke-id-and-priority byte (bit 7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    #[default]
    High,
}

/// Service class carried in the invoke-id-and-priority byte (bit 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceClass {
    UnConfirmed,
    #[default]
    Confirmed,
}

/// Lower layer the DLMS messages travel over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceType {
    #[default]
    Hdlc,
    Wrapper,
    Pdu,
    WirelessMbus,
    HdlcWithModeE,
    Plc,
    PlcHdlc,
    Lpwan,
    WiSun,
    PlcPrime,
    WiredMbus,
}

impl InterfaceType {
    /// Whether frames on this interface are HDLC framed and sequence numbered
    pub fn uses_hdlc(&self) -> bool {
        matches!(
            self,
            InterfaceType::Hdlc | InterfaceType::HdlcWithModeE | InterfaceType::PlcHdlc
        )
    }
}

impl TryFrom<u8> for InterfaceType {
    type Error = DlmsError;

    fn try_from(value: u8) -> DlmsResult<Self> {
        Ok(match value {
            0 => InterfaceType::Hdlc,
            1 => InterfaceType::Wrapper,
            2 => InterfaceType::Pdu,
            3 => InterfaceType::WirelessMbus,
            4 => InterfaceType::HdlcWithModeE,
            5 => InterfaceType::Plc,
            6 => InterfaceType::PlcHdlc,
            7 => InterfaceType::Lpwan,
            8 => InterfaceType::WiSun,
            9 => InterfaceType::PlcPrime,
            10 => InterfaceType::WiredMbus,
            _ => {
                return Err(DlmsError::InvalidData(format!(
                    "Unknown interface type: {}",
                    value
                )))
            }
        })
    }
}

/// Authentication mechanism used when the association is established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authentication {
    #[default]
    None,
    Low,
    High,
    HighMd5,
    HighSha1,
    HighGmac,
    HighSha256,
    HighEcdsa,
}

impl Authentication {
    /// Mechanism id as used in the AARQ mechanism name
    pub fn mechanism_id(&self) -> u8 {
        match self {
            Authentication::None => 0,
            Authentication::Low => 1,
            Authentication::High => 2,
            Authentication::HighMd5 => 3,
            Authentication::HighSha1 => 4,
            Authentication::HighGmac => 5,
            Authentication::HighSha256 => 6,
            Authentication::HighEcdsa => 7,
        }
    }
}

impl TryFrom<u8> for Authentication {
    type Error = DlmsError;

    fn try_from(value: u8) -> DlmsResult<Self> {
        Ok(match value {
            0 => Authentication::None,
            1 => Authentication::Low,
            2 => Authentication::High,
            3 => Authentication::HighMd5,
            4 => Authentication::HighSha1,
            5 => Authentication::HighGmac,
            6 => Authentication::HighSha256,
            7 => Authentication::HighEcdsa,
            _ => {
                return Err(DlmsError::InvalidData(format!(
                    "Unknown authentication mechanism: {}",
                    value
                )))
            }
        })
    }
}

/// Companion standard the meter follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standard {
    #[default]
    Dlms,
    India,
    Italy,
    SaudiArabia,
    Idis,
}

/// Connection progress flags
///
/// Several layers can be connected at the same time, e.g. `HDLC | DLMS`
/// after both the SNRM/UA and the AARQ/AARE exchange succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionState(u8);

impl ConnectionState {
    /// Nothing is connected
    pub const NONE: Self = Self(0);
    /// HDLC link is established
    pub const HDLC: Self = Self(1);
    /// DLMS association is established
    pub const DLMS: Self = Self(2);
    /// IEC 62056-21 mode E handshake is done
    pub const IEC: Self = Self(4);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for ConnectionState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ConnectionState {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Role::default(), Role::Client);
        assert_eq!(Priority::default(), Priority::High);
        assert_eq!(ServiceClass::default(), ServiceClass::Confirmed);
        assert_eq!(InterfaceType::default(), InterfaceType::Hdlc);
        assert_eq!(Authentication::default(), Authentication::None);
        assert!(ConnectionState::default().is_none());
    }

    #[test]
    fn test_connection_state_flags() {
        let mut state = ConnectionState::NONE;
        state.insert(ConnectionState::HDLC);
        state |= ConnectionState::DLMS;
        assert!(state.contains(ConnectionState::HDLC));
        assert!(state.contains(ConnectionState::DLMS | ConnectionState::HDLC));
        assert!(!state.contains(ConnectionState::IEC));
        state.remove(ConnectionState::HDLC);
        assert_eq!(state, ConnectionState::DLMS);
        state.remove(ConnectionState::DLMS);
        assert!(state.is_none());
    }

    #[test]
    fn test_authentication_try_from() {
        for id in 0..=7u8 {
            let auth = Authentication::try_from(id).unwrap();
            assert_eq!(auth.mechanism_id(), id);
        }
        assert!(Authentication::try_from(8).is_err());
    }

    #[test]
    fn test_interface_type_uses_hdlc() {
        assert!(InterfaceType::Hdlc.uses_hdlc());
        assert!(InterfaceType::PlcHdlc.uses_hdlc());
        assert!(!InterfaceType::Wrapper.uses_hdlc());
        assert_eq!(InterfaceType::try_from(1).unwrap(), InterfaceType::Wrapper);
        assert!(InterfaceType::try_from(11).is_err());
    }

    #[test]
    fn test_role_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Server).unwrap(), "\"server\"");
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
    }
}
