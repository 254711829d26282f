//! Connection settings configuration
//!
//! [`SettingsConfig`] is the serialisable form of the settings a connection
//! starts with, suitable for loading from a configuration file.
//! [`SettingsBuilder`] offers the same options as a fluent API.
//!
//! # Usage Example
//!
//! ```rust
//! use dlms_core::{Authentication, Role};
//! use dlms_session::config::SettingsBuilder;
//!
//! let settings = SettingsBuilder::new(Role::Client)
//!     .client_address(0x10)
//!     .server_address(0x01)
//!     .authentication(Authentication::Low)
//!     .build()?;
//! assert_eq!(settings.client_address(), 0x10);
//! # Ok::<(), dlms_core::DlmsError>(())
//! ```

use crate::settings::{DlmsSettings, MAX_RECEIVE_PDU_SIZE};
use dlms_core::{Authentication, DlmsError, DlmsResult, InterfaceType, Role, Standard};
use serde::{Deserialize, Serialize};

/// Largest HDLC window size (N(S) is three bits)
pub const MAX_WINDOW_SIZE: u8 = 7;

/// Initial connection settings
///
/// Every field has a default, so a configuration file only needs to name what
/// differs from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub role: Role,
    pub client_address: u16,
    pub server_address: u32,
    pub server_address_size: u8,
    pub interface_type: InterfaceType,
    pub authentication: Authentication,
    pub use_logical_name_referencing: bool,
    pub window_size: u8,
    pub max_pdu_size: u16,
    pub starting_packet_index: u32,
    pub standard: Standard,
    pub allow_anonymous_access: bool,
    /// Accept out-of-sequence HDLC I-frames. Only for replaying test traffic.
    pub skip_frame_check: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            role: Role::Client,
            client_address: 0x10,
            server_address: 0x01,
            server_address_size: 1,
            interface_type: InterfaceType::Hdlc,
            authentication: Authentication::None,
            use_logical_name_referencing: true,
            window_size: 1,
            max_pdu_size: MAX_RECEIVE_PDU_SIZE,
            starting_packet_index: 1,
            standard: Standard::Dlms,
            allow_anonymous_access: false,
            skip_frame_check: false,
        }
    }
}

impl SettingsConfig {
    pub fn validate(&self) -> DlmsResult<()> {
        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(DlmsError::InvalidData(format!(
                "Invalid window size: expected 1-{}, got {}",
                MAX_WINDOW_SIZE, self.window_size
            )));
        }
        if self.max_pdu_size == 0 {
            return Err(DlmsError::InvalidData(
                "Invalid max PDU size: must be > 0".to_string(),
            ));
        }
        if !matches!(self.server_address_size, 0 | 1 | 2 | 4) {
            return Err(DlmsError::InvalidData(format!(
                "Invalid server address size: {}",
                self.server_address_size
            )));
        }
        Ok(())
    }
}

/// Fluent builder for [`DlmsSettings`]
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    config: SettingsConfig,
}

impl SettingsBuilder {
    pub fn new(role: Role) -> Self {
        Self {
            config: SettingsConfig {
                role,
                ..SettingsConfig::default()
            },
        }
    }

    pub fn client_address(mut self, address: u16) -> Self {
        self.config.client_address = address;
        self
    }

    pub fn server_address(mut self, address: u32) -> Self {
        self.config.server_address = address;
        self
    }

    pub fn server_address_size(mut self, size: u8) -> Self {
        self.config.server_address_size = size;
        self
    }

    pub fn interface_type(mut self, interface_type: InterfaceType) -> Self {
        self.config.interface_type = interface_type;
        self
    }

    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.config.authentication = authentication;
        self
    }

    pub fn logical_name_referencing(mut self, value: bool) -> Self {
        self.config.use_logical_name_referencing = value;
        self
    }

    pub fn window_size(mut self, size: u8) -> Self {
        self.config.window_size = size;
        self
    }

    pub fn max_pdu_size(mut self, size: u16) -> Self {
        self.config.max_pdu_size = size;
        self
    }

    pub fn starting_packet_index(mut self, index: u32) -> Self {
        self.config.starting_packet_index = index;
        self
    }

    pub fn standard(mut self, standard: Standard) -> Self {
        self.config.standard = standard;
        self
    }

    pub fn allow_anonymous_access(mut self, allow: bool) -> Self {
        self.config.allow_anonymous_access = allow;
        self
    }

    /// Accept out-of-sequence HDLC I-frames. Only for replaying test traffic.
    pub fn skip_frame_check(mut self, skip: bool) -> Self {
        self.config.skip_frame_check = skip;
        self
    }

    pub fn config(&self) -> &SettingsConfig {
        &self.config
    }

    pub fn build(self) -> DlmsResult<DlmsSettings> {
        DlmsSettings::from_config(&self.config)
    }
}
