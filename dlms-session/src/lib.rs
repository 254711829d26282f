//! Session layer module for DLMS/COSEM protocol
//!
//! This crate keeps the per-connection state of a DLMS/COSEM link: the HDLC
//! frame sequence numbering and the communication settings that own it.
//! Framing raw bytes is left to the transport; it hands control bytes to
//! [`DlmsSettings::check_frame`] and asks [`DlmsSettings::next_send`],
//! [`DlmsSettings::receiver_ready`] or [`DlmsSettings::keep_alive`] for the
//! control byte of each frame it sends.

pub mod config;
pub mod hdlc;
pub mod settings;

pub use config::{SettingsBuilder, SettingsConfig};
pub use dlms_core::{DlmsError, DlmsResult};
pub use hdlc::*;
pub use settings::DlmsSettings;
