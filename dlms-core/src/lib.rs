//! Core types and utilities for DLMS/COSEM protocol
//!
//! This crate provides the error type, the enumerations shared by the session
//! and application layers, and the conformance bit set.

pub mod conformance;
pub mod enums;
pub mod error;

pub use conformance::Conformance;
pub use enums::{
    Authentication, ConnectionState, InterfaceType, Priority, Role, ServiceClass, Standard,
};
pub use error::{DlmsError, DlmsResult};
