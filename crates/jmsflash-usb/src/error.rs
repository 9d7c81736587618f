//! Error types for the USB BOT backend.
//!
//! These cover opening and claiming the device; transfer-time failures map
//! onto `jmsflash_core::Error` so the flash engine sees one error type.

use thiserror::Error;

/// Result type for USB BOT open/configuration operations.
pub type Result<T> = std::result::Result<T, UsbBotError>;

/// Errors that can occur while opening the USB device.
#[derive(Debug, Error)]
pub enum UsbBotError {
    /// No matching USB device connected
    #[error("USB device not found (VID={vid:04x} PID={})", pid.map(|p| format!("{:04x}", p)).unwrap_or_else(|| "any".into()))]
    DeviceNotFound { vid: u16, pid: Option<u16> },

    /// Device has no Mass Storage BOT interface
    #[error("no USB Mass Storage BOT interface (class 08h protocol 50h) found")]
    NoBotInterface,

    /// Failed to open the device
    #[error("failed to open USB device: {0}")]
    OpenFailed(String),

    /// Failed to claim the MSC interface
    #[error("failed to claim interface {interface}: {msg}")]
    ClaimFailed { interface: u8, msg: String },

    /// A bulk endpoint was missing or could not be opened
    #[error("failed to open bulk endpoint {address:#04x}: {msg}")]
    EndpointUnavailable { address: u8, msg: String },
}
