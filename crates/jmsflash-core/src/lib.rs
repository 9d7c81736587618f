//! jmsflash-core - vendor protocol and flash engine for the JMS567
//!
//! The JMicron JMS567 USB-SATA bridge accepts an undocumented set of vendor
//! SCSI commands for inspecting and reprogramming its firmware flash. This
//! crate contains everything that is independent of how those commands reach
//! the device:
//!
//! - [`vendor`] builds the fixed-layout command blocks (chip-info, reset, and
//!   the `0xDF` flash read/write/erase family), reverse-engineered from USB
//!   captures of the vendor flashing tool.
//! - [`transport`] defines the [`VendorTransport`](transport::VendorTransport)
//!   trait implemented by the USB Bulk-Only-Transport and Linux SCSI-generic
//!   backends.
//! - [`flash`] chunks arbitrary read/write requests into 4096-byte sector
//!   commands and applies the offset/padding/NVS-skip policy.
//!
//! A single bit error in these layouts can brick a controller, so the wire
//! structures are packed field by field and covered by byte-exact tests.

pub mod error;
pub mod flash;
pub mod transport;
pub mod vendor;

pub use error::{Error, Result};
pub use transport::VendorTransport;
