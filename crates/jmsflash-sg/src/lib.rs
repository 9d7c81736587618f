//! jmsflash-sg - Linux SCSI-generic passthrough backend
//!
//! Issues the vendor SCSI commands through the `SG_IO` ioctl on an already
//! attached block device (`/dev/sdX`). The kernel's SCSI stack does the
//! transport framing, so unlike the USB BOT backend there is no status
//! wrapper to validate here - command failure is reported through the ioctl
//! result fields.
//!
//! # Example
//!
//! ```no_run
//! use jmsflash_sg::SgDevice;
//! use jmsflash_core::flash;
//!
//! let mut dev = SgDevice::open("/dev/sda")?;
//! let version = flash::firmware_version(&mut dev)?;
//! println!("Firmware version: {}", version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;

pub use device::SgDevice;
pub use error::{Result, SgError};

/// Open a block device and return the transport boxed for the CLI dispatch.
pub fn open_sg(
    path: &str,
) -> std::result::Result<Box<dyn jmsflash_core::VendorTransport>, Box<dyn std::error::Error>> {
    Ok(Box::new(SgDevice::open(path)?))
}
