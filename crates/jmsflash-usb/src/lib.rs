//! jmsflash-usb - USB Mass-Storage Bulk-Only-Transport backend
//!
//! Talks to the JMS567 directly over its USB bulk endpoints, wrapping each
//! vendor SCSI command in a 31-byte Command Block Wrapper and validating the
//! 13-byte Command Status Wrapper that follows. This works even when the
//! device runs a UAS firmware, as long as the BOT alternate interface is
//! claimed away from the kernel driver.
//!
//! # Example
//!
//! ```no_run
//! use jmsflash_usb::{UsbBot, UsbBotConfig};
//! use jmsflash_core::flash;
//!
//! let mut dev = UsbBot::open(&UsbBotConfig::new(0x152D))?;
//! let version = flash::firmware_version(&mut dev)?;
//! println!("Firmware version: {}", version);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bot;
mod device;
mod error;

pub use bot::{build_cbw, Csw, CBW_LEN, CBW_SIGNATURE, CBW_TAG, CSW_LEN, CSW_SIGNATURE};
pub use device::{UsbBot, UsbBotConfig};
pub use error::{Result, UsbBotError};

/// Open a USB BOT transport and return it boxed for the CLI dispatch.
pub fn open_usb(
    vendor_id: u16,
    product_id: Option<u16>,
) -> std::result::Result<Box<dyn jmsflash_core::VendorTransport>, Box<dyn std::error::Error>> {
    let mut config = UsbBotConfig::new(vendor_id);
    config.product_id = product_id;
    Ok(Box::new(UsbBot::open(&config)?))
}
