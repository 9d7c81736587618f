//! Chip-info command implementation

use jmsflash_core::vendor::FirmwareVersion;
use jmsflash_core::{flash, VendorTransport};

/// Run the chip-info command
pub fn run_chip_info(t: &mut dyn VendorTransport) -> Result<(), Box<dyn std::error::Error>> {
    let info = flash::chip_info(t)?;
    println!("Chip info: {}", hex::encode(info));

    let version = FirmwareVersion::from_chip_info(&info);
    if version.is_mask_rom() {
        println!("Firmware version: {} (factory mask ROM, no flash programmed)", version);
    } else {
        println!("Firmware version: {}", version);
    }
    Ok(())
}
