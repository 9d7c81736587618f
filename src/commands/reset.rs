//! Reset command implementation

use jmsflash_core::{flash, VendorTransport};

/// Run the reset command
pub fn run_reset(t: &mut dyn VendorTransport) -> Result<(), Box<dyn std::error::Error>> {
    flash::reset(t)?;
    println!("Chip reset");
    Ok(())
}
