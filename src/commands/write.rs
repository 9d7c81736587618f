//! Write command implementation

use indicatif::{ProgressBar, ProgressStyle};
use jmsflash_core::{flash, VendorTransport};
use std::path::Path;
use std::time::Duration;

/// Run the write command
pub fn run_write(
    t: &mut dyn VendorTransport,
    input: &Path,
    offset: u32,
    erase: bool,
    skip_nvs: bool,
    no_reset: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    println!("Read {} bytes from {:?}", data.len(), input);

    if erase {
        println!("Erasing whole flash first...");
        flash::erase(t)?;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Writing {} bytes at offset {:#x}...", data.len(), offset));
    pb.enable_steady_tick(Duration::from_millis(100));

    flash::write(t, &data, offset, skip_nvs)?;

    pb.finish_with_message("Write complete");

    if !no_reset {
        println!("Resetting after write...");
        flash::reset(t)?;
    }
    Ok(())
}
