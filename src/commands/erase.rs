//! Erase command implementation

use indicatif::{ProgressBar, ProgressStyle};
use jmsflash_core::{flash, VendorTransport};
use std::time::Duration;

/// Run the erase command
pub fn run_erase(
    t: &mut dyn VendorTransport,
    no_reset: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Erasing flash...");
    pb.enable_steady_tick(Duration::from_millis(100));

    flash::erase(t)?;

    pb.finish_with_message("Flash erased, chip is back on its mask-ROM firmware");

    if !no_reset {
        println!("Resetting after erase...");
        flash::reset(t)?;
    }
    Ok(())
}
