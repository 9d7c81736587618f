//! jmsflash - JMicron JMS567 USB-SATA bridge flashing tool
//!
//! Reads, writes, and erases the firmware flash of a JMS567 bridge
//! controller over its reverse-engineered vendor SCSI command set.
//!
//! # Architecture
//!
//! The same vendor commands travel over one of two transports, selected by
//! the `-d/--device` argument:
//! - **USB BOT** (`-d 152d:0569`) - talks to the raw bulk endpoints with
//!   Mass-Storage Bulk-Only-Transport framing, detaching the kernel driver
//! - **SCSI generic** (`-d /dev/sda`) - passes the commands through the
//!   kernel's SG_IO ioctl on the attached block device
//!
//! Command implementations only ever see the `VendorTransport` trait, so
//! they work identically over both.

mod cli;
mod commands;
mod transports;

use clap::Parser;
use cli::{Cli, Commands};
use jmsflash_core::flash;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger, verbosity raising the default filter
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut transport = transports::open_transport(&cli.device)?;
    let t = transport.as_mut();

    // The erase command may be the only one a wedged chip still accepts, so
    // skip the version preflight there and go straight to erasing.
    if !matches!(cli.command, Commands::Erase { .. }) {
        println!("Reading firmware version...");
        let version = flash::firmware_version(t)?;
        if version.is_mask_rom() {
            println!("Firmware version: {} (factory mask ROM, no flash programmed)", version);
        } else {
            println!("Firmware version: {}", version);
        }
    }

    match cli.command {
        Commands::ChipInfo => commands::run_chip_info(t)?,
        Commands::Reset => commands::run_reset(t)?,
        Commands::Erase { no_reset } => commands::run_erase(t, no_reset)?,
        Commands::Write {
            input,
            offset,
            erase,
            skip_nvs,
            no_reset,
        } => commands::run_write(t, &input, offset, erase, skip_nvs, no_reset)?,
        Commands::Read {
            output,
            offset,
            length,
        } => commands::run_read(t, &output, offset, length)?,
    }

    println!("Done");
    Ok(())
}
