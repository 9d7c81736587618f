//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "jmsflash")]
#[command(author, version, about = "JMicron JMS567 USB-SATA bridge flashing tool", long_about = None)]
pub struct Cli {
    /// Device to connect to: a USB VID:PID pair in hex (e.g. 152d:0569,
    /// PID optional as in "152d:") or a block device path (e.g. /dev/sda)
    #[arg(short, long)]
    pub device: String,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect and print chip information
    ChipInfo,

    /// Reset the chip and run any newly written firmware
    Reset,

    /// Erase the flash, returning the chip to its mask-ROM firmware
    Erase {
        /// Don't reset the chip after erasing
        #[arg(long)]
        no_reset: bool,
    },

    /// Write a firmware image to flash
    Write {
        /// Image file to write
        input: PathBuf,

        /// Flash offset to write to (hex or decimal, must be sector aligned)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Erase the whole flash first
        #[arg(short, long)]
        erase: bool,

        /// Don't write the NVS region from the image to flash
        #[arg(long)]
        skip_nvs: bool,

        /// Don't reset the chip after writing
        #[arg(long)]
        no_reset: bool,
    },

    /// Read flash contents to a file
    Read {
        /// Output file
        output: PathBuf,

        /// Flash offset to read from (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Number of bytes to read (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0x10000")]
        length: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_decimal_values() {
        assert_eq!(parse_hex_u32("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_u32("4096").unwrap(), 4096);
        assert!(parse_hex_u32("0xZZ").is_err());
    }
}
