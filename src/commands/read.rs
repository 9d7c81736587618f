//! Read command implementation

use indicatif::{ProgressBar, ProgressStyle};
use jmsflash_core::vendor::SECTOR_SIZE;
use jmsflash_core::{flash, VendorTransport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run the read command
pub fn run_read(
    t: &mut dyn VendorTransport,
    output: &Path,
    offset: u32,
    length: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = length as usize;
    let mut data = Vec::with_capacity(total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    // One sector per engine call so the bar moves per command issued
    let mut done = 0usize;
    while done < total {
        let chunk_size = std::cmp::min(SECTOR_SIZE, total - done);
        let chunk = flash::read(t, offset + done as u32, chunk_size)?;
        data.extend_from_slice(&chunk);
        done += chunk_size;
        pb.set_position(done as u64);
    }

    pb.finish_with_message("Read complete");

    let mut file = File::create(output)?;
    file.write_all(&data)?;
    println!("Wrote {} bytes to {:?}", data.len(), output);

    Ok(())
}
