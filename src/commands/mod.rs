//! CLI command implementations
//!
//! Each command works against a boxed [`jmsflash_core::VendorTransport`],
//! so the same implementations serve the USB BOT and SCSI-generic backends.

mod erase;
mod info;
mod read;
mod reset;
mod write;

pub use erase::run_erase;
pub use info::run_chip_info;
pub use read::run_read;
pub use reset::run_reset;
pub use write::run_write;
