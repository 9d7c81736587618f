//! Device specification parsing and transport dispatch.
//!
//! A device spec containing a colon is a USB `VID:PID` pair (PID optional)
//! and selects the Bulk-Only-Transport backend; anything else is treated as
//! a block device path and goes through the SCSI-generic backend.

use jmsflash_core::VendorTransport;

/// Open the transport named by `spec`.
pub fn open_transport(
    spec: &str,
) -> Result<Box<dyn VendorTransport>, Box<dyn std::error::Error>> {
    match spec.split_once(':') {
        Some((vid, pid)) => {
            if vid.is_empty() {
                return Err("USB VID must be provided, e.g. '-d 152d:'".into());
            }
            let vid = u16::from_str_radix(vid, 16)
                .map_err(|e| format!("Invalid USB VID '{}': {}", vid, e))?;
            let pid = if pid.is_empty() {
                None
            } else {
                Some(
                    u16::from_str_radix(pid, 16)
                        .map_err(|e| format!("Invalid USB PID '{}': {}", pid, e))?,
                )
            };
            log::debug!("device spec {:?} selects the USB BOT transport", spec);
            jmsflash_usb::open_usb(vid, pid)
        }
        None => {
            log::debug!("device spec {:?} selects the SCSI-generic transport", spec);
            println!("Opening block device {}...", spec);
            jmsflash_sg::open_sg(spec)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vid_is_rejected() {
        assert!(open_transport(":0569").is_err());
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(open_transport("zzzz:").is_err());
        assert!(open_transport("152d:zz").is_err());
    }
}
