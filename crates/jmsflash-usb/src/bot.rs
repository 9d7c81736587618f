//! Bulk-Only-Transport framing: CBW construction and CSW validation.
//!
//! Layouts follow the USB Mass Storage BOT specification; every multi-byte
//! field is little-endian.

use jmsflash_core::error::{Error, Result};
use jmsflash_core::transport::check_command_len;

/// `dCBWSignature`, spells "USBC".
pub const CBW_SIGNATURE: u32 = 0x43425355;
/// `dCSWSignature`, spells "USBS".
pub const CSW_SIGNATURE: u32 = 0x53425355;
/// A Command Block Wrapper is always exactly 31 bytes.
pub const CBW_LEN: usize = 31;
/// A Command Status Wrapper is always exactly 13 bytes.
pub const CSW_LEN: usize = 13;

/// Tag stamped into every CBW and matched against the CSW. The value is
/// arbitrary ("JMS1"); a mismatch on the way back means someone else is
/// talking to the device.
pub const CBW_TAG: u32 = 0x4A4D5331;

/// Build the 31-byte Command Block Wrapper for `cmd`.
///
/// `data_len` is the length of the data phase that follows; `direction_in`
/// selects the device-to-host flag for that phase. The command block is
/// zero-padded to 16 bytes.
pub fn build_cbw(cmd: &[u8], data_len: u32, direction_in: bool) -> Result<[u8; CBW_LEN]> {
    check_command_len(cmd)?;

    let mut cbw = [0u8; CBW_LEN];
    cbw[0..4].copy_from_slice(&CBW_SIGNATURE.to_le_bytes());
    cbw[4..8].copy_from_slice(&CBW_TAG.to_le_bytes());
    cbw[8..12].copy_from_slice(&data_len.to_le_bytes());
    cbw[12] = if direction_in { 0x80 } else { 0x00 };
    cbw[13] = 0; // bCBWLUN, always zero
    cbw[14] = cmd.len() as u8;
    cbw[15..15 + cmd.len()].copy_from_slice(cmd);
    Ok(cbw)
}

/// Parsed Command Status Wrapper.
#[derive(Debug, Clone, Copy)]
pub struct Csw {
    pub signature: u32,
    pub tag: u32,
    pub data_residue: u32,
    pub status: u8,
    raw: [u8; CSW_LEN],
}

impl Csw {
    /// Unpack a raw 13-byte status wrapper.
    pub fn parse(raw: [u8; CSW_LEN]) -> Self {
        Self {
            signature: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            tag: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
            data_residue: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
            status: raw[12],
            raw,
        }
    }

    /// Validate the wrapper against the CBW we sent.
    ///
    /// Checked in order: signature, tag, residue, status. A non-zero residue
    /// is only logged - the device regularly reports residue on vendor
    /// commands that still succeeded.
    pub fn validate(&self) -> Result<()> {
        if self.signature != CSW_SIGNATURE {
            return Err(Error::InvalidCsw { raw: self.raw });
        }
        if self.tag != CBW_TAG {
            return Err(Error::TagMismatch { raw: self.raw });
        }
        if self.data_residue != 0 {
            log::warn!("{} bytes of data residue reported", self.data_residue);
        }
        if self.status != 0 {
            return Err(Error::CommandFailed {
                status: self.status,
                raw: self.raw,
            });
        }
        Ok(())
    }
}
