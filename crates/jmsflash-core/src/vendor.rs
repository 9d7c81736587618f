//! Vendor SCSI command construction.
//!
//! All layouts here are reverse-engineered from USB packet captures of the
//! vendor flashing tool. Several reserved and magic byte fields have unknown
//! meaning; they are kept as opaque constants rather than given inferred
//! semantics.

use std::fmt;

/// Flash sector size: the atomic unit of every DF flash operation.
pub const SECTOR_SIZE: usize = 0x1000;

/// Offset of the NVS partition in flash images. Bytes from here on hold
/// device-unique calibration data and are normally not overwritten.
pub const NVS_OFFSET: usize = 0xC000;

/// Length of the chip-info response.
pub const CHIP_INFO_LEN: usize = 16;

/// Sub-operations of the `0xDF` vendor opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DfOp {
    /// Program a flash sector.
    Write = 0x00,
    /// Erase the flash. Distinction from Write is not fully understood.
    Erase = 0x02,
    /// Read back a flash sector.
    Read = 0x10,
}

/// Chip-info command. The three bytes after the `0xE0` opcode are magic.
/// Expects a 16-byte response; see [`FirmwareVersion::from_chip_info`].
pub fn chip_info_command() -> [u8; 12] {
    let mut cmd = [0u8; 12];
    cmd[..4].copy_from_slice(&[0xE0, 0xF4, 0xE7, 0x00]);
    cmd
}

/// Reset command, making the chip reboot into whatever firmware is now in
/// flash (or the mask ROM after an erase). Bytes 1..5 are magic; the
/// trailing `4A 4D` spells "JM" and is presumably a vendor signature.
pub fn reset_command() -> [u8; 12] {
    let mut cmd = [0u8; 12];
    cmd[..5].copy_from_slice(&[0xFF, 0x04, 0x26, 0x4A, 0x4D]);
    cmd
}

/// Build a DF flash command.
///
/// `offset` and `length` are byte counts packed big-endian into 16-bit
/// fields. The flash engine keeps them in range by issuing at most one
/// sector per command. The two reserved fields are always zero in captures.
pub fn df_command(op: DfOp, offset: u16, length: u16) -> [u8; 12] {
    let mut cmd = [0u8; 12];
    cmd[0] = 0xDF;
    cmd[1] = op as u8;
    cmd[3..5].copy_from_slice(&length.to_be_bytes());
    cmd[9..11].copy_from_slice(&offset.to_be_bytes());
    // Trailing tag byte, 0xFA on reads and 0xFB otherwise. Meaning unknown.
    cmd[11] = if op == DfOp::Read { 0xFA } else { 0xFB };
    cmd
}

/// Firmware version, carried in the last four bytes of the chip-info
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub build: u8,
}

impl FirmwareVersion {
    /// Extract the version fields from a chip-info response.
    pub fn from_chip_info(info: &[u8; CHIP_INFO_LEN]) -> Self {
        Self {
            major: info[12],
            minor: info[13],
            patch: info[14],
            build: info[15],
        }
    }

    /// `0.0.0.1` is what the factory mask ROM reports when no firmware has
    /// been programmed to flash.
    pub fn is_mask_rom(&self) -> bool {
        (self.major, self.minor, self.patch, self.build) == (0, 0, 0, 1)
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_info_layout() {
        let cmd = chip_info_command();
        assert_eq!(cmd.len(), 0xC);
        assert_eq!(&cmd[..4], &[0xE0, 0xF4, 0xE7, 0x00]);
        assert!(cmd[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn reset_layout() {
        let cmd = reset_command();
        assert_eq!(cmd.len(), 0xC);
        assert_eq!(&cmd[..5], &[0xFF, 0x04, 0x26, 0x4A, 0x4D]);
        assert!(cmd[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn df_read_layout() {
        let cmd = df_command(DfOp::Read, 0x2000, 0x1000);
        assert_eq!(
            cmd,
            [0xDF, 0x10, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0xFA]
        );
    }

    #[test]
    fn df_write_and_erase_tag_byte() {
        assert_eq!(df_command(DfOp::Write, 0, 0x1000)[11], 0xFB);
        assert_eq!(df_command(DfOp::Erase, 0, 0x1000)[11], 0xFB);
        assert_eq!(df_command(DfOp::Write, 0, 0x1000)[1], 0x00);
        assert_eq!(df_command(DfOp::Erase, 0, 0x1000)[1], 0x02);
    }

    #[test]
    fn firmware_version_fields() {
        let mut info = [0u8; CHIP_INFO_LEN];
        info[12..].copy_from_slice(&[1, 2, 3, 4]);
        let ver = FirmwareVersion::from_chip_info(&info);
        assert_eq!(ver.to_string(), "1.2.3.4");
        assert!(!ver.is_mask_rom());
    }

    #[test]
    fn mask_rom_sentinel() {
        let mut info = [0u8; CHIP_INFO_LEN];
        info[15] = 1;
        assert!(FirmwareVersion::from_chip_info(&info).is_mask_rom());
    }
}
