//! Flash operations over a [`VendorTransport`].
//!
//! Everything here works in whole 4096-byte sectors: writes are padded with
//! `0xFF` up to a sector boundary and issued one sector per DF command,
//! reads are chunked the same way in strictly increasing offset order. There
//! is no partial-write recovery - sector writes simply overwrite flash
//! content, so a failed call can be retried wholesale.

use crate::error::{Error, Result};
use crate::transport::VendorTransport;
use crate::vendor::{
    self, DfOp, FirmwareVersion, CHIP_INFO_LEN, NVS_OFFSET, SECTOR_SIZE,
};

/// The DF command packs offsets into a 16-bit field, capping the reachable
/// flash address space at 64 KiB.
const MAX_FLASH_EXTENT: usize = u16::MAX as usize + 1;

/// Read the raw 16-byte chip-info block.
pub fn chip_info<T: VendorTransport + ?Sized>(t: &mut T) -> Result<[u8; CHIP_INFO_LEN]> {
    let data = t.receive(&vendor::chip_info_command(), CHIP_INFO_LEN)?;
    data.try_into().map_err(|data: Vec<u8>| Error::ShortTransfer {
        expected: CHIP_INFO_LEN,
        actual: data.len(),
    })
}

/// Read the firmware version from the chip-info block.
pub fn firmware_version<T: VendorTransport + ?Sized>(t: &mut T) -> Result<FirmwareVersion> {
    Ok(FirmwareVersion::from_chip_info(&chip_info(t)?))
}

/// Reset the chip, booting whatever firmware is currently in flash.
pub fn reset<T: VendorTransport + ?Sized>(t: &mut T) -> Result<()> {
    t.send(&vendor::reset_command(), &[])
}

/// Erase the flash, returning the chip to its mask-ROM firmware.
///
/// One DF-erase of a 0x1000-byte extent at offset 0 is enough to take out
/// the whole image. The accompanying 0xFF buffer appears in every capture of
/// the vendor tool; whether the device actually requires it is unverified,
/// so it is kept for compatibility.
pub fn erase<T: VendorTransport + ?Sized>(t: &mut T) -> Result<()> {
    let cmd = vendor::df_command(DfOp::Erase, 0, SECTOR_SIZE as u16);
    t.send(&cmd, &[0xFF; SECTOR_SIZE])
}

/// Write `data` to flash starting at `offset`.
///
/// `offset` must be sector aligned. With `skip_nvs`, `offset` must be 0 and
/// the data is truncated at the NVS boundary so device-unique calibration
/// data survives the write. The tail is padded with `0xFF` to a full sector.
/// A sector failure aborts the operation; retry the whole call.
pub fn write<T: VendorTransport + ?Sized>(
    t: &mut T,
    data: &[u8],
    offset: u32,
    skip_nvs: bool,
) -> Result<()> {
    if skip_nvs && offset != 0 {
        return Err(Error::SkipNvsWithOffset { offset });
    }
    if offset as usize % SECTOR_SIZE != 0 {
        return Err(Error::MisalignedOffset { offset });
    }

    let mut data = data.to_vec();
    if skip_nvs {
        if data.len() <= NVS_OFFSET {
            log::debug!("data ends before the NVS partition, nothing to truncate");
        } else {
            data.truncate(NVS_OFFSET);
            log::info!("truncated data to {:#x} bytes to skip the NVS region", NVS_OFFSET);
        }
    }

    let rem = data.len() % SECTOR_SIZE;
    if rem != 0 {
        let pad = SECTOR_SIZE - rem;
        log::info!("padding data by {} bytes to fill the last flash sector", pad);
        data.resize(data.len() + pad, 0xFF);
    }

    if offset as usize + data.len() > MAX_FLASH_EXTENT {
        return Err(Error::RangeOutOfBounds {
            offset,
            length: data.len() as u32,
        });
    }

    for (i, sector) in data.chunks(SECTOR_SIZE).enumerate() {
        let sector_offset = offset as usize + i * SECTOR_SIZE;
        log::info!("writing sector at offset {:#x}", sector_offset);
        let cmd = vendor::df_command(DfOp::Write, sector_offset as u16, SECTOR_SIZE as u16);
        t.send(&cmd, sector)?;
    }
    Ok(())
}

/// Read `length` bytes of flash starting at `offset`.
///
/// Chunks are issued strictly in increasing offset order, one sector (or the
/// final remainder) per DF command.
pub fn read<T: VendorTransport + ?Sized>(
    t: &mut T,
    offset: u32,
    length: usize,
) -> Result<Vec<u8>> {
    if offset as usize + length > MAX_FLASH_EXTENT {
        return Err(Error::RangeOutOfBounds {
            offset,
            length: length as u32,
        });
    }

    let mut data = vec![0u8; length];
    for (i, out) in data.chunks_mut(SECTOR_SIZE).enumerate() {
        let chunk_offset = offset as usize + i * SECTOR_SIZE;
        log::debug!("reading {:#x} bytes from offset {:#x}", out.len(), chunk_offset);
        let cmd = vendor::df_command(DfOp::Read, chunk_offset as u16, out.len() as u16);
        let chunk = t.receive(&cmd, out.len())?;
        if chunk.len() != out.len() {
            return Err(Error::ShortTransfer {
                expected: out.len(),
                actual: chunk.len(),
            });
        }
        out.copy_from_slice(&chunk);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock transport that emulates 64 KiB of flash behind the DF command
    /// set and records every command it sees.
    struct MockTransport {
        memory: Vec<u8>,
        /// (cmd, payload) of every send
        sends: Vec<(Vec<u8>, Vec<u8>)>,
        /// (cmd, requested_len) of every receive
        receives: Vec<(Vec<u8>, usize)>,
        chip_info: [u8; CHIP_INFO_LEN],
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                memory: vec![0xFF; MAX_FLASH_EXTENT],
                sends: Vec::new(),
                receives: Vec::new(),
                chip_info: [0u8; CHIP_INFO_LEN],
            }
        }

        fn with_pattern() -> Self {
            let mut mock = Self::new();
            for (i, b) in mock.memory.iter_mut().enumerate() {
                *b = (i % 251) as u8;
            }
            mock
        }

        fn df_fields(cmd: &[u8]) -> (u8, usize, usize) {
            assert_eq!(cmd[0], 0xDF);
            let length = u16::from_be_bytes([cmd[3], cmd[4]]) as usize;
            let offset = u16::from_be_bytes([cmd[9], cmd[10]]) as usize;
            (cmd[1], offset, length)
        }
    }

    impl VendorTransport for MockTransport {
        fn send(&mut self, cmd: &[u8], payload: &[u8]) -> Result<()> {
            self.sends.push((cmd.to_vec(), payload.to_vec()));
            let (op, offset, length) = Self::df_fields(cmd);
            match op {
                0x00 => {
                    assert_eq!(payload.len(), length);
                    self.memory[offset..offset + length].copy_from_slice(payload);
                }
                0x02 => self.memory.fill(0xFF),
                _ => panic!("unexpected send opcode {:#x}", op),
            }
            Ok(())
        }

        fn receive(&mut self, cmd: &[u8], len: usize) -> Result<Vec<u8>> {
            self.receives.push((cmd.to_vec(), len));
            if cmd[0] == 0xE0 {
                return Ok(self.chip_info.to_vec());
            }
            let (op, offset, length) = Self::df_fields(cmd);
            assert_eq!(op, 0x10);
            assert_eq!(length, len);
            Ok(self.memory[offset..offset + length].to_vec())
        }
    }

    #[test]
    fn write_pads_last_sector_with_ff() {
        let mut mock = MockTransport::new();
        let data = vec![0xAB; 5000];
        write(&mut mock, &data, 0, false).unwrap();

        assert_eq!(mock.sends.len(), 2);
        for (cmd, payload) in &mock.sends {
            assert_eq!(cmd[1], 0x00);
            assert_eq!(payload.len(), SECTOR_SIZE);
        }
        assert_eq!(&mock.memory[..5000], &data[..]);
        assert!(mock.memory[5000..2 * SECTOR_SIZE].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn write_chunks_in_increasing_offset_order() {
        let mut mock = MockTransport::new();
        let data = vec![0x5A; 3 * SECTOR_SIZE];
        write(&mut mock, &data, 0x4000, false).unwrap();

        let offsets: Vec<usize> = mock
            .sends
            .iter()
            .map(|(cmd, _)| MockTransport::df_fields(cmd).1)
            .collect();
        assert_eq!(offsets, vec![0x4000, 0x5000, 0x6000]);
    }

    #[test]
    fn skip_nvs_truncates_at_boundary() {
        let mut mock = MockTransport::new();
        let data: Vec<u8> = (0..0x10000u32).map(|i| (i % 199) as u8).collect();
        write(&mut mock, &data, 0, true).unwrap();

        assert_eq!(mock.sends.len(), NVS_OFFSET / SECTOR_SIZE);
        let transmitted: usize = mock.sends.iter().map(|(_, p)| p.len()).sum();
        assert_eq!(transmitted, NVS_OFFSET);
        assert_eq!(&mock.memory[..NVS_OFFSET], &data[..NVS_OFFSET]);
        // NVS region untouched (still erased)
        assert!(mock.memory[NVS_OFFSET..0x10000].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn skip_nvs_short_image_is_not_truncated() {
        let mut mock = MockTransport::new();
        let data = vec![0x11; 2 * SECTOR_SIZE];
        write(&mut mock, &data, 0, true).unwrap();
        assert_eq!(mock.sends.len(), 2);
    }

    #[test]
    fn misaligned_offset_fails_before_io() {
        let mut mock = MockTransport::new();
        match write(&mut mock, &[0u8; 16], 4097, false) {
            Err(Error::MisalignedOffset { offset: 4097 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(mock.sends.is_empty());
    }

    #[test]
    fn skip_nvs_with_offset_fails_before_io() {
        let mut mock = MockTransport::new();
        match write(&mut mock, &[0u8; 16], 4096, true) {
            Err(Error::SkipNvsWithOffset { offset: 4096 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(mock.sends.is_empty());
    }

    #[test]
    fn write_beyond_df_address_space_fails() {
        let mut mock = MockTransport::new();
        let data = vec![0u8; 2 * SECTOR_SIZE];
        assert!(matches!(
            write(&mut mock, &data, 0xF000, false),
            Err(Error::RangeOutOfBounds { .. })
        ));
        assert!(mock.sends.is_empty());
    }

    #[test]
    fn read_assembles_chunks_positionally() {
        let mut mock = MockTransport::with_pattern();
        let expected = mock.memory[0x2000..0x2000 + 0x1800].to_vec();
        let data = read(&mut mock, 0x2000, 0x1800).unwrap();
        assert_eq!(data, expected);

        // one full sector, then the 0x800 remainder, in order
        let chunks: Vec<(usize, usize)> = mock
            .receives
            .iter()
            .map(|(cmd, _)| {
                let (_, offset, length) = MockTransport::df_fields(cmd);
                (offset, length)
            })
            .collect();
        assert_eq!(chunks, vec![(0x2000, 0x1000), (0x3000, 0x800)]);
    }

    #[test]
    fn write_read_round_trip_with_padding() {
        let mut mock = MockTransport::new();
        let img: Vec<u8> = (0..5000u32).map(|i| (i % 241) as u8).collect();
        write(&mut mock, &img, 0, false).unwrap();
        let back = read(&mut mock, 0, 2 * SECTOR_SIZE).unwrap();
        assert_eq!(&back[..img.len()], &img[..]);
        assert!(back[img.len()..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn erase_sends_ff_payload() {
        let mut mock = MockTransport::new();
        mock.memory.fill(0x00);
        erase(&mut mock).unwrap();

        assert_eq!(mock.sends.len(), 1);
        let (cmd, payload) = &mock.sends[0];
        let (op, offset, length) = MockTransport::df_fields(cmd);
        assert_eq!((op, offset, length), (0x02, 0, SECTOR_SIZE));
        assert_eq!(payload.len(), SECTOR_SIZE);
        assert!(payload.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn firmware_version_reads_chip_info() {
        let mut mock = MockTransport::new();
        mock.chip_info[15] = 1;
        let ver = firmware_version(&mut mock).unwrap();
        assert!(ver.is_mask_rom());
        assert_eq!(mock.receives.len(), 1);
        assert_eq!(mock.receives[0].1, CHIP_INFO_LEN);
    }
}
