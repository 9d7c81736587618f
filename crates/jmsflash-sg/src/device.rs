//! SCSI-generic device implementation.
//!
//! Wraps the `SG_IO` ioctl so an attached block device can carry the vendor
//! commands without detaching the kernel driver.

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::ptr;

use jmsflash_core::error::{Error as CoreError, Result as CoreResult};
use jmsflash_core::transport::{check_command_len, VendorTransport};

use crate::error::{Result, SgError};

/// SG_IO ioctl number. Predates the _IOC encoding scheme, so it is a plain
/// constant in the kernel headers.
const SG_IO: libc::c_ulong = 0x2285;

// Data transfer directions for sg_io_hdr.dxfer_direction
const SG_DXFER_NONE: libc::c_int = -1;
const SG_DXFER_TO_DEV: libc::c_int = -2;
const SG_DXFER_FROM_DEV: libc::c_int = -3;

/// Command timeout in milliseconds, matching the 1000 ms the vendor tooling
/// uses on this path.
const SG_TIMEOUT_MS: u32 = 1000;

/// Sense buffer size. 32 bytes is enough for fixed-format sense data.
const SENSE_BUF_LEN: usize = 32;

// sg_io_hdr.info bits
const SG_INFO_OK_MASK: u32 = 0x1;
const SG_INFO_OK: u32 = 0x0;

/// SCSI generic I/O header for the SG_IO ioctl.
/// This must match the kernel's struct sg_io_hdr layout.
#[repr(C)]
struct SgIoHdr {
    interface_id: libc::c_int,      // int interface_id, always 'S'
    dxfer_direction: libc::c_int,   // int dxfer_direction
    cmd_len: u8,                    // unsigned char cmd_len
    mx_sb_len: u8,                  // unsigned char mx_sb_len
    iovec_count: u16,               // unsigned short iovec_count
    dxfer_len: u32,                 // unsigned int dxfer_len
    dxferp: *mut libc::c_void,      // void *dxferp
    cmdp: *const u8,                // unsigned char *cmdp
    sbp: *mut u8,                   // unsigned char *sbp
    timeout: u32,                   // unsigned int timeout (ms)
    flags: u32,                     // unsigned int flags
    pack_id: libc::c_int,           // int pack_id
    usr_ptr: *mut libc::c_void,     // void *usr_ptr
    status: u8,                     // unsigned char status
    masked_status: u8,              // unsigned char masked_status
    msg_status: u8,                 // unsigned char msg_status
    sb_len_wr: u8,                  // unsigned char sb_len_wr
    host_status: u16,               // unsigned short host_status
    driver_status: u16,             // unsigned short driver_status
    resid: libc::c_int,             // int resid
    duration: u32,                  // unsigned int duration (ms)
    info: u32,                      // unsigned int info
}

/// SCSI-generic passthrough session on a block device.
///
/// Exclusively owned for the process lifetime; the kernel does not stop a
/// second process from opening the same node, so keep other tooling away
/// from the device while flashing.
pub struct SgDevice {
    file: File,
    path: String,
}

impl SgDevice {
    /// Open a block device for passthrough access.
    ///
    /// Needs read-write access: the kernel only whitelists a handful of
    /// read-only SCSI opcodes, and the vendor commands are not among them.
    pub fn open(path: &str) -> Result<Self> {
        log::debug!("sg: opening block device {}", path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| SgError::OpenFailed {
                path: path.to_string(),
                source: e,
            })?;

        log::info!("sg: opened {}", path);
        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    /// Issue one SCSI command through SG_IO.
    ///
    /// `data` is the outbound payload for `SG_DXFER_TO_DEV`, the inbound
    /// buffer for `SG_DXFER_FROM_DEV`, and ignored for `SG_DXFER_NONE`.
    fn sg_io(&mut self, cmd: &[u8], direction: libc::c_int, data: &mut [u8]) -> CoreResult<()> {
        let mut sense = [0u8; SENSE_BUF_LEN];

        let mut hdr = SgIoHdr {
            interface_id: 'S' as libc::c_int,
            dxfer_direction: direction,
            cmd_len: cmd.len() as u8,
            mx_sb_len: SENSE_BUF_LEN as u8,
            iovec_count: 0,
            dxfer_len: data.len() as u32,
            dxferp: if data.is_empty() {
                ptr::null_mut()
            } else {
                data.as_mut_ptr() as *mut libc::c_void
            },
            cmdp: cmd.as_ptr(),
            sbp: sense.as_mut_ptr(),
            timeout: SG_TIMEOUT_MS,
            flags: 0,
            pack_id: 0,
            usr_ptr: ptr::null_mut(),
            status: 0,
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        };

        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), SG_IO, &mut hdr) };
        if ret < 0 {
            return Err(CoreError::Transport(format!(
                "SG_IO ioctl on {} failed: {}",
                self.path,
                std::io::Error::last_os_error()
            )));
        }

        if hdr.info & SG_INFO_OK_MASK != SG_INFO_OK {
            let sense_len = hdr.sb_len_wr as usize;
            return Err(CoreError::Transport(format!(
                "SCSI command failed: status {:#04x}, host {:#06x}, driver {:#06x}, sense {}",
                hdr.status,
                hdr.host_status,
                hdr.driver_status,
                hex::encode(&sense[..sense_len])
            )));
        }

        if hdr.resid != 0 {
            log::warn!("{} bytes of data residue reported", hdr.resid);
        }

        Ok(())
    }
}

impl VendorTransport for SgDevice {
    fn send(&mut self, cmd: &[u8], payload: &[u8]) -> CoreResult<()> {
        check_command_len(cmd)?;
        if payload.is_empty() {
            self.sg_io(cmd, SG_DXFER_NONE, &mut [])
        } else {
            // The kernel only reads the buffer on the TO_DEV path
            let mut buf = payload.to_vec();
            self.sg_io(cmd, SG_DXFER_TO_DEV, &mut buf)
        }
    }

    fn receive(&mut self, cmd: &[u8], len: usize) -> CoreResult<Vec<u8>> {
        check_command_len(cmd)?;
        let mut buf = vec![0u8; len];
        let direction = if len > 0 {
            SG_DXFER_FROM_DEV
        } else {
            SG_DXFER_NONE
        };
        self.sg_io(cmd, direction, &mut buf)?;
        Ok(buf)
    }
}
