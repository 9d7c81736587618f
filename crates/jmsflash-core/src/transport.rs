//! Transport abstraction for vendor SCSI commands.

use crate::error::{Error, Result};

/// Maximum length of a SCSI CDB carried by either transport.
pub const MAX_COMMAND_LEN: usize = 16;

/// A channel that carries the bridge's vendor SCSI commands.
///
/// Two backends exist: USB Mass-Storage Bulk-Only-Transport (jmsflash-usb)
/// and the Linux SCSI-generic ioctl path (jmsflash-sg). Both are fully
/// blocking; the protocol has no pipelining, so a command must complete
/// before the next one is issued. A transport owns its channel exclusively
/// for the life of the process - concurrent access from a second session
/// produces undefined behavior on the device side.
pub trait VendorTransport {
    /// Issue `cmd` with an outbound data phase of `payload` (may be empty)
    /// and wait for the device to report status.
    fn send(&mut self, cmd: &[u8], payload: &[u8]) -> Result<()>;

    /// Issue `cmd` and read exactly `len` bytes of inbound data.
    fn receive(&mut self, cmd: &[u8], len: usize) -> Result<Vec<u8>>;
}

/// Command-length precondition shared by both backends. Violations are
/// caller bugs and are rejected before anything touches the device.
pub fn check_command_len(cmd: &[u8]) -> Result<()> {
    if cmd.len() > MAX_COMMAND_LEN {
        return Err(Error::CommandTooLong { len: cmd.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_len_limit() {
        assert!(check_command_len(&[0u8; 16]).is_ok());
        assert!(check_command_len(&[]).is_ok());
        match check_command_len(&[0u8; 17]) {
            Err(Error::CommandTooLong { len: 17 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
