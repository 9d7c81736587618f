//! Error types shared by the protocol layer and the transport backends.

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the vendor protocol layer.
///
/// Validation errors are raised before any I/O happens; transport and
/// protocol errors abort the current operation with no internal retry.
/// Protocol errors keep the raw 13-byte status wrapper so a failure can be
/// diagnosed against a packet capture.
#[derive(Debug, Error)]
pub enum Error {
    /// SCSI CDBs are at most 16 bytes; checked before transmission.
    #[error("vendor command is {len} bytes, the CDB limit is 16")]
    CommandTooLong { len: usize },

    /// Low-level transfer failure (device gone, endpoint error, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The device returned fewer data bytes than the command requested.
    #[error("short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },

    /// Status wrapper did not carry the USBS signature.
    #[error("invalid CSW response: {}", hex::encode(raw))]
    InvalidCsw { raw: [u8; 13] },

    /// Status wrapper tag does not match the one we sent. Usually means a
    /// second process is talking to the device at the same time.
    #[error("CSW tag mismatch, multiple access to device? {}", hex::encode(raw))]
    TagMismatch { raw: [u8; 13] },

    /// The device reported command failure in the status wrapper.
    #[error("command failed with status {status:#04x}, response: {}", hex::encode(raw))]
    CommandFailed { status: u8, raw: [u8; 13] },

    /// Flash offsets must be sector aligned for write operations.
    #[error("offset {offset:#x} is not a multiple of the 0x1000-byte sector size")]
    MisalignedOffset { offset: u32 },

    /// Skipping the NVS region is only implemented for writes starting at 0.
    #[error("skip-nvs requires offset 0, got {offset:#x}")]
    SkipNvsWithOffset { offset: u32 },

    /// The request does not fit the 16-bit offset/length fields of the DF
    /// command layout.
    #[error("flash range {offset:#x}+{length:#x} exceeds the DF command address space")]
    RangeOutOfBounds { offset: u32, length: u32 },
}
