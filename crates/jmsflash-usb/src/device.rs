//! USB device handling for the JMS567 BOT transport.

use std::time::Duration;

use nusb::transfer::{Buffer, Bulk, In, Out};
use nusb::{Endpoint, Interface, MaybeFuture};

use jmsflash_core::error::{Error as CoreError, Result as CoreResult};
use jmsflash_core::transport::{check_command_len, VendorTransport};

use crate::bot::{build_cbw, Csw, CSW_LEN};
use crate::error::{Result, UsbBotError};

/// Bulk OUT endpoint address, fixed on the JMS567 per packet captures.
const BULK_OUT_EP: u8 = 0x02;
/// Bulk IN endpoint address.
const BULK_IN_EP: u8 = 0x81;

/// USB Mass Storage class / BOT protocol identifiers.
const MSC_CLASS: u8 = 0x08;
const BOT_PROTOCOL: u8 = 0x50;

/// Per-transfer timeout. The BOT path relies on the USB stack default
/// rather than a protocol-mandated value.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for opening a JMS567 over USB.
#[derive(Debug, Clone)]
pub struct UsbBotConfig {
    /// USB vendor ID to search for (0x152D for JMicron)
    pub vendor_id: u16,
    /// Product ID; any product of the vendor matches when `None`
    pub product_id: Option<u16>,
}

impl UsbBotConfig {
    /// Match any product of `vendor_id`.
    pub fn new(vendor_id: u16) -> Self {
        Self {
            vendor_id,
            product_id: None,
        }
    }
}

/// USB Bulk-Only-Transport session with a JMS567.
///
/// Owns the claimed Mass Storage interface and both bulk endpoints for the
/// life of the process. Claiming the interface detaches the kernel's
/// usb-storage/uas driver, which is what makes the vendor commands reachable
/// even on a UAS firmware.
pub struct UsbBot {
    _interface: Interface,
    ep_out: Endpoint<Bulk, Out>,
    ep_in: Endpoint<Bulk, In>,
}

impl UsbBot {
    /// Find and open the first device matching `config`.
    pub fn open(config: &UsbBotConfig) -> Result<Self> {
        let device_info = nusb::list_devices()
            .wait()
            .map_err(|e| UsbBotError::OpenFailed(e.to_string()))?
            .find(|d| {
                d.vendor_id() == config.vendor_id
                    && config.product_id.is_none_or(|pid| d.product_id() == pid)
            })
            .ok_or(UsbBotError::DeviceNotFound {
                vid: config.vendor_id,
                pid: config.product_id,
            })?;

        log::info!(
            "Opening JMS567 at bus {} address {} (VID={:04x} PID={:04x})",
            device_info.busnum(),
            device_info.device_address(),
            device_info.vendor_id(),
            device_info.product_id()
        );

        // Locate the MSC BOT interface. It is probably the first one, but
        // it cannot hurt to check.
        let interface_number = device_info
            .interfaces()
            .find(|i| i.class() == MSC_CLASS && i.protocol() == BOT_PROTOCOL)
            .map(|i| i.interface_number())
            .ok_or(UsbBotError::NoBotInterface)?;

        log::debug!("Found USB MSC BOT interface {}", interface_number);

        let device = device_info
            .open()
            .wait()
            .map_err(|e| UsbBotError::OpenFailed(e.to_string()))?;

        // The kernel's usb-storage (or uas) driver holds the interface;
        // detach it for the duration of the session.
        let interface = device
            .detach_and_claim_interface(interface_number)
            .wait()
            .map_err(|e| UsbBotError::ClaimFailed {
                interface: interface_number,
                msg: e.to_string(),
            })?;

        let ep_out: Endpoint<Bulk, Out> =
            interface
                .endpoint(BULK_OUT_EP)
                .map_err(|e| UsbBotError::EndpointUnavailable {
                    address: BULK_OUT_EP,
                    msg: e.to_string(),
                })?;

        let ep_in: Endpoint<Bulk, In> =
            interface
                .endpoint(BULK_IN_EP)
                .map_err(|e| UsbBotError::EndpointUnavailable {
                    address: BULK_IN_EP,
                    msg: e.to_string(),
                })?;

        Ok(Self {
            _interface: interface,
            ep_out,
            ep_in,
        })
    }

    /// Write `data` to the OUT endpoint as a single bulk transfer.
    fn bulk_out(&mut self, data: &[u8]) -> CoreResult<()> {
        let mut buf = Buffer::new(data.len());
        buf.extend_from_slice(data);
        self.ep_out.submit(buf);

        let completion = match self.ep_out.wait_next_complete(TRANSFER_TIMEOUT) {
            Some(c) => c,
            None => {
                self.ep_out.cancel_all();
                while self.ep_out.pending() > 0 {
                    let _ = self.ep_out.wait_next_complete(Duration::from_secs(1));
                }
                return Err(CoreError::Transport("bulk OUT transfer timed out".into()));
            }
        };
        completion
            .status
            .map_err(|e| CoreError::Transport(format!("bulk OUT transfer failed: {:?}", e)))?;
        if completion.actual_len != data.len() {
            return Err(CoreError::ShortTransfer {
                expected: data.len(),
                actual: completion.actual_len,
            });
        }
        Ok(())
    }

    /// Read exactly `len` bytes from the IN endpoint.
    fn bulk_in(&mut self, len: usize) -> CoreResult<Vec<u8>> {
        let max_packet_size = self.ep_in.max_packet_size();
        // IN requests must be a whole number of packets
        let request_len = len.div_ceil(max_packet_size) * max_packet_size;
        let mut buf = Buffer::new(request_len);
        buf.set_requested_len(request_len);
        self.ep_in.submit(buf);

        let completion = match self.ep_in.wait_next_complete(TRANSFER_TIMEOUT) {
            Some(c) => c,
            None => {
                self.ep_in.cancel_all();
                while self.ep_in.pending() > 0 {
                    let _ = self.ep_in.wait_next_complete(Duration::from_secs(1));
                }
                return Err(CoreError::Transport("bulk IN transfer timed out".into()));
            }
        };
        completion
            .status
            .map_err(|e| CoreError::Transport(format!("bulk IN transfer failed: {:?}", e)))?;
        if completion.actual_len < len {
            return Err(CoreError::ShortTransfer {
                expected: len,
                actual: completion.actual_len,
            });
        }
        Ok(completion.buffer[..len].to_vec())
    }

    /// Read and validate the Command Status Wrapper that ends an operation.
    fn read_csw(&mut self) -> CoreResult<()> {
        let raw = self.bulk_in(CSW_LEN)?;
        let mut bytes = [0u8; CSW_LEN];
        bytes.copy_from_slice(&raw);
        Csw::parse(bytes).validate()
    }
}

impl VendorTransport for UsbBot {
    fn send(&mut self, cmd: &[u8], payload: &[u8]) -> CoreResult<()> {
        check_command_len(cmd)?;
        let cbw = build_cbw(cmd, payload.len() as u32, false)?;
        self.bulk_out(&cbw)?;
        if !payload.is_empty() {
            self.bulk_out(payload)?;
        }
        self.read_csw()
    }

    fn receive(&mut self, cmd: &[u8], len: usize) -> CoreResult<Vec<u8>> {
        check_command_len(cmd)?;
        let cbw = build_cbw(cmd, len as u32, true)?;
        self.bulk_out(&cbw)?;
        let data = if len > 0 {
            self.bulk_in(len)?
        } else {
            Vec::new()
        };
        self.read_csw()?;
        Ok(data)
    }
}
