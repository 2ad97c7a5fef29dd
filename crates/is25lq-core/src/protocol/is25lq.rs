//! IS25LQ command sequences
//!
//! Stateless building blocks used by the driver. Each function issues one
//! descriptor (plus its data phase) or one well-defined sequence, and
//! returns the first transport error unchanged.
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With `is_sync` feature: blocking/synchronous
//! - Without `is_sync` feature: async

use super::{encode, Operation};
use crate::bus::{QspiBus, StatusWatch};
use crate::chip::Identification;
use crate::error::{Error, Result};
use crate::flash::{BusTimeouts, PollPolicy};
use crate::register::{FunctionRegister, StatusRegister};
use crate::spi::check_io_mode_supported;
use maybe_async::maybe_async;

/// Issue an operation that has no data phase
#[maybe_async]
pub async fn simple<B: QspiBus + ?Sized>(
    bus: &mut B,
    op: Operation,
    timeouts: &BusTimeouts,
) -> Result<()> {
    let cmd = encode(op, 0, 0);
    bus.command(&cmd, timeouts.command_ms).await
}

/// Issue an operation and clock its data phase into `buf`
///
/// The transport is not touched for the data phase if the command phase
/// fails.
#[maybe_async]
pub async fn read_into<B: QspiBus + ?Sized>(
    bus: &mut B,
    op: Operation,
    addr: u32,
    buf: &mut [u8],
    timeouts: &BusTimeouts,
) -> Result<()> {
    let cmd = encode(op, addr, buf.len());
    check_io_mode_supported(cmd.io_mode, bus.features())?;
    bus.command(&cmd, timeouts.command_ms).await?;
    bus.receive(buf, timeouts.transfer_ms).await
}

/// Read an array region, split into transfers the transport can handle
#[maybe_async]
pub async fn read_chunked<B: QspiBus + ?Sized>(
    bus: &mut B,
    op: Operation,
    addr: u32,
    buf: &mut [u8],
    timeouts: &BusTimeouts,
) -> Result<()> {
    let max_len = bus.max_transfer_len().max(1);
    let mut offset = 0;

    while offset < buf.len() {
        let chunk_len = core::cmp::min(max_len, buf.len() - offset);
        let chunk = &mut buf[offset..offset + chunk_len];
        read_into(bus, op, addr + offset as u32, chunk, timeouts).await?;
        offset += chunk_len;
    }

    Ok(())
}

/// Issue an operation and clock `data` out as its data phase
///
/// Operations without a data phase ignore `data`.
#[maybe_async]
pub async fn write_from<B: QspiBus + ?Sized>(
    bus: &mut B,
    op: Operation,
    addr: u32,
    data: &[u8],
    timeouts: &BusTimeouts,
) -> Result<()> {
    let cmd = encode(op, addr, data.len());
    bus.command(&cmd, timeouts.command_ms).await?;
    if cmd.has_write() {
        bus.transmit(data, timeouts.transfer_ms).await?;
    }
    Ok(())
}

/// Read the JEDEC manufacturer, type and capacity bytes
#[maybe_async]
pub async fn read_jedec_id<B: QspiBus + ?Sized>(
    bus: &mut B,
    timeouts: &BusTimeouts,
) -> Result<Identification> {
    let mut buf = [0u8; 3];
    read_into(bus, Operation::ReadJedecId, 0, &mut buf, timeouts).await?;
    Ok(Identification::from_bytes(buf))
}

/// Read the status register
#[maybe_async]
pub async fn read_status<B: QspiBus + ?Sized>(
    bus: &mut B,
    timeouts: &BusTimeouts,
) -> Result<StatusRegister> {
    let mut buf = [0u8; 1];
    read_into(bus, Operation::ReadStatus, 0, &mut buf, timeouts).await?;
    Ok(StatusRegister::from(buf[0]))
}

/// Read the function register
#[maybe_async]
pub async fn read_function<B: QspiBus + ?Sized>(
    bus: &mut B,
    timeouts: &BusTimeouts,
) -> Result<FunctionRegister> {
    let mut buf = [0u8; 1];
    read_into(bus, Operation::ReadFunction, 0, &mut buf, timeouts).await?;
    Ok(FunctionRegister::from(buf[0]))
}

/// Send the Write Enable command
#[maybe_async]
pub async fn write_enable<B: QspiBus + ?Sized>(bus: &mut B, timeouts: &BusTimeouts) -> Result<()> {
    simple(bus, Operation::WriteEnable, timeouts).await
}

/// Send the Write Disable command
#[maybe_async]
pub async fn write_disable<B: QspiBus + ?Sized>(bus: &mut B, timeouts: &BusTimeouts) -> Result<()> {
    simple(bus, Operation::WriteDisable, timeouts).await
}

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Polls the status register every `poll.interval_us` until the bit
/// clears, giving up with `Error::Timeout` after `poll.timeout_us`
/// whether or not the chip ever finishes.
#[maybe_async]
pub async fn wait_ready<B: QspiBus + ?Sized>(
    bus: &mut B,
    poll: PollPolicy,
    timeouts: &BusTimeouts,
) -> Result<()> {
    let max_polls = poll.max_polls();

    for _ in 0..max_polls {
        let status = read_status(bus, timeouts).await?;
        log::trace!("status 0x{:02X}", status.bits());
        if !status.is_busy() {
            return Ok(());
        }
        if poll.interval_us > 0 {
            bus.delay_us(poll.interval_us).await;
        }
    }

    Err(Error::Timeout)
}

/// Arm the transport's hardware watch on the WIP bit
///
/// The watch matches once `status & WIP == 0`.
#[maybe_async]
pub async fn arm_ready_watch<B: QspiBus + ?Sized>(bus: &mut B, interval: u16) -> Result<()> {
    let cmd = encode(Operation::ReadStatus, 0, 1);
    let watch = StatusWatch {
        mask: StatusRegister::WIP.bits(),
        match_value: 0,
        interval,
    };
    bus.watch_until_clear(&cmd, &watch).await
}

/// Send the software reset sequence
///
/// Reset Enable followed directly by Reset, with no busy poll in between.
/// If either step fails the sequence is abandoned.
#[maybe_async]
pub async fn software_reset<B: QspiBus + ?Sized>(
    bus: &mut B,
    recovery_us: u32,
    timeouts: &BusTimeouts,
) -> Result<()> {
    simple(bus, Operation::ResetEnable, timeouts).await?;
    simple(bus, Operation::Reset, timeouts).await?;
    if recovery_us > 0 {
        bus.delay_us(recovery_us).await;
    }
    Ok(())
}
