//! Device Module
//!
//! The capability interface the control layers drive, plus the connection
//! lifecycle helpers and a dry-run implementation.

mod dry_run;
#[cfg(test)]
pub mod mock;
mod traits;

pub use dry_run::{DryRunConfig, DryRunDevice};
pub use traits::Device;

use crate::stop::{StopReason, StopSignal};
use anyhow::{bail, Result};
use tracing::info;

/// Connect to the robot and bring it to rest (LED off, tone off)
pub async fn connect_device<D: Device>(device: &mut D) -> Result<()> {
    if !device.connect().await? {
        bail!("{} did not respond to connect", device.name());
    }

    device.set_led(0, 0, 0).await?;
    device.tone_off().await?;

    info!("[DEVICE] {} ready", device.name());
    Ok(())
}

/// Let the device wait, unless the stop signal fires first.
///
/// Returns the stop reason when the wait was cut short. A signal that has
/// already fired wins over a wait that would complete immediately.
pub async fn wait_unless_stopped<D: Device>(
    device: &mut D,
    milliseconds: u64,
    stop: &mut StopSignal,
) -> Result<Option<StopReason>> {
    tokio::select! {
        biased;
        reason = stop.stopped() => Ok(Some(reason)),
        result = device.wait(milliseconds) => result.map(|_| None),
    }
}

/// Release the link to the robot
pub async fn disconnect_device<D: Device>(device: &mut D) -> Result<()> {
    device.disconnect().await?;
    info!("[DEVICE] {} released", device.name());
    Ok(())
}
