//! Timing command handlers

use super::HandlerContext;
use crate::command::CommandResult;
use crate::device::{self, Device};
use crate::stop::StopSignal;
use anyhow::Result;
use finch_shared::Command;

/// Handle WAIT: the device holds for the configured number of seconds.
///
/// The wait is raced against the stop signal so a long pause can be cut
/// short.
pub async fn handle_wait<D: Device>(
    ctx: &HandlerContext<'_>,
    device: &mut D,
    stop: &mut StopSignal,
) -> Result<CommandResult> {
    match device::wait_unless_stopped(device, ctx.params.wait_ms(), stop).await? {
        Some(reason) => Ok(CommandResult::Stopped(reason)),
        None => Ok(CommandResult::completed(Command::Wait)),
    }
}
