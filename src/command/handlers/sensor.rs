//! Sensor command handlers

use super::HandlerContext;
use crate::command::CommandResult;
use crate::device::Device;
use anyhow::Result;
use finch_shared::codec::format_celsius;
use tracing::debug;

/// Handle GET_TEMPERATURE: feedback is the reading with two decimals
pub async fn handle_get_temperature<D: Device>(ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    let celsius = device.get_temperature_celsius().await?;
    debug!("[EXEC] Step {} raw temperature {}", ctx.step, celsius);

    Ok(CommandResult::Completed {
        feedback: format_celsius(celsius),
    })
}
