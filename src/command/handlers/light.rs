//! LED command handlers

use super::HandlerContext;
use crate::command::CommandResult;
use crate::device::Device;
use anyhow::Result;
use finch_shared::Command;

/// Handle LED_ON: white at the configured brightness
pub async fn handle_led_on<D: Device>(ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    let level = ctx.params.led_brightness();
    device.set_led(level, level, level).await?;
    Ok(CommandResult::completed(Command::LedOn))
}

/// Handle LED_OFF
pub async fn handle_led_off<D: Device>(_ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    device.set_led(0, 0, 0).await?;
    Ok(CommandResult::completed(Command::LedOff))
}
