//! Motion command handlers (drive, stop, turn)

use super::HandlerContext;
use crate::command::CommandResult;
use crate::device::Device;
use anyhow::Result;
use finch_shared::{motion::TURNING_MOTOR_SPEED, Command};

/// Handle MOVE_FORWARD: both wheels forward at the configured speed
pub async fn handle_move_forward<D: Device>(ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    let speed = ctx.params.motor_speed();
    device.set_motors(speed, speed).await?;
    Ok(CommandResult::completed(Command::MoveForward))
}

/// Handle MOVE_BACKWARD: both wheels reversed at the configured speed
pub async fn handle_move_backward<D: Device>(ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    let speed = ctx.params.motor_speed();
    device.set_motors(-speed, -speed).await?;
    Ok(CommandResult::completed(Command::MoveBackward))
}

/// Handle STOP_MOTORS
pub async fn handle_stop_motors<D: Device>(_ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    device.set_motors(0, 0).await?;
    Ok(CommandResult::completed(Command::StopMotors))
}

/// Handle TURN_RIGHT
///
/// Turns always pivot at the fixed turning speed; the configured motor
/// speed only applies to straight moves.
pub async fn handle_turn_right<D: Device>(_ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    device.set_motors(TURNING_MOTOR_SPEED, -TURNING_MOTOR_SPEED).await?;
    Ok(CommandResult::completed(Command::TurnRight))
}

/// Handle TURN_LEFT
pub async fn handle_turn_left<D: Device>(_ctx: &HandlerContext<'_>, device: &mut D) -> Result<CommandResult> {
    device.set_motors(-TURNING_MOTOR_SPEED, TURNING_MOTOR_SPEED).await?;
    Ok(CommandResult::completed(Command::TurnLeft))
}
