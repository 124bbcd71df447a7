//! Command executor - replays a script against the device

use super::handlers::{self, HandlerContext};
use crate::device::Device;
use crate::stop::{StopReason, StopSignal};
use finch_shared::{Command, CommandParameters, CommandScript, StepResult};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of handling a single command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Command ran; feedback is reported for the step
    Completed { feedback: String },
    /// Command has nothing to do and reports nothing
    Skipped,
    /// A stop request interrupted the command
    Stopped(StopReason),
}

impl CommandResult {
    /// Completed with the command's own label as feedback
    pub fn completed(command: Command) -> Self {
        CommandResult::Completed {
            feedback: command.to_string(),
        }
    }
}

/// Why a script run ended before its last command.
///
/// Both variants carry the feedback of every step that finished before the
/// run ended. Step numbers are 1-based.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Device fault at step {step} ({command}): {source}")]
    DeviceFault {
        step: usize,
        command: Command,
        completed: Vec<StepResult>,
        #[source]
        source: anyhow::Error,
    },

    #[error("Execution stopped at step {step}: {reason}")]
    Stopped {
        step: usize,
        reason: StopReason,
        completed: Vec<StepResult>,
    },
}

impl ExecutionError {
    /// Feedback of the steps that finished before the failure
    pub fn completed(&self) -> &[StepResult] {
        match self {
            ExecutionError::DeviceFault { completed, .. } => completed,
            ExecutionError::Stopped { completed, .. } => completed,
        }
    }
}

/// Replays command scripts on a device it holds exclusively for the run
pub struct CommandExecutor<'a, D: Device> {
    device: &'a mut D,
    stop: StopSignal,
}

impl<'a, D: Device> CommandExecutor<'a, D> {
    /// Create a new command executor
    pub fn new(device: &'a mut D, stop: StopSignal) -> Self {
        Self { device, stop }
    }

    /// Execute every command in order and return one result per non-`None` command
    pub async fn execute(
        &mut self,
        script: &CommandScript,
        params: &CommandParameters,
    ) -> Result<Vec<StepResult>, ExecutionError> {
        let start_time = Instant::now();
        info!(
            "[EXEC] Executing {} command(s) on {} ({})",
            script.len(),
            self.device.name(),
            params
        );

        let mut results = Vec::with_capacity(script.executable_len());

        for (index, command) in script.iter().copied().enumerate() {
            let step = index + 1;

            if let Some(reason) = self.stop.check() {
                warn!("[EXEC] Stopped before step {}: {}", step, reason);
                return Err(ExecutionError::Stopped {
                    step,
                    reason,
                    completed: results,
                });
            }

            let ctx = HandlerContext { step, params };

            let result = match self.dispatch(&ctx, command).await {
                Ok(result) => result,
                Err(source) => {
                    error!("[EXEC] Step {} ({}) failed: {}", step, command, source);
                    return Err(ExecutionError::DeviceFault {
                        step,
                        command,
                        completed: results,
                        source,
                    });
                }
            };

            match result {
                CommandResult::Completed { feedback } => {
                    info!("[EXEC] {:>3}. {}", step, feedback);
                    results.push(StepResult::new(command, feedback));
                }
                CommandResult::Skipped => {
                    debug!("[EXEC] {:>3}. skipped ({})", step, command);
                }
                CommandResult::Stopped(reason) => {
                    warn!("[EXEC] Stopped during step {} ({}): {}", step, command, reason);
                    return Err(ExecutionError::Stopped {
                        step,
                        reason,
                        completed: results,
                    });
                }
            }
        }

        info!(
            "[EXEC] Script complete: {} step(s) in {:?}",
            results.len(),
            start_time.elapsed()
        );
        Ok(results)
    }

    /// Dispatch a command to its handler
    async fn dispatch(&mut self, ctx: &HandlerContext<'_>, command: Command) -> anyhow::Result<CommandResult> {
        let device = &mut *self.device;

        match command {
            Command::None => Ok(CommandResult::Skipped),
            Command::MoveForward => handlers::handle_move_forward(ctx, device).await,
            Command::MoveBackward => handlers::handle_move_backward(ctx, device).await,
            Command::StopMotors => handlers::handle_stop_motors(ctx, device).await,
            Command::Wait => handlers::handle_wait(ctx, device, &mut self.stop).await,
            Command::TurnRight => handlers::handle_turn_right(ctx, device).await,
            Command::TurnLeft => handlers::handle_turn_left(ctx, device).await,
            Command::LedOn => handlers::handle_led_on(ctx, device).await,
            Command::LedOff => handlers::handle_led_off(ctx, device).await,
            Command::GetTemperature => handlers::handle_get_temperature(ctx, device).await,
            Command::Done => Ok(CommandResult::completed(Command::Done)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{DeviceCall, MockDevice};
    use finch_shared::codec::parse_script;

    fn params(motor_speed: i32) -> CommandParameters {
        CommandParameters::new(motor_speed, 200, 1.5).unwrap()
    }

    async fn run(device: &mut MockDevice, script: &str, params: &CommandParameters) -> Result<Vec<StepResult>, ExecutionError> {
        let script = parse_script(script).unwrap();
        CommandExecutor::new(device, StopSignal::never())
            .execute(&script, params)
            .await
    }

    #[tokio::test]
    async fn test_one_result_per_non_none_command() {
        let mut device = MockDevice::new();
        let results = run(&mut device, "none, ledon, none, stopmotors, ledoff, done", &params(100))
            .await
            .unwrap();

        let commands: Vec<Command> = results.iter().map(|r| r.command).collect();
        assert_eq!(
            commands,
            vec![Command::LedOn, Command::StopMotors, Command::LedOff, Command::Done]
        );
        let feedback: Vec<&str> = results.iter().map(|r| r.feedback.as_str()).collect();
        assert_eq!(feedback, vec!["LedOn", "StopMotors", "LedOff", "Done"]);
    }

    #[tokio::test]
    async fn test_none_only_script_touches_nothing() {
        let mut device = MockDevice::new();
        let results = run(&mut device, "none none none", &params(100)).await.unwrap();
        assert!(results.is_empty());
        assert!(device.calls.is_empty());
    }

    #[tokio::test]
    async fn test_forward_then_backward() {
        let mut device = MockDevice::new();
        run(&mut device, "moveforward, movebackward", &params(150)).await.unwrap();
        assert_eq!(
            device.calls,
            vec![DeviceCall::Motors(150, 150), DeviceCall::Motors(-150, -150)]
        );
    }

    #[tokio::test]
    async fn test_turns_ignore_motor_speed() {
        for speed in [1, 150, 255] {
            let mut device = MockDevice::new();
            run(&mut device, "turnright, turnleft", &params(speed)).await.unwrap();
            assert_eq!(
                device.calls,
                vec![DeviceCall::Motors(100, -100), DeviceCall::Motors(-100, 100)]
            );
        }
    }

    #[tokio::test]
    async fn test_light_wait_and_done_translation() {
        let mut device = MockDevice::new();
        let params = CommandParameters::new(50, 180, 2.25).unwrap();
        let results = run(&mut device, "ledon, wait, ledoff, stopmotors, done", &params)
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(
            device.calls,
            vec![
                DeviceCall::Led(180, 180, 180),
                DeviceCall::Wait(2250),
                DeviceCall::Led(0, 0, 0),
                DeviceCall::Motors(0, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_temperature_feedback_has_two_decimals() {
        let mut device = MockDevice::new().with_temperatures(vec![21.0, 23.456, 18.1234]);
        let results = run(&mut device, "gettemperature gettemperature gettemperature", &params(100))
            .await
            .unwrap();

        let feedback: Vec<&str> = results.iter().map(|r| r.feedback.as_str()).collect();
        assert_eq!(feedback, vec!["21.00", "23.46", "18.12"]);
        assert_eq!(device.count(&DeviceCall::Temperature), 3);
    }

    #[tokio::test]
    async fn test_device_fault_aborts_run() {
        let mut device = MockDevice::new().failing_at(1);
        let err = run(&mut device, "moveforward, turnleft, ledon, done", &params(100))
            .await
            .unwrap_err();

        match &err {
            ExecutionError::DeviceFault { step, command, completed, .. } => {
                assert_eq!(*step, 2);
                assert_eq!(*command, Command::TurnLeft);
                assert_eq!(completed, &vec![StepResult::new(Command::MoveForward, "MoveForward")]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Nothing after the failing call
        assert_eq!(device.calls.len(), 2);
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let mut device = MockDevice::new();
        let (handle, stop) = StopSignal::new();
        handle.stop();

        let script = parse_script("moveforward, done").unwrap();
        let err = CommandExecutor::new(&mut device, stop)
            .execute(&script, &params(100))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::Stopped { step: 1, reason: StopReason::Cancelled, .. }
        ));
        assert!(err.completed().is_empty());
        assert!(device.calls.is_empty());
    }

    #[tokio::test]
    async fn test_stop_during_wait() {
        let mut device = MockDevice::new().with_blocking_waits();
        let (handle, stop) = StopSignal::new();
        let script = parse_script("ledon, wait, ledoff").unwrap();
        let params = params(100);

        let mut executor = CommandExecutor::new(&mut device, stop);
        let (result, _) = tokio::join!(executor.execute(&script, &params), async {
            tokio::task::yield_now().await;
            handle.stop();
        });

        let err = result.unwrap_err();
        assert!(matches!(err, ExecutionError::Stopped { step: 2, .. }));
        assert_eq!(err.completed(), &[StepResult::new(Command::LedOn, "LedOn")]);
        drop(executor);
        assert_eq!(device.calls, vec![DeviceCall::Led(200, 200, 200), DeviceCall::Wait(1500)]);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_stops_run() {
        let mut device = MockDevice::new();
        let stop = StopSignal::never().with_deadline(Instant::now());
        let script = parse_script("moveforward").unwrap();

        let err = CommandExecutor::new(&mut device, stop)
            .execute(&script, &params(100))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Stopped { reason: StopReason::DeadlineElapsed, .. }
        ));
    }
}
