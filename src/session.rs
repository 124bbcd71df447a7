//! Operator session
//!
//! Holds what the operator has configured so far: the authored script, its
//! parameter set, the alarm and recorder configurations. Each piece is set
//! independently and runs refuse to start until the pieces they need exist.

use crate::alarm::{AlarmMonitor, MonitorError};
use crate::command::{CommandExecutor, ExecutionError};
use crate::device::Device;
use crate::recorder::{DataRecorder, RecorderError};
use crate::stop::StopSignal;
use finch_shared::{
    AlarmConfig, AlarmOutcome, CommandParameters, CommandScript, RecorderConfig, StepResult,
    TemperatureReading,
};
use thiserror::Error;

/// Errors raised by session runs
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0} not configured")]
    Unconfigured(&'static str),

    #[error("Script has no commands")]
    EmptyScript,

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

/// Configuration state carried between operator actions
#[derive(Debug, Clone, Default)]
pub struct Session {
    script: CommandScript,
    parameters: Option<CommandParameters>,
    alarm: Option<AlarmConfig>,
    recorder: Option<RecorderConfig>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self) -> &CommandScript {
        &self.script
    }

    /// Replace the script; parameters are kept
    pub fn set_script(&mut self, script: CommandScript) {
        self.script = script;
    }

    /// Replace the parameter set; the script is kept
    pub fn set_parameters(&mut self, parameters: CommandParameters) {
        self.parameters = Some(parameters);
    }

    pub fn alarm(&self) -> Option<&AlarmConfig> {
        self.alarm.as_ref()
    }

    pub fn set_alarm(&mut self, alarm: AlarmConfig) {
        self.alarm = Some(alarm);
    }

    pub fn recorder(&self) -> Option<&RecorderConfig> {
        self.recorder.as_ref()
    }

    pub fn set_recorder(&mut self, recorder: RecorderConfig) {
        self.recorder = Some(recorder);
    }

    /// Execute the script with the configured parameters
    pub async fn run_script<D: Device>(&self, device: &mut D, stop: StopSignal) -> Result<Vec<StepResult>, SessionError> {
        let parameters = self
            .parameters
            .as_ref()
            .ok_or(SessionError::Unconfigured("command parameters"))?;
        if self.script.is_empty() {
            return Err(SessionError::EmptyScript);
        }

        Ok(CommandExecutor::new(device, stop)
            .execute(&self.script, parameters)
            .await?)
    }

    /// Run the configured light alarm
    pub async fn run_alarm<D: Device>(&self, device: &mut D, stop: StopSignal) -> Result<AlarmOutcome, SessionError> {
        let alarm = self.alarm.as_ref().ok_or(SessionError::Unconfigured("light alarm"))?;

        Ok(AlarmMonitor::new(device, stop).monitor(alarm).await?)
    }

    /// Run the configured temperature recording
    pub async fn run_recorder<D: Device>(
        &self,
        device: &mut D,
        stop: StopSignal,
    ) -> Result<Vec<TemperatureReading>, SessionError> {
        let recorder = self
            .recorder
            .as_ref()
            .ok_or(SessionError::Unconfigured("data recorder"))?;

        Ok(DataRecorder::new(device, stop).record(recorder).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{DeviceCall, MockDevice};
    use finch_shared::{codec::parse_script, Command, RangeType, SensorSelector};

    #[tokio::test]
    async fn test_script_requires_parameters() {
        let mut session = Session::new();
        session.set_script(parse_script("moveforward, done").unwrap());

        let mut device = MockDevice::new();
        let err = session
            .run_script(&mut device, StopSignal::never())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unconfigured("command parameters")));
        assert!(device.calls.is_empty());
    }

    #[tokio::test]
    async fn test_empty_script_rejected() {
        let mut session = Session::new();
        session.set_parameters(CommandParameters::new(100, 100, 1.0).unwrap());

        let mut device = MockDevice::new();
        let err = session
            .run_script(&mut device, StopSignal::never())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::EmptyScript));
    }

    #[tokio::test]
    async fn test_parameters_change_without_reauthoring() {
        let mut session = Session::new();
        session.set_script(parse_script("moveforward").unwrap());
        session.set_parameters(CommandParameters::new(100, 100, 1.0).unwrap());

        let mut device = MockDevice::new();
        session.run_script(&mut device, StopSignal::never()).await.unwrap();

        session.set_parameters(CommandParameters::new(200, 100, 1.0).unwrap());
        let results = session.run_script(&mut device, StopSignal::never()).await.unwrap();

        assert_eq!(results[0].command, Command::MoveForward);
        assert_eq!(
            device.calls,
            vec![DeviceCall::Motors(100, 100), DeviceCall::Motors(200, 200)]
        );
    }

    #[tokio::test]
    async fn test_alarm_requires_config() {
        let session = Session::new();
        let mut device = MockDevice::new();
        let err = session
            .run_alarm(&mut device, StopSignal::never())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unconfigured("light alarm")));
    }

    #[tokio::test]
    async fn test_configured_alarm_runs() {
        let mut session = Session::new();
        session.set_alarm(AlarmConfig::new(SensorSelector::Left, RangeType::Minimum, 20, 2));

        let mut device = MockDevice::new().with_left_light(vec![30, 10]);
        let outcome = session.run_alarm(&mut device, StopSignal::never()).await.unwrap();
        assert_eq!(outcome, AlarmOutcome::triggered(2, 10));
    }

    #[tokio::test]
    async fn test_recorder_requires_config() {
        let session = Session::new();
        let mut device = MockDevice::new();
        let err = session
            .run_recorder(&mut device, StopSignal::never())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unconfigured("data recorder")));
    }
}
