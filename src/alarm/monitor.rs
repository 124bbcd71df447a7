//! Light Alarm Monitor
//!
//! Samples the selected light sensor(s) once per second, feeding every
//! value to the alarm state machine, until the threshold is crossed or the
//! monitoring window runs out.

use crate::device::{self, Device};
use crate::stop::{StopReason, StopSignal};
use finch_shared::{
    alarm::{ALERT_DURATION_MS, ALERT_TONE_HZ, SAMPLE_INTERVAL_MS},
    state_machine::{AlarmEvent, AlarmStateMachine, TransitionResult},
    AlarmConfig, AlarmOutcome, SensorSelector,
};
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a monitoring run ended without an outcome
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Device fault after {samples} sample(s): {source}")]
    DeviceFault {
        samples: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("Monitoring stopped after {samples} sample(s): {reason}")]
    Stopped { samples: u32, reason: StopReason },
}

/// Runs light alarms on a device it holds exclusively for the run
pub struct AlarmMonitor<'a, D: Device> {
    device: &'a mut D,
    stop: StopSignal,
}

impl<'a, D: Device> AlarmMonitor<'a, D> {
    /// Create a new alarm monitor
    pub fn new(device: &'a mut D, stop: StopSignal) -> Self {
        Self { device, stop }
    }

    /// Monitor until the threshold is crossed or `duration_seconds` samples were taken
    pub async fn monitor(&mut self, config: &AlarmConfig) -> Result<AlarmOutcome, MonitorError> {
        info!("[ALARM] Monitoring {} on {}", config, self.device.name());

        let mut fsm = AlarmStateMachine::new(*config);
        let mut transition = fsm.process_event(AlarmEvent::Start);

        loop {
            match transition {
                TransitionResult::Sampling { samples_taken } => {
                    if samples_taken > 0 {
                        let waited =
                            device::wait_unless_stopped(&mut *self.device, SAMPLE_INTERVAL_MS, &mut self.stop)
                                .await
                                .map_err(|source| fault(samples_taken, source))?;
                        if let Some(reason) = waited {
                            return Err(stopped(samples_taken, reason));
                        }
                    }

                    if let Some(reason) = self.stop.check() {
                        return Err(stopped(samples_taken, reason));
                    }

                    let value = self
                        .read_selected(config.selector)
                        .await
                        .map_err(|source| fault(samples_taken, source))?;
                    info!("[ALARM] Sample {}: {} = {}", samples_taken + 1, config.selector, value);

                    transition = fsm.process_event(AlarmEvent::Sample(value));
                }

                TransitionResult::Triggered(outcome) => {
                    warn!(
                        "[ALARM] The {} threshold value of {} was exceeded by the current light sensor value of {}",
                        config.range,
                        config.threshold,
                        outcome.triggering_value.unwrap_or_default()
                    );
                    self.sound_alert()
                        .await
                        .map_err(|source| fault(outcome.seconds_elapsed, source))?;
                    return Ok(outcome);
                }

                TransitionResult::Completed(outcome) => {
                    info!(
                        "[ALARM] The {} threshold value of {} was not exceeded in {}s",
                        config.range, config.threshold, outcome.seconds_elapsed
                    );
                    return Ok(outcome);
                }

                TransitionResult::Invalid { from, event } => {
                    unreachable!("alarm monitor fed {:?} in state {:?}", event, from)
                }
            }
        }
    }

    /// Read one value for the selector; `Both` reads the pair back to back
    async fn read_selected(&mut self, selector: SensorSelector) -> anyhow::Result<i32> {
        match selector {
            SensorSelector::Left => self.device.get_left_light_sensor().await,
            SensorSelector::Right => self.device.get_right_light_sensor().await,
            SensorSelector::Both => {
                let left = self.device.get_left_light_sensor().await?;
                let right = self.device.get_right_light_sensor().await?;
                Ok(selector.combine(left, right))
            }
        }
    }

    /// Fixed-pitch tone held for the alert duration, then silenced.
    ///
    /// The alert is not interrupted by stop requests, and the tone is
    /// switched off even when the hold fails.
    async fn sound_alert(&mut self) -> anyhow::Result<()> {
        self.device.tone_on(ALERT_TONE_HZ).await?;
        let held = self.device.wait(ALERT_DURATION_MS).await;
        self.device.tone_off().await?;
        held
    }
}

fn fault(samples: u32, source: anyhow::Error) -> MonitorError {
    error!("[ALARM] Device fault after {} sample(s): {}", samples, source);
    MonitorError::DeviceFault { samples, source }
}

fn stopped(samples: u32, reason: StopReason) -> MonitorError {
    warn!("[ALARM] Monitoring stopped after {} sample(s): {}", samples, reason);
    MonitorError::Stopped { samples, reason }
}
