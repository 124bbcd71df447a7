//! Temperature Data Recorder
//!
//! Takes a fixed number of temperature readings at a fixed interval and
//! renders them as a table.

use crate::device::{self, Device};
use crate::stop::{StopReason, StopSignal};
use finch_shared::{codec::format_celsius, RecorderConfig, TemperatureReading};
use std::fmt::Write;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a recording ended early; carries the readings taken so far
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Device fault after {} reading(s): {source}", .readings.len())]
    DeviceFault {
        readings: Vec<TemperatureReading>,
        #[source]
        source: anyhow::Error,
    },

    #[error("Recording stopped after {} reading(s): {reason}", .readings.len())]
    Stopped {
        readings: Vec<TemperatureReading>,
        reason: StopReason,
    },
}

/// Records temperatures on a device it holds exclusively for the run
pub struct DataRecorder<'a, D: Device> {
    device: &'a mut D,
    stop: StopSignal,
}

impl<'a, D: Device> DataRecorder<'a, D> {
    pub fn new(device: &'a mut D, stop: StopSignal) -> Self {
        Self { device, stop }
    }

    /// Read, then wait one interval, for each data point
    pub async fn record(&mut self, config: &RecorderConfig) -> Result<Vec<TemperatureReading>, RecorderError> {
        info!(
            "[RECORDER] Recording {} reading(s) every {}s",
            config.data_points(),
            config.interval_seconds()
        );

        let mut readings = Vec::with_capacity(config.data_points() as usize);

        for index in 1..=config.data_points() {
            if let Some(reason) = self.stop.check() {
                warn!("[RECORDER] Stopped before reading {}: {}", index, reason);
                return Err(RecorderError::Stopped { readings, reason });
            }

            let celsius = match self.device.get_temperature_celsius().await {
                Ok(celsius) => celsius,
                Err(source) => {
                    error!("[RECORDER] Reading {} failed: {}", index, source);
                    return Err(RecorderError::DeviceFault { readings, source });
                }
            };
            info!("[RECORDER] Reading {}: {}", index, format_celsius(celsius));
            readings.push(TemperatureReading { index, celsius });

            match device::wait_unless_stopped(&mut *self.device, config.interval_ms(), &mut self.stop).await {
                Ok(None) => {}
                Ok(Some(reason)) => {
                    warn!("[RECORDER] Stopped after reading {}: {}", index, reason);
                    return Err(RecorderError::Stopped { readings, reason });
                }
                Err(source) => {
                    error!("[RECORDER] Wait after reading {} failed: {}", index, source);
                    return Err(RecorderError::DeviceFault { readings, source });
                }
            }
        }

        info!("[RECORDER] Data recording complete");
        Ok(readings)
    }
}

/// Render readings as a right-aligned two-column table
pub fn format_table(readings: &[TemperatureReading]) -> String {
    let mut table = String::new();
    let _ = writeln!(table, "{:>14}{:>15}", "Recording #", "Temp in °C");
    let _ = writeln!(table, "{:>15}{:>15}", "___________", "___________");

    for reading in readings {
        let _ = writeln!(table, "{:>15}{:>15}", reading.index, format_celsius(reading.celsius));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{DeviceCall, MockDevice};

    #[tokio::test]
    async fn test_records_each_point_then_waits() {
        let mut device = MockDevice::new().with_temperatures(vec![20.5, 21.25, 22.0]);
        let config = RecorderConfig::new(3, 0.5).unwrap();

        let readings = DataRecorder::new(&mut device, StopSignal::never())
            .record(&config)
            .await
            .unwrap();

        assert_eq!(
            readings,
            vec![
                TemperatureReading { index: 1, celsius: 20.5 },
                TemperatureReading { index: 2, celsius: 21.25 },
                TemperatureReading { index: 3, celsius: 22.0 },
            ]
        );
        assert_eq!(
            device.calls,
            vec![
                DeviceCall::Temperature,
                DeviceCall::Wait(500),
                DeviceCall::Temperature,
                DeviceCall::Wait(500),
                DeviceCall::Temperature,
                DeviceCall::Wait(500),
            ]
        );
    }

    #[tokio::test]
    async fn test_fault_keeps_earlier_readings() {
        let mut device = MockDevice::new().with_temperatures(vec![19.0]).failing_at(2);
        let config = RecorderConfig::new(4, 1.0).unwrap();

        let err = DataRecorder::new(&mut device, StopSignal::never())
            .record(&config)
            .await
            .unwrap_err();

        match err {
            RecorderError::DeviceFault { readings, .. } => assert_eq!(readings.len(), 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stopped_recording() {
        let mut device = MockDevice::new();
        let (handle, stop) = StopSignal::new();
        handle.stop();

        let err = DataRecorder::new(&mut device, stop)
            .record(&RecorderConfig::new(2, 1.0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::Stopped { reason: StopReason::Cancelled, .. }));
        assert!(device.calls.is_empty());
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&[
            TemperatureReading { index: 1, celsius: 21.456 },
            TemperatureReading { index: 2, celsius: 19.0 },
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "   Recording #     Temp in °C");
        assert_eq!(lines[2], format!("{:>15}{:>15}", 1, "21.46"));
        assert!(lines[3].ends_with("19.00"));
    }
}
