//! Dry-run device
//!
//! Logs every call instead of driving hardware and answers sensor reads
//! with fixed values. Useful to check a script or alarm configuration
//! before pointing it at a real robot.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::Device;

/// Dry-run device configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DryRunConfig {
    /// Value returned by the left light sensor
    pub left_light: i32,
    /// Value returned by the right light sensor
    pub right_light: i32,
    /// Value returned by the temperature sensor
    pub temperature_celsius: f64,
    /// Sleep for real on `wait` instead of returning immediately
    pub realtime: bool,
}

impl Default for DryRunConfig {
    fn default() -> Self {
        Self {
            left_light: 40,
            right_light: 40,
            temperature_celsius: 21.5,
            realtime: false,
        }
    }
}

/// A device that only logs what it is asked to do
pub struct DryRunDevice {
    name: String,
    config: DryRunConfig,
    connected: bool,
}

impl DryRunDevice {
    pub fn new(name: impl Into<String>, config: DryRunConfig) -> Self {
        Self {
            name: name.into(),
            config,
            connected: false,
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if !self.connected {
            bail!("{} is not connected", self.name);
        }
        Ok(())
    }
}

#[async_trait]
impl Device for DryRunDevice {
    async fn set_motors(&mut self, left: i32, right: i32) -> Result<()> {
        self.ensure_connected()?;
        info!("[DEVICE] {} motors left={} right={}", self.name, left, right);
        Ok(())
    }

    async fn set_led(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.ensure_connected()?;
        info!("[DEVICE] {} LED rgb=({}, {}, {})", self.name, red, green, blue);
        Ok(())
    }

    async fn tone_on(&mut self, frequency_hz: u32) -> Result<()> {
        self.ensure_connected()?;
        info!("[DEVICE] {} tone on {}Hz", self.name, frequency_hz);
        Ok(())
    }

    async fn tone_off(&mut self) -> Result<()> {
        self.ensure_connected()?;
        info!("[DEVICE] {} tone off", self.name);
        Ok(())
    }

    async fn wait(&mut self, milliseconds: u64) -> Result<()> {
        self.ensure_connected()?;
        debug!("[DEVICE] {} wait {}ms", self.name, milliseconds);
        if self.config.realtime {
            tokio::time::sleep(Duration::from_millis(milliseconds)).await;
        }
        Ok(())
    }

    async fn get_temperature_celsius(&mut self) -> Result<f64> {
        self.ensure_connected()?;
        Ok(self.config.temperature_celsius)
    }

    async fn get_left_light_sensor(&mut self) -> Result<i32> {
        self.ensure_connected()?;
        Ok(self.config.left_light)
    }

    async fn get_right_light_sensor(&mut self) -> Result<i32> {
        self.ensure_connected()?;
        Ok(self.config.right_light)
    }

    async fn connect(&mut self) -> Result<bool> {
        info!("[DEVICE] {} connected (dry run)", self.name);
        self.connected = true;
        Ok(true)
    }

    async fn disconnect(&mut self) -> Result<()> {
        info!("[DEVICE] {} disconnected", self.name);
        self.connected = false;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
