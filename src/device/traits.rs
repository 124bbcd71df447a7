//! Device capability abstraction for pluggable robot drivers

use anyhow::Result;
use async_trait::async_trait;

/// The primitive actuator and sensor operations of a Finch robot.
///
/// Every call either succeeds or reports a fault; callers never retry.
/// `wait` returns only once the device has let the requested time pass.
#[async_trait]
pub trait Device: Send {
    /// Drive both wheels; speeds are in `-255..=255`, negative is reverse
    async fn set_motors(&mut self, left: i32, right: i32) -> Result<()>;

    /// Set the nose LED color
    async fn set_led(&mut self, red: u8, green: u8, blue: u8) -> Result<()>;

    /// Start the buzzer at the given pitch
    async fn tone_on(&mut self, frequency_hz: u32) -> Result<()>;

    /// Silence the buzzer
    async fn tone_off(&mut self) -> Result<()>;

    /// Block for the given number of milliseconds
    async fn wait(&mut self, milliseconds: u64) -> Result<()>;

    async fn get_temperature_celsius(&mut self) -> Result<f64>;

    async fn get_left_light_sensor(&mut self) -> Result<i32>;

    async fn get_right_light_sensor(&mut self) -> Result<i32>;

    /// Open the link to the robot; `false` when the robot did not answer
    async fn connect(&mut self) -> Result<bool>;

    async fn disconnect(&mut self) -> Result<()>;

    /// Human-readable name for this device
    fn name(&self) -> &str;
}
