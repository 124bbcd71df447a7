//! Recording device for tests

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;

use super::Device;

/// One call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Motors(i32, i32),
    Led(u8, u8, u8),
    ToneOn(u32),
    ToneOff,
    Wait(u64),
    Temperature,
    LeftLight,
    RightLight,
    Connect,
    Disconnect,
}

/// Records every call; sensor reads come from scripted sequences whose last
/// value repeats once the sequence runs out
pub struct MockDevice {
    pub calls: Vec<DeviceCall>,
    left: VecDeque<i32>,
    right: VecDeque<i32>,
    temperatures: VecDeque<f64>,
    fail_at_call: Option<usize>,
    block_waits: bool,
    connect_ok: bool,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            left: VecDeque::new(),
            right: VecDeque::new(),
            temperatures: VecDeque::new(),
            fail_at_call: None,
            block_waits: false,
            connect_ok: true,
        }
    }

    pub fn with_left_light(mut self, values: Vec<i32>) -> Self {
        self.left = values.into();
        self
    }

    pub fn with_right_light(mut self, values: Vec<i32>) -> Self {
        self.right = values.into();
        self
    }

    pub fn with_temperatures(mut self, values: Vec<f64>) -> Self {
        self.temperatures = values.into();
        self
    }

    /// Fail the call with this zero-based index (the call is still recorded)
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at_call = Some(index);
        self
    }

    /// Waits never complete
    pub fn with_blocking_waits(mut self) -> Self {
        self.block_waits = true;
        self
    }

    pub fn refusing_connect(mut self) -> Self {
        self.connect_ok = false;
        self
    }

    pub fn waits(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Wait(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &DeviceCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    fn record(&mut self, call: DeviceCall) -> Result<()> {
        self.calls.push(call);
        if self.fail_at_call == Some(self.calls.len() - 1) {
            bail!("device fault on {:?}", self.calls[self.calls.len() - 1]);
        }
        Ok(())
    }
}

fn next_value<T: Copy>(queue: &mut VecDeque<T>, default: T) -> T {
    if queue.len() > 1 {
        queue.pop_front().unwrap_or(default)
    } else {
        queue.front().copied().unwrap_or(default)
    }
}

#[async_trait]
impl Device for MockDevice {
    async fn set_motors(&mut self, left: i32, right: i32) -> Result<()> {
        self.record(DeviceCall::Motors(left, right))
    }

    async fn set_led(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.record(DeviceCall::Led(red, green, blue))
    }

    async fn tone_on(&mut self, frequency_hz: u32) -> Result<()> {
        self.record(DeviceCall::ToneOn(frequency_hz))
    }

    async fn tone_off(&mut self) -> Result<()> {
        self.record(DeviceCall::ToneOff)
    }

    async fn wait(&mut self, milliseconds: u64) -> Result<()> {
        self.record(DeviceCall::Wait(milliseconds))?;
        if self.block_waits {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn get_temperature_celsius(&mut self) -> Result<f64> {
        self.record(DeviceCall::Temperature)?;
        Ok(next_value(&mut self.temperatures, 20.0))
    }

    async fn get_left_light_sensor(&mut self) -> Result<i32> {
        self.record(DeviceCall::LeftLight)?;
        Ok(next_value(&mut self.left, 0))
    }

    async fn get_right_light_sensor(&mut self) -> Result<i32> {
        self.record(DeviceCall::RightLight)?;
        Ok(next_value(&mut self.right, 0))
    }

    async fn connect(&mut self) -> Result<bool> {
        self.record(DeviceCall::Connect)?;
        Ok(self.connect_ok)
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.record(DeviceCall::Disconnect)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
