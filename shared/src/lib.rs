//! Finch Shared Types
//!
//! This crate provides the device-independent types used by the Finch
//! control layers: the command vocabulary and its parameter set, alarm
//! configuration and outcomes, and the recorder configuration.

pub mod codec;
pub mod state_machine;

use std::fmt;
use thiserror::Error;

/// Motion constants
pub mod motion {
    /// Wheel speed used for both turn commands, independent of the configured motor speed
    pub const TURNING_MOTOR_SPEED: i32 = 100;

    /// Slowest configurable motor speed
    pub const MIN_MOTOR_SPEED: i32 = 1;

    /// Fastest configurable motor speed (also the device's motor limit)
    pub const MAX_MOTOR_SPEED: i32 = 255;

    /// Dimmest configurable LED brightness
    pub const MIN_LED_BRIGHTNESS: i32 = 1;

    /// Brightest configurable LED brightness
    pub const MAX_LED_BRIGHTNESS: i32 = 255;
}

/// Alarm timing and alert constants
pub mod alarm {
    /// Interval between two light sensor samples
    pub const SAMPLE_INTERVAL_MS: u64 = 1000;

    /// Pitch of the audible alert
    pub const ALERT_TONE_HZ: u32 = 1500;

    /// How long the audible alert is held before it is silenced
    pub const ALERT_DURATION_MS: u64 = 3000;
}

/// Convert a duration in seconds to whole milliseconds, truncating toward zero
pub fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0) as u64
}

/// Abstract actions a script can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    None,
    MoveForward,
    MoveBackward,
    StopMotors,
    Wait,
    TurnRight,
    TurnLeft,
    LedOn,
    LedOff,
    GetTemperature,
    /// Ends authoring; executes as a labelled no-op
    Done,
}

impl Command {
    /// Every command, in declaration order
    pub const ALL: [Command; 11] = [
        Command::None,
        Command::MoveForward,
        Command::MoveBackward,
        Command::StopMotors,
        Command::Wait,
        Command::TurnRight,
        Command::TurnLeft,
        Command::LedOn,
        Command::LedOff,
        Command::GetTemperature,
        Command::Done,
    ];

    /// Label used for feedback and display
    pub fn name(&self) -> &'static str {
        match self {
            Command::None => "None",
            Command::MoveForward => "MoveForward",
            Command::MoveBackward => "MoveBackward",
            Command::StopMotors => "StopMotors",
            Command::Wait => "Wait",
            Command::TurnRight => "TurnRight",
            Command::TurnLeft => "TurnLeft",
            Command::LedOn => "LedOn",
            Command::LedOff => "LedOff",
            Command::GetTemperature => "GetTemperature",
            Command::Done => "Done",
        }
    }

    /// Whether this command closes an authoring session
    pub fn is_terminator(&self) -> bool {
        matches!(self, Command::Done)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised when building parameter sets
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Motor speed {0} out of range [1 - 255]")]
    MotorSpeedOutOfRange(i32),

    #[error("LED brightness {0} out of range [1 - 255]")]
    LedBrightnessOutOfRange(i32),

    #[error("Wait seconds must be a non-negative number, got {0}")]
    InvalidWaitSeconds(f64),

    #[error("Number of data points must be at least 1")]
    NoDataPoints,

    #[error("Recording interval must be a non-negative number of seconds, got {0}")]
    InvalidInterval(f64),
}

/// The single parameter set shared by every step of a script
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandParameters {
    motor_speed: u8,
    led_brightness: u8,
    wait_seconds: f64,
}

impl CommandParameters {
    /// Create a validated parameter set
    pub fn new(motor_speed: i32, led_brightness: i32, wait_seconds: f64) -> Result<Self, ParameterError> {
        if !(motion::MIN_MOTOR_SPEED..=motion::MAX_MOTOR_SPEED).contains(&motor_speed) {
            return Err(ParameterError::MotorSpeedOutOfRange(motor_speed));
        }
        if !(motion::MIN_LED_BRIGHTNESS..=motion::MAX_LED_BRIGHTNESS).contains(&led_brightness) {
            return Err(ParameterError::LedBrightnessOutOfRange(led_brightness));
        }
        if !wait_seconds.is_finite() || wait_seconds < 0.0 {
            return Err(ParameterError::InvalidWaitSeconds(wait_seconds));
        }

        Ok(Self {
            motor_speed: motor_speed as u8,
            led_brightness: led_brightness as u8,
            wait_seconds,
        })
    }

    pub fn motor_speed(&self) -> i32 {
        self.motor_speed as i32
    }

    pub fn led_brightness(&self) -> u8 {
        self.led_brightness
    }

    pub fn wait_seconds(&self) -> f64 {
        self.wait_seconds
    }

    /// Wait duration in whole milliseconds (truncated)
    pub fn wait_ms(&self) -> u64 {
        seconds_to_ms(self.wait_seconds)
    }
}

impl fmt::Display for CommandParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "motor speed {}, LED brightness {}, wait {}s",
            self.motor_speed, self.led_brightness, self.wait_seconds
        )
    }
}

/// An ordered list of commands, replayed verbatim by the executor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandScript {
    commands: Vec<Command>,
}

impl CommandScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command at the end of the script
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of steps that produce feedback (everything but `None`)
    pub fn executable_len(&self) -> usize {
        self.commands.iter().filter(|c| **c != Command::None).count()
    }
}

impl From<Vec<Command>> for CommandScript {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

impl<'a> IntoIterator for &'a CommandScript {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Feedback for one executed command
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub command: Command,
    pub feedback: String,
}

impl StepResult {
    pub fn new(command: Command, feedback: impl Into<String>) -> Self {
        Self {
            command,
            feedback: feedback.into(),
        }
    }
}

/// Which light sensor(s) feed a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSelector {
    Left,
    Right,
    /// Truncated average of both sensors
    Both,
}

impl SensorSelector {
    /// Combine a left/right pair read in the same instant into the selected value
    pub fn combine(&self, left: i32, right: i32) -> i32 {
        match self {
            SensorSelector::Left => left,
            SensorSelector::Right => right,
            SensorSelector::Both => ((left as i64 + right as i64) / 2) as i32,
        }
    }
}

impl fmt::Display for SensorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorSelector::Left => write!(f, "left"),
            SensorSelector::Right => write!(f, "right"),
            SensorSelector::Both => write!(f, "both"),
        }
    }
}

/// Direction of the alarm threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeType {
    /// Trigger when the value drops below the threshold
    Minimum,
    /// Trigger when the value rises above the threshold
    Maximum,
}

impl RangeType {
    /// Strict threshold crossing; equality never triggers
    pub fn is_crossed(&self, value: i32, threshold: i32) -> bool {
        match self {
            RangeType::Minimum => value < threshold,
            RangeType::Maximum => value > threshold,
        }
    }
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeType::Minimum => write!(f, "minimum"),
            RangeType::Maximum => write!(f, "maximum"),
        }
    }
}

/// Light alarm configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmConfig {
    pub selector: SensorSelector,
    pub range: RangeType,
    pub threshold: i32,
    /// Upper bound on samples, one per second
    pub duration_seconds: u32,
}

impl AlarmConfig {
    pub fn new(selector: SensorSelector, range: RangeType, threshold: i32, duration_seconds: u32) -> Self {
        Self {
            selector,
            range,
            threshold,
            duration_seconds,
        }
    }
}

impl fmt::Display for AlarmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sensors={} range={} threshold={} duration={}s",
            self.selector, self.range, self.threshold, self.duration_seconds
        )
    }
}

/// Result of one monitoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmOutcome {
    pub triggered: bool,
    pub seconds_elapsed: u32,
    pub triggering_value: Option<i32>,
}

impl AlarmOutcome {
    /// Threshold crossed by `value` on sample number `seconds_elapsed`
    pub fn triggered(seconds_elapsed: u32, value: i32) -> Self {
        Self {
            triggered: true,
            seconds_elapsed,
            triggering_value: Some(value),
        }
    }

    /// Monitoring window exhausted without a crossing
    pub fn completed(seconds_elapsed: u32) -> Self {
        Self {
            triggered: false,
            seconds_elapsed,
            triggering_value: None,
        }
    }
}

/// Temperature recording configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecorderConfig {
    data_points: u32,
    interval_seconds: f64,
}

impl RecorderConfig {
    pub fn new(data_points: u32, interval_seconds: f64) -> Result<Self, ParameterError> {
        if data_points == 0 {
            return Err(ParameterError::NoDataPoints);
        }
        if !interval_seconds.is_finite() || interval_seconds < 0.0 {
            return Err(ParameterError::InvalidInterval(interval_seconds));
        }

        Ok(Self {
            data_points,
            interval_seconds,
        })
    }

    pub fn data_points(&self) -> u32 {
        self.data_points
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }

    pub fn interval_ms(&self) -> u64 {
        seconds_to_ms(self.interval_seconds)
    }
}

/// One recorded temperature, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub index: u32,
    pub celsius: f64,
}
