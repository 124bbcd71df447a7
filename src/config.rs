//! Operator configuration loaded from `FINCH_*` environment variables

use crate::device::DryRunConfig;
use crate::routines::Routine;
use finch_shared::{
    codec::{parse_alarm_config, parse_recorder_config, parse_script},
    AlarmConfig, CommandParameters, CommandScript, RecorderConfig,
};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Everything the operator binary needs for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Label used in logs
    pub device_name: String,
    /// Script to execute, if any
    pub script: Option<CommandScript>,
    /// Parameters for the script; all three variables or none
    pub parameters: Option<CommandParameters>,
    pub alarm: Option<AlarmConfig>,
    pub recorder: Option<RecorderConfig>,
    pub routine: Option<Routine>,
    /// Overall deadline for the whole run
    pub run_timeout: Option<Duration>,
    pub dry_run: DryRunConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_name: "finch-001".into(),
            script: None,
            parameters: None,
            alarm: None,
            recorder: None,
            routine: None,
            run_timeout: None,
            dry_run: DryRunConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let device_name = var("FINCH_DEVICE_NAME").unwrap_or(defaults.device_name);

        let script = var("FINCH_SCRIPT")
            .map(|text| parse_script(&text).map_err(|e| invalid("FINCH_SCRIPT", e)))
            .transpose()?;

        let motor_speed = var("FINCH_MOTOR_SPEED");
        let led_brightness = var("FINCH_LED_BRIGHTNESS");
        let wait_seconds = var("FINCH_WAIT_SECONDS");
        let parameters = match (motor_speed, led_brightness, wait_seconds) {
            (None, None, None) => None,
            (Some(speed), Some(brightness), Some(seconds)) => {
                let speed = parse_number::<i32>("FINCH_MOTOR_SPEED", &speed)?;
                let brightness = parse_number::<i32>("FINCH_LED_BRIGHTNESS", &brightness)?;
                let seconds = parse_number::<f64>("FINCH_WAIT_SECONDS", &seconds)?;
                let parameters = CommandParameters::new(speed, brightness, seconds)
                    .map_err(|e| invalid("FINCH_MOTOR_SPEED/FINCH_LED_BRIGHTNESS/FINCH_WAIT_SECONDS", e))?;
                Some(parameters)
            }
            (speed, brightness, seconds) => {
                let missing: Vec<&str> = [
                    ("FINCH_MOTOR_SPEED", speed.is_none()),
                    ("FINCH_LED_BRIGHTNESS", brightness.is_none()),
                    ("FINCH_WAIT_SECONDS", seconds.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return Err(ConfigError::MissingVar(format!(
                    "{} (command parameters are set together)",
                    missing.join(", ")
                )));
            }
        };

        let alarm = var("FINCH_ALARM")
            .map(|text| parse_alarm_config(&text).map_err(|e| invalid("FINCH_ALARM", e)))
            .transpose()?;

        let recorder = var("FINCH_RECORD")
            .map(|text| parse_recorder_config(&text).map_err(|e| invalid("FINCH_RECORD", e)))
            .transpose()?;

        let routine = var("FINCH_ROUTINE")
            .map(|text| text.parse::<Routine>().map_err(|e| invalid("FINCH_ROUTINE", e)))
            .transpose()?;

        let run_timeout = var("FINCH_RUN_TIMEOUT_SECS")
            .map(|text| parse_number::<u64>("FINCH_RUN_TIMEOUT_SECS", &text).map(Duration::from_secs))
            .transpose()?;

        let mut dry_run = defaults.dry_run;
        if let Some(text) = var("FINCH_DRY_RUN_LEFT_LIGHT") {
            dry_run.left_light = parse_number("FINCH_DRY_RUN_LEFT_LIGHT", &text)?;
        }
        if let Some(text) = var("FINCH_DRY_RUN_RIGHT_LIGHT") {
            dry_run.right_light = parse_number("FINCH_DRY_RUN_RIGHT_LIGHT", &text)?;
        }
        if let Some(text) = var("FINCH_DRY_RUN_TEMPERATURE") {
            dry_run.temperature_celsius = parse_number("FINCH_DRY_RUN_TEMPERATURE", &text)?;
        }
        if let Some(text) = var("FINCH_DRY_RUN_REALTIME") {
            dry_run.realtime = parse_flag("FINCH_DRY_RUN_REALTIME", &text)?;
        }

        Ok(Self {
            device_name,
            script,
            parameters,
            alarm,
            recorder,
            routine,
            run_timeout,
            dry_run,
        })
    }
}

fn invalid(key: &str, err: impl Display) -> ConfigError {
    ConfigError::InvalidValue(key.to_string(), err.to_string())
}

fn parse_number<T>(key: &str, text: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse::<T>()
        .map_err(|e| invalid(key, format!("'{}': {}", text, e)))
}

fn parse_flag(key: &str, text: &str) -> Result<bool, ConfigError> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, format!("'{}' is not a boolean", text))),
    }
}
