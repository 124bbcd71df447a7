//! Text codec for scripts and configurations
//!
//! Scripts are written as command tokens separated by commas and/or
//! whitespace. Tokens are case-insensitive and may use `_` or `-` between
//! words:
//! ```text
//! moveforward, wait, turn_left, get-temperature, stopmotors, done
//! ```
//!
//! Alarm configurations are four comma-separated fields
//! (`selector,range,threshold,duration_seconds`, e.g. `left,maximum,50,5`)
//! and recorder configurations are two (`data_points,interval_seconds`).

use std::str::FromStr;
use thiserror::Error;

use crate::{
    AlarmConfig, Command, CommandScript, ParameterError, RangeType, RecorderConfig, SensorSelector,
};

/// Errors that can occur while decoding text input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("Unknown sensor selector {0:?} (expected left, right or both)")]
    UnknownSelector(String),

    #[error("Unknown range type {0:?} (expected minimum or maximum)")]
    UnknownRange(String),

    #[error("{0} command(s) found after done")]
    TokensAfterDone(usize),

    #[error("Expected {expected} fields for {what}, found {found}")]
    FieldCount {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

fn normalize(token: &str) -> String {
    token
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Command {
    type Err = CodecError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(token);
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.name().to_lowercase() == wanted)
            .ok_or_else(|| CodecError::UnknownCommand(token.trim().to_string()))
    }
}

impl FromStr for SensorSelector {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "left" => Ok(SensorSelector::Left),
            "right" => Ok(SensorSelector::Right),
            "both" => Ok(SensorSelector::Both),
            _ => Err(CodecError::UnknownSelector(s.trim().to_string())),
        }
    }
}

impl FromStr for RangeType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "minimum" | "min" => Ok(RangeType::Minimum),
            "maximum" | "max" => Ok(RangeType::Maximum),
            _ => Err(CodecError::UnknownRange(s.trim().to_string())),
        }
    }
}

/// Decode a script; authoring ends at the first `done`, which is kept
pub fn parse_script(text: &str) -> Result<CommandScript, CodecError> {
    let mut script = CommandScript::new();
    let mut tokens = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());

    for token in tokens.by_ref() {
        let command: Command = token.parse()?;
        script.push(command);
        if command.is_terminator() {
            break;
        }
    }

    let trailing = tokens.count();
    if trailing > 0 {
        return Err(CodecError::TokensAfterDone(trailing));
    }

    Ok(script)
}

/// Encode a script back to its token form
pub fn format_script(script: &CommandScript) -> String {
    script
        .iter()
        .map(|c| c.name().to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn split_fields<'a>(text: &'a str, what: &'static str, expected: usize) -> Result<Vec<&'a str>, CodecError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != expected {
        return Err(CodecError::FieldCount {
            what,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn parse_number<T: FromStr>(value: &str, field: &'static str) -> Result<T, CodecError> {
    value.parse().map_err(|_| CodecError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Decode `selector,range,threshold,duration_seconds`
pub fn parse_alarm_config(text: &str) -> Result<AlarmConfig, CodecError> {
    let fields = split_fields(text, "alarm config", 4)?;

    Ok(AlarmConfig::new(
        fields[0].parse()?,
        fields[1].parse()?,
        parse_number(fields[2], "threshold")?,
        parse_number(fields[3], "duration")?,
    ))
}

/// Decode `data_points,interval_seconds`
pub fn parse_recorder_config(text: &str) -> Result<RecorderConfig, CodecError> {
    let fields = split_fields(text, "recorder config", 2)?;

    Ok(RecorderConfig::new(
        parse_number(fields[0], "data points")?,
        parse_number(fields[1], "interval")?,
    )?)
}

/// Format a temperature with exactly two fractional digits.
///
/// The value is scaled by 100 and rounded half away from zero before
/// printing, so `0.125` becomes `"0.13"`. Results that round to zero are
/// printed without a sign.
pub fn format_celsius(celsius: f64) -> String {
    let rounded = (celsius * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2}", rounded)
}
