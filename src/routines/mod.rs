//! Built-in Routines
//!
//! Fixed light, sound and motion shows. Each routine is a table of
//! primitive actions replayed in order.

use crate::device::{self, Device};
use crate::stop::{StopReason, StopSignal};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

/// One primitive device action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Motors(i32, i32),
    Led(u8, u8, u8),
    ToneOn(u32),
    ToneOff,
    Wait(u64),
}

use Action::{Led, Motors, ToneOff, ToneOn, Wait};

const PIVOT_LEFT_GREEN: [Action; 2] = [Motors(-66, 66), Led(0, 255, 0)];
const PIVOT_RIGHT_BLUE: [Action; 2] = [Motors(66, -66), Led(0, 100, 255)];

const LIGHT_AND_SOUND: &[Action] = &[
    ToneOn(523),
    Led(0, 0, 250),
    Wait(250),
    Led(0, 125, 125),
    Wait(250),
    Led(0, 250, 0),
    Wait(250),
    Led(125, 125, 0),
    Wait(250),
    Led(250, 0, 0),
    Wait(250),
    ToneOff,
    Led(0, 0, 0),
];

const DANCE: &[Action] = &[
    Motors(-75, 75),
    Wait(1000),
    Motors(75, -75),
    Wait(1000),
    Motors(-75, 75),
    Wait(1000),
    Motors(75, -75),
    Wait(1000),
    Motors(0, 200),
    Wait(5000),
    Motors(200, 0),
    Wait(5000),
    Motors(0, 0),
];

// Pivots back and forth in time with Saria's Song
#[rustfmt::skip]
const MIX: &[Action] = &[
    PIVOT_LEFT_GREEN[0], PIVOT_LEFT_GREEN[1],
    ToneOn(698), Wait(250), ToneOff,
    ToneOn(880), Wait(250), ToneOff,
    PIVOT_RIGHT_BLUE[0], PIVOT_RIGHT_BLUE[1],
    ToneOn(988), Wait(500), ToneOff,
    PIVOT_LEFT_GREEN[0], PIVOT_LEFT_GREEN[1],
    ToneOn(698), Wait(250), ToneOff,
    ToneOn(880), Wait(250), ToneOff,
    PIVOT_RIGHT_BLUE[0], PIVOT_RIGHT_BLUE[1],
    ToneOn(988), Wait(500), ToneOff,
    PIVOT_LEFT_GREEN[0], PIVOT_LEFT_GREEN[1],
    ToneOn(698), Wait(250), ToneOff,
    ToneOn(880), Wait(250), ToneOff,
    PIVOT_RIGHT_BLUE[0], PIVOT_RIGHT_BLUE[1],
    ToneOn(988), Wait(250), ToneOff,
    ToneOn(1319), Wait(250), ToneOff,
    PIVOT_LEFT_GREEN[0], PIVOT_LEFT_GREEN[1],
    ToneOn(1175), Wait(500), ToneOff,
    PIVOT_RIGHT_BLUE[0], PIVOT_RIGHT_BLUE[1],
    ToneOn(988), Wait(250), ToneOff,
    ToneOn(1047), Wait(250), ToneOff,
    PIVOT_LEFT_GREEN[0], PIVOT_LEFT_GREEN[1],
    ToneOn(988), Wait(250), ToneOff,
    ToneOn(784), Wait(250), ToneOff,
    ToneOn(659),
    PIVOT_RIGHT_BLUE[0], PIVOT_RIGHT_BLUE[1],
    Wait(1000), ToneOff,
    ToneOn(587),
    PIVOT_LEFT_GREEN[0], PIVOT_LEFT_GREEN[1],
    Wait(250), ToneOff,
    ToneOn(659),
    PIVOT_RIGHT_BLUE[0], PIVOT_RIGHT_BLUE[1],
    Wait(250), ToneOff,
    ToneOn(784),
    PIVOT_LEFT_GREEN[0], PIVOT_LEFT_GREEN[1],
    Wait(250), ToneOff,
    ToneOn(659),
    PIVOT_RIGHT_BLUE[0], PIVOT_RIGHT_BLUE[1],
    Wait(1000), ToneOff,
    Motors(0, 0),
    Led(0, 0, 0),
];

/// The available routines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routine {
    LightAndSound,
    Dance,
    Mix,
}

impl Routine {
    pub fn actions(&self) -> &'static [Action] {
        match self {
            Routine::LightAndSound => LIGHT_AND_SOUND,
            Routine::Dance => DANCE,
            Routine::Mix => MIX,
        }
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Routine::LightAndSound => write!(f, "light-and-sound"),
            Routine::Dance => write!(f, "dance"),
            Routine::Mix => write!(f, "mix"),
        }
    }
}

impl FromStr for Routine {
    type Err = RoutineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match name.as_str() {
            "lightandsound" => Ok(Routine::LightAndSound),
            "dance" => Ok(Routine::Dance),
            "mix" => Ok(Routine::Mix),
            _ => Err(RoutineError::UnknownRoutine(s.trim().to_string())),
        }
    }
}

/// Errors raised by routines
#[derive(Error, Debug)]
pub enum RoutineError {
    #[error("Unknown routine {0:?} (expected light-and-sound, dance or mix)")]
    UnknownRoutine(String),

    #[error("Device fault on action {index} ({action:?}): {source}")]
    DeviceFault {
        index: usize,
        action: Action,
        #[source]
        source: anyhow::Error,
    },

    #[error("Routine stopped at action {index}: {reason}")]
    Stopped { index: usize, reason: StopReason },
}

/// Performs routines on a device it holds exclusively for the run
pub struct RoutinePerformer<'a, D: Device> {
    device: &'a mut D,
    stop: StopSignal,
}

impl<'a, D: Device> RoutinePerformer<'a, D> {
    pub fn new(device: &'a mut D, stop: StopSignal) -> Self {
        Self { device, stop }
    }

    /// Replay every action of the routine, returning how many were performed
    pub async fn perform(&mut self, routine: Routine) -> Result<usize, RoutineError> {
        info!("[ROUTINE] Performing {} on {}", routine, self.device.name());

        for (index, action) in routine.actions().iter().copied().enumerate() {
            if let Some(reason) = self.stop.check() {
                return Err(self.halt(index, reason).await);
            }

            let result = match action {
                Motors(left, right) => self.device.set_motors(left, right).await,
                Led(red, green, blue) => self.device.set_led(red, green, blue).await,
                ToneOn(frequency_hz) => self.device.tone_on(frequency_hz).await,
                ToneOff => self.device.tone_off().await,
                Wait(milliseconds) => {
                    match device::wait_unless_stopped(&mut *self.device, milliseconds, &mut self.stop).await {
                        Ok(Some(reason)) => return Err(self.halt(index, reason).await),
                        Ok(None) => Ok(()),
                        Err(e) => Err(e),
                    }
                }
            };

            if let Err(source) = result {
                error!("[ROUTINE] Action {} ({:?}) failed: {}", index, action, source);
                return Err(RoutineError::DeviceFault { index, action, source });
            }
        }

        info!("[ROUTINE] {} finished", routine);
        Ok(routine.actions().len())
    }

    /// Bring the device to rest after a stop, ignoring further faults
    async fn halt(&mut self, index: usize, reason: StopReason) -> RoutineError {
        warn!("[ROUTINE] Stopped at action {}: {}", index, reason);

        if let Err(e) = self.device.tone_off().await {
            warn!("[ROUTINE] Could not silence tone: {}", e);
        }
        if let Err(e) = self.device.set_motors(0, 0).await {
            warn!("[ROUTINE] Could not stop motors: {}", e);
        }
        if let Err(e) = self.device.set_led(0, 0, 0).await {
            warn!("[ROUTINE] Could not turn LED off: {}", e);
        }

        RoutineError::Stopped { index, reason }
    }
}
