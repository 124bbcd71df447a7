//! Command handlers for the different command families

mod light;
mod motion;
mod sensor;
mod timing;

pub use light::{handle_led_off, handle_led_on};
pub use motion::{
    handle_move_backward, handle_move_forward, handle_stop_motors, handle_turn_left,
    handle_turn_right,
};
pub use sensor::handle_get_temperature;
pub use timing::handle_wait;

use finch_shared::CommandParameters;

/// Context passed to command handlers
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// 1-based position of the command in the script
    pub step: usize,
    pub params: &'a CommandParameters,
}
