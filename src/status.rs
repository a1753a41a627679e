//! Status line encoding.
//!
//! One JSON object per line: `Light` (the logical light color), `Mode`,
//! `Brightness` and `GreenBlink` (whether the blink tail is live). Encoding
//! is total over all reachable controller states.

use core::fmt::Write;

use heapless::String;

use crate::LampLevels;
use crate::mode::Mode;

/// Capacity that fits every reachable status line.
pub const STATUS_LINE_CAP: usize = 96;

/// Snapshot of the observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFrame {
    pub mode: Mode,
    pub levels: LampLevels,
    pub brightness: u8,
    pub tail_active: bool,
}

/// Logical light label.
///
/// Mode labels win over raw channel state; within Normal the lit channel
/// decides, with the blink tail reported as `Blinking` whichever half of the
/// flip it is on.
pub fn light_label(frame: &StatusFrame) -> &'static str {
    match frame.mode {
        Mode::AllBlink => "All Blinking",
        Mode::AllOff => "Off",
        Mode::RedOnly => "Red",
        Mode::Normal => {
            if frame.levels.red > 0 {
                "Red"
            } else if frame.levels.yellow > 0 {
                "Yellow"
            } else if frame.tail_active {
                "Blinking"
            } else if frame.levels.green > 0 {
                "Green"
            } else {
                "Off"
            }
        }
    }
}

/// Render one status line.
pub fn encode(frame: &StatusFrame) -> String<STATUS_LINE_CAP> {
    let mut line = String::new();
    // The longest label combination stays well under capacity.
    let _ = write!(
        line,
        "{{\"Light\":\"{}\",\"Mode\":\"{}\",\"Brightness\":{},\"GreenBlink\":{}}}",
        light_label(frame),
        frame.mode.as_str(),
        frame.brightness,
        u8::from(frame.tail_active),
    );
    line
}
