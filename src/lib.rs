#![no_std]

pub mod brightness;
pub mod command;
pub mod controller;
pub mod cycle;
pub mod event;
pub mod mode;
pub mod scheduler;
pub mod status;

pub use controller::{Controller, ControllerConfig, TaskPeriods};
pub use scheduler::{Iterations, RegisterError, Scheduler, Task, TaskId};
pub use event::{EventQueue, EventReceiver, EventSender, QueueFullError};
pub use command::{Command, LineBuffer, parse_line};
pub use cycle::{CyclePhase, PhaseDurations};
pub use mode::{Mode, ToggleTarget};
pub use status::StatusFrame;

pub use brightness::BrightnessScale;
pub use embassy_time::{Duration, Instant};

/// One output frame for the three lamp channels.
///
/// Values are PWM duty levels; `0` is dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LampLevels {
    pub red: u8,
    pub yellow: u8,
    pub green: u8,
}

impl LampLevels {
    /// All channels dark.
    pub const OFF: Self = Self {
        red: 0,
        yellow: 0,
        green: 0,
    };

    /// Every channel at `level`.
    pub const fn all(level: u8) -> Self {
        Self {
            red: level,
            yellow: level,
            green: level,
        }
    }

    /// Red at `level`, the rest dark.
    pub const fn red_only(level: u8) -> Self {
        Self {
            red: level,
            yellow: 0,
            green: 0,
        }
    }

    /// Yellow at `level`, the rest dark.
    pub const fn yellow_only(level: u8) -> Self {
        Self {
            red: 0,
            yellow: level,
            green: 0,
        }
    }

    /// Green at `level`, the rest dark.
    pub const fn green_only(level: u8) -> Self {
        Self {
            red: 0,
            yellow: 0,
            green: level,
        }
    }
}

/// Abstract lamp driver trait
///
/// Implement this trait to support different hardware platforms.
/// The controller is generic over this trait and only calls it when a
/// frame actually changes.
pub trait LampDriver {
    /// Write duty levels to the three channels
    fn write(&mut self, levels: LampLevels);
}

/// Outbound status transport
///
/// Receives one complete JSON status line at a time, without a trailing
/// newline.
pub trait StatusSink {
    fn write_line(&mut self, line: &str);
}

/// Brightness dial input
///
/// Returns the raw reading; `BrightnessScale` maps it onto a duty level.
/// The default scale expects a 10-bit range.
pub trait BrightnessDial {
    fn read_raw(&mut self) -> u16;
}
