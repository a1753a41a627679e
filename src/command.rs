//! Line-framed command parsing.
//!
//! Two line forms are understood: `D:<red>,<yellow>,<green>` carrying phase
//! durations in milliseconds, and `M:<name>` naming a mode control. Anything
//! else, including partially valid input, is dropped whole: a command either
//! applies completely or not at all.

use embassy_time::Duration;
use heapless::String;

use crate::cycle::PhaseDurations;
use crate::mode::ToggleTarget;

/// A parsed inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Replace the three hold durations at the next cycle reset.
    Durations(PhaseDurations),
    /// Toggle a mode control, exactly as the matching button would.
    Toggle(ToggleTarget),
}

/// Parse one complete line (without its terminator).
///
/// Returns `None` for anything that is not a well-formed command.
pub fn parse_line(line: &str) -> Option<Command> {
    if let Some(fields) = line.strip_prefix("D:") {
        return parse_durations(fields).map(Command::Durations);
    }
    if let Some(name) = line.strip_prefix("M:") {
        return ToggleTarget::scan(name).map(Command::Toggle);
    }
    None
}

fn parse_durations(fields: &str) -> Option<PhaseDurations> {
    let mut parts = fields.splitn(3, ',');
    let red = parse_millis(parts.next()?)?;
    let yellow = parse_millis(parts.next()?)?;
    let green = parse_millis(parts.next()?)?;
    Some(PhaseDurations { red, yellow, green })
}

/// Strict integer field, surrounding whitespace tolerated. `u32` bounds the
/// value so later duration arithmetic cannot overflow.
fn parse_millis(field: &str) -> Option<Duration> {
    let value: u32 = field.trim().parse().ok()?;
    Some(Duration::from_millis(u64::from(value)))
}

/// Accumulates serial bytes into lines.
///
/// A line longer than the buffer is poisoned and discarded at its
/// terminator. Carriage returns are skipped so CR-LF hosts work unchanged.
#[derive(Debug)]
pub struct LineBuffer<const N: usize> {
    buf: String<N>,
    overflow: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            overflow: false,
        }
    }

    /// Feed one byte; returns a command when a line completes and parses.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        match byte {
            b'\n' => {
                let command = if self.overflow {
                    None
                } else {
                    parse_line(&self.buf)
                };
                self.buf.clear();
                self.overflow = false;
                command
            }
            b'\r' => None,
            _ => {
                if self.buf.push(byte as char).is_err() {
                    self.overflow = true;
                }
                None
            }
        }
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
