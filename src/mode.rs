//! Operating modes and the controls that toggle them.

/// Top-level operating state. Exactly one mode is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The timed red/yellow/green cycle.
    #[default]
    Normal,
    /// Red channel held at the dial brightness, others dark.
    RedOnly,
    /// All three channels flashing in unison.
    AllBlink,
    /// All channels dark.
    AllOff,
}

impl Mode {
    /// Label as emitted on the status line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Normal => "Normal",
            Mode::RedOnly => "Red Only",
            Mode::AllBlink => "All Blink",
            Mode::AllOff => "All Off",
        }
    }
}

/// The three mode controls.
///
/// Each physical button and each `M:` command maps to one target. Toggling
/// the target of the active mode returns to [`Mode::Normal`]; any other
/// target switches straight to its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    RedOnly,
    AllBlink,
    AllOff,
}

impl ToggleTarget {
    /// Mode this control switches into.
    pub const fn mode(self) -> Mode {
        match self {
            ToggleTarget::RedOnly => Mode::RedOnly,
            ToggleTarget::AllBlink => Mode::AllBlink,
            ToggleTarget::AllOff => Mode::AllOff,
        }
    }

    /// Scan free-form text for a control name.
    ///
    /// Substring match, checked in a fixed order, as the `M:` command
    /// payload is not otherwise structured.
    pub fn scan(text: &str) -> Option<Self> {
        if text.contains("Red Only") {
            return Some(ToggleTarget::RedOnly);
        }
        if text.contains("All Blink") {
            return Some(ToggleTarget::AllBlink);
        }
        if text.contains("All Off") {
            return Some(ToggleTarget::AllOff);
        }
        None
    }
}
