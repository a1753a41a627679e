//! Analog dial to output intensity mapping.

/// Linear map from a raw analog reading to an output intensity.
///
/// Readings above `raw_max` clamp to it, so the map is total over `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessScale {
    /// Largest raw reading the dial produces (inclusive).
    pub raw_max: u16,
    /// Intensity produced by a reading of zero.
    pub floor: u8,
    /// Intensity produced by a reading of `raw_max`.
    pub ceil: u8,
}

impl BrightnessScale {
    /// Map one raw reading onto the intensity range.
    pub fn map(&self, raw: u16) -> u8 {
        if self.raw_max == 0 {
            return self.ceil;
        }
        let raw = u32::from(raw.min(self.raw_max));
        let span = u32::from(self.ceil.saturating_sub(self.floor));
        let scaled = raw * span / u32::from(self.raw_max);
        self.floor
            .saturating_add(u8::try_from(scaled).unwrap_or(u8::MAX))
    }
}

impl Default for BrightnessScale {
    /// A 10-bit dial mapped onto 5..=255, dim but never fully dark.
    fn default() -> Self {
        Self {
            raw_max: 1023,
            floor: 5,
            ceil: 255,
        }
    }
}
