//! Narrow-terminal policy.

/// Default width, in columns, at or below which double-page mode is
/// unavailable.
pub const DEFAULT_NARROW_WIDTH: u16 = 100;

/// Decides whether the terminal is too narrow for spreads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsivePolicy {
    max_width: u16,
}

impl Default for ResponsivePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_NARROW_WIDTH)
    }
}

impl ResponsivePolicy {
    pub const fn new(max_width: u16) -> Self {
        Self { max_width }
    }

    pub const fn max_width(&self) -> u16 {
        self.max_width
    }

    /// Whether a terminal `width` columns wide forces single-page mode.
    pub const fn is_constrained(&self, width: u16) -> bool {
        width <= self.max_width
    }
}
