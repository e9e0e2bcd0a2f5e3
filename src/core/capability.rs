use serde::{Deserialize, Serialize};
use std::fmt;

/// The maximum power a participant can deliver in each direction at the
/// current tick.
///
/// Bands are tick-scoped snapshots: they are replaced, never mutated.
///
/// # Examples
///
/// ```
/// use gridflex::core::capability::CapabilityBand;
///
/// let band = CapabilityBand::new(20, 35);
/// assert_eq!(band.down(), 20);
/// assert_eq!(band.up(), 35);
/// assert!(!band.is_zero());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityBand {
    down: i64,
    up: i64,
}

impl CapabilityBand {
    /// Create a band from its downward and upward maxima.
    ///
    /// # Panics
    ///
    /// Panics if either limit is negative.
    pub fn new(down: i64, up: i64) -> Self {
        assert!(
            down >= 0 && up >= 0,
            "Capability band limits must be non-negative, got down={} up={}",
            down,
            up
        );
        Self { down, up }
    }

    /// A band that can deliver nothing in either direction.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Maximum downward power, in kW.
    pub fn down(&self) -> i64 {
        self.down
    }

    /// Maximum upward power, in kW.
    pub fn up(&self) -> i64 {
        self.up
    }

    /// Whether the band offers nothing in either direction.
    pub fn is_zero(&self) -> bool {
        self.down == 0 && self.up == 0
    }
}

impl fmt::Display for CapabilityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[-{}, +{}]", self.down, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_band() {
        assert!(CapabilityBand::zero().is_zero());
        assert!(!CapabilityBand::new(0, 1).is_zero());
    }

    #[test]
    #[should_panic(expected = "must be non-negative")]
    fn test_negative_band_rejected() {
        CapabilityBand::new(-1, 10);
    }

    #[test]
    fn test_band_display() {
        assert_eq!(format!("{}", CapabilityBand::new(5, 12)), "[-5, +12]");
    }
}
