use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a power adjustment.
///
/// `Up` means consuming more (or injecting less), `Down` means curtailing
/// consumption (or injecting more).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// The direction that moves towards `target`, or `None` when the target
    /// is zero and nothing should move.
    pub fn towards(target: i64) -> Option<Self> {
        match target.signum() {
            1 => Some(Direction::Up),
            -1 => Some(Direction::Down),
            _ => None,
        }
    }

    /// `+1` for `Up`, `-1` for `Down`.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// A site's declared, time-bounded willingness to adjust its power.
///
/// Offers are immutable values produced fresh each tick. Equality is
/// structural over every field.
///
/// # Examples
///
/// ```
/// use gridflex::core::flex_offer::{Direction, FlexOffer};
///
/// let offer = FlexOffer::new(7, 120, Direction::Down, 4, 1, 2);
/// assert_eq!(offer.signed_delta_p(), -120);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlexOffer {
    /// Unique identifier, echoed back in activation commands.
    id: i64,
    /// Amount of power in kW. Never negative.
    magnitude: i64,
    direction: Direction,
    /// Duration the adjustment can be sustained.
    duration: u32,
    /// Lead time needed before the full adjustment is available.
    reaction_time: u32,
    /// Recovery time needed after an activation.
    cease_time: u32,
}

impl FlexOffer {
    /// Create a new offer.
    ///
    /// # Panics
    ///
    /// Panics if `magnitude` is negative; the sign is carried by `direction`.
    pub fn new(
        id: i64,
        magnitude: i64,
        direction: Direction,
        duration: u32,
        reaction_time: u32,
        cease_time: u32,
    ) -> Self {
        assert!(
            magnitude >= 0,
            "Flex offer magnitude must be non-negative, got {}",
            magnitude
        );
        Self {
            id,
            magnitude,
            direction,
            duration,
            reaction_time,
            cease_time,
        }
    }

    /// Shorthand for an upward offer without timing constraints.
    pub fn up(id: i64, magnitude: i64) -> Self {
        Self::new(id, magnitude, Direction::Up, 0, 0, 0)
    }

    /// Shorthand for a downward offer without timing constraints.
    pub fn down(id: i64, magnitude: i64) -> Self {
        Self::new(id, magnitude, Direction::Down, 0, 0, 0)
    }

    /// Replace the timing triple.
    pub fn with_timing(mut self, duration: u32, reaction_time: u32, cease_time: u32) -> Self {
        self.duration = duration;
        self.reaction_time = reaction_time;
        self.cease_time = cease_time;
        self
    }

    /// Unique identifier of this offer.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Unsigned size of the adjustment, in kW.
    pub fn magnitude(&self) -> i64 {
        self.magnitude
    }

    /// Whether the offer raises or lowers consumption.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of ticks the adjustment can be held.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Ticks needed before the adjustment takes effect.
    pub fn reaction_time(&self) -> u32 {
        self.reaction_time
    }

    /// Ticks needed to return to the baseline afterwards.
    pub fn cease_time(&self) -> u32 {
        self.cease_time
    }

    /// Signed contribution of this offer to an aggregate: `+magnitude` for
    /// `Up`, `-magnitude` for `Down`.
    pub fn signed_delta_p(&self) -> i64 {
        self.direction.sign() * self.magnitude
    }

    /// The command that activates this offer at its site.
    pub fn activation(&self) -> ActivationCommand {
        ActivationCommand::new(self.id)
    }
}

impl fmt::Display for FlexOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {}kW (t={}, tR={}, tC={})",
            self.id, self.direction, self.magnitude, self.duration, self.reaction_time, self.cease_time
        )
    }
}

/// Instruction to a site to activate one of its offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivationCommand {
    reference_id: i64,
}

impl ActivationCommand {
    /// Create a command activating the offer with id `reference_id`.
    pub fn new(reference_id: i64) -> Self {
        Self { reference_id }
    }

    /// Id of the offer this command activates.
    pub fn reference_id(&self) -> i64 {
        self.reference_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_contribution() {
        assert_eq!(FlexOffer::up(1, 10).signed_delta_p(), 10);
        assert_eq!(FlexOffer::down(2, 10).signed_delta_p(), -10);
    }

    #[test]
    fn test_structural_equality() {
        let a = FlexOffer::new(1, 10, Direction::Up, 3, 1, 1);
        let b = FlexOffer::new(1, 10, Direction::Up, 3, 1, 1);
        let c = FlexOffer::new(1, 10, Direction::Up, 3, 2, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    #[should_panic(expected = "must be non-negative")]
    fn test_negative_magnitude_rejected() {
        FlexOffer::up(1, -5);
    }

    #[test]
    fn test_direction_towards_target() {
        assert_eq!(Direction::towards(12), Some(Direction::Up));
        assert_eq!(Direction::towards(-3), Some(Direction::Down));
        assert_eq!(Direction::towards(0), None);
    }

    #[test]
    fn test_activation_references_offer() {
        let offer = FlexOffer::down(42, 5);
        assert_eq!(offer.activation().reference_id(), 42);
    }
}
