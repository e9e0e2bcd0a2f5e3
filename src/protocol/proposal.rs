use crate::core::Tick;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value exchanged during a negotiation round: the work description sent
/// out in a call for proposals, a bid coming back, or the award.
pub trait Proposal: Clone + PartialEq + fmt::Debug {
    /// The amount of work this proposal is about, used for scoring.
    fn target_value(&self) -> Decimal;

    /// First tick of the window the work applies to, if bounded.
    fn begin_mark(&self) -> Option<Tick> {
        None
    }

    /// Last tick of the window the work applies to, if bounded.
    fn end_mark(&self) -> Option<Tick> {
        None
    }

    fn has_time_constraints(&self) -> bool {
        self.begin_mark().is_some() || self.end_mark().is_some()
    }
}

/// General-purpose proposal for demand-side work, such as absorbing an
/// amount of excess energy inside a time window.
///
/// # Examples
///
/// ```
/// use gridflex::protocol::proposal::{Proposal, WorkProposal};
/// use rust_decimal_macros::dec;
///
/// let call = WorkProposal::new("absorb surplus", dec!(120)).with_window(10, 14);
/// assert!(call.has_time_constraints());
///
/// let bid = WorkProposal::new("battery park", dec!(150)).with_valuation(dec!(3.5));
/// let award = bid.with_target(call.target_value());
/// assert_eq!(award.target_value(), dec!(120));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkProposal {
    description: String,
    target_value: Decimal,
    /// What the work is worth to whoever put this proposal forward.
    valuation: Decimal,
    begin_mark: Option<Tick>,
    end_mark: Option<Tick>,
}

impl WorkProposal {
    pub fn new(description: impl Into<String>, target_value: Decimal) -> Self {
        Self {
            description: description.into(),
            target_value,
            valuation: Decimal::ZERO,
            begin_mark: None,
            end_mark: None,
        }
    }

    pub fn with_valuation(mut self, valuation: Decimal) -> Self {
        self.valuation = valuation;
        self
    }

    /// Bound the proposal to `[begin, end]`.
    ///
    /// # Panics
    ///
    /// Panics if `end` comes before `begin`.
    pub fn with_window(mut self, begin: Tick, end: Tick) -> Self {
        assert!(begin <= end, "Proposal window [{}, {}] is inverted", begin, end);
        self.begin_mark = Some(begin);
        self.end_mark = Some(end);
        self
    }

    /// The same proposal scoped to a different amount of work.
    pub fn with_target(&self, target_value: Decimal) -> Self {
        Self {
            target_value,
            ..self.clone()
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn valuation(&self) -> Decimal {
        self.valuation
    }
}

impl Proposal for WorkProposal {
    fn target_value(&self) -> Decimal {
        self.target_value
    }

    fn begin_mark(&self) -> Option<Tick> {
        self.begin_mark
    }

    fn end_mark(&self) -> Option<Tick> {
        self.end_mark
    }
}

impl fmt::Display for WorkProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.description, self.target_value)?;
        if let (Some(b), Some(e)) = (self.begin_mark, self.end_mark) {
            write!(f, " in [{}, {}]", b, e)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unconstrained_by_default() {
        assert!(!WorkProposal::new("x", dec!(1)).has_time_constraints());
    }

    #[test]
    #[should_panic(expected = "inverted")]
    fn test_inverted_window_rejected() {
        WorkProposal::new("x", dec!(1)).with_window(5, 4);
    }

    #[test]
    fn test_with_target_keeps_everything_else() {
        let bid = WorkProposal::new("bid", dec!(40))
            .with_valuation(dec!(2))
            .with_window(3, 6);
        let scoped = bid.with_target(dec!(25));
        assert_eq!(scoped.target_value(), dec!(25));
        assert_eq!(scoped.valuation(), dec!(2));
        assert_eq!(scoped.begin_mark(), Some(3));
        assert_eq!(scoped.description(), "bid");
    }

    #[test]
    fn test_display() {
        let p = WorkProposal::new("absorb", dec!(12.5)).with_window(1, 2);
        assert_eq!(format!("{}", p), "absorb (12.5 in [1, 2])");
    }
}
