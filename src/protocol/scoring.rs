use crate::protocol::proposal::Proposal;
use rust_decimal::Decimal;

/// Pick the proposal with the highest score.
///
/// `score` returns `None` for proposals that are unacceptable. The first
/// of several equally scored proposals wins. Returns `None` when nothing is
/// acceptable.
///
/// # Examples
///
/// ```
/// use gridflex::protocol::scoring::select_best;
/// use rust_decimal::Decimal;
///
/// let bids = vec![4, 9, 2, 9];
/// let best = select_best(&bids, |b| (*b > 3).then(|| Decimal::from(*b)));
/// assert_eq!(best, Some(9));
/// ```
pub fn select_best<P, F>(proposals: &[P], mut score: F) -> Option<P>
where
    P: Clone,
    F: FnMut(&P) -> Option<Decimal>,
{
    let mut best: Option<(Decimal, &P)> = None;
    for proposal in proposals {
        let Some(s) = score(proposal) else {
            continue;
        };
        if best.map_or(true, |(b, _)| s > b) {
            best = Some((s, proposal));
        }
    }
    best.map(|(_, p)| p.clone())
}

/// Pick the proposal whose target value lies closest to the description's.
pub fn closest_to_target<P: Proposal>(proposals: &[P], description: &P) -> Option<P> {
    let wanted = description.target_value();
    select_best(proposals, |p| Some(-(p.target_value() - wanted).abs()))
}

/// Pick the smallest proposal that covers the description's target value
/// in full.
pub fn smallest_covering<P: Proposal>(proposals: &[P], description: &P) -> Option<P> {
    let wanted = description.target_value();
    select_best(proposals, |p| {
        let offered = p.target_value();
        (offered >= wanted).then(|| -offered)
    })
}
