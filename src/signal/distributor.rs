use crate::core::capability::CapabilityBand;
use crate::core::participant::ParticipantId;
use crate::core::Tick;
use log::{debug, trace};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A party that accepts target signals from a balancing authority.
pub trait ContractualParticipant {
    /// Receive the power target apportioned to this participant for `tick`.
    fn signal_target(&mut self, tick: Tick, value: i64);

    /// The participant's current capability. Called once per poll.
    fn power_capacity(&mut self) -> CapabilityBand;
}

/// Source of the system imbalance, typically the grid operator's own
/// accounting of supply versus demand.
///
/// Changes are not pushed to listeners; [`SignalDistributor::after_tick`]
/// reads the current value once per tick.
pub trait BalancingSignalSource {
    /// Signed imbalance: positive asks for more consumption, negative for
    /// less.
    fn current_imbalance(&self) -> i64;
}

/// Errors from registry operations on a [`SignalDistributor`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistributorError {
    #[error("participant {0} is not registered with this distributor")]
    UnknownParticipant(ParticipantId),
    #[error("participant {0} is already registered with this distributor")]
    AlreadyRegistered(ParticipantId),
}

/// One value delivered to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSignal {
    pub participant: ParticipantId,
    pub tick: Tick,
    pub value: i64,
}

struct Registration<P> {
    id: ParticipantId,
    participant: P,
    band: CapabilityBand,
}

/// Splits an imbalance across participants in proportion to their
/// declared capability bands.
///
/// Participants are kept in registration order; every signal round
/// visits them in that order.
///
/// # Examples
///
/// ```
/// use gridflex::core::capability::CapabilityBand;
/// use gridflex::core::participant::ParticipantId;
/// use gridflex::core::Tick;
/// use gridflex::signal::distributor::{ContractualParticipant, SignalDistributor};
///
/// #[derive(Default)]
/// struct Recorder(Vec<i64>);
///
/// impl ContractualParticipant for Recorder {
///     fn signal_target(&mut self, _tick: Tick, value: i64) {
///         self.0.push(value);
///     }
///     fn power_capacity(&mut self) -> CapabilityBand {
///         CapabilityBand::zero()
///     }
/// }
///
/// let mut distributor = SignalDistributor::new();
/// distributor
///     .register(ParticipantId::new("A"), Recorder::default(), CapabilityBand::new(0, 10))
///     .unwrap();
/// distributor
///     .register(ParticipantId::new("B"), Recorder::default(), CapabilityBand::new(0, 30))
///     .unwrap();
///
/// let signals = distributor.signal(1, 20);
/// let values: Vec<i64> = signals.iter().map(|s| s.value).collect();
/// assert_eq!(values, vec![5, 15]);
/// ```
pub struct SignalDistributor<P> {
    registrations: Vec<Registration<P>>,
}

impl<P> Default for SignalDistributor<P> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<P: ContractualParticipant> SignalDistributor<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant with its initial band.
    ///
    /// Registering an id twice is rejected; the existing registration is
    /// left untouched.
    pub fn register(
        &mut self,
        id: ParticipantId,
        participant: P,
        initial_band: CapabilityBand,
    ) -> Result<(), DistributorError> {
        if self.contains(&id) {
            return Err(DistributorError::AlreadyRegistered(id));
        }
        debug!("Registering participant {} with band {}", id, initial_band);
        self.registrations.push(Registration {
            id,
            participant,
            band: initial_band,
        });
        Ok(())
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.registrations.iter().any(|r| r.id == *id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registered ids in registration order.
    pub fn participants(&self) -> Vec<ParticipantId> {
        self.registrations.iter().map(|r| r.id.clone()).collect()
    }

    pub fn participant(&self, id: &ParticipantId) -> Result<&P, DistributorError> {
        self.registration(id).map(|r| &r.participant)
    }

    pub fn participant_mut(&mut self, id: &ParticipantId) -> Result<&mut P, DistributorError> {
        self.registration_mut(id).map(|r| &mut r.participant)
    }

    /// The band currently on record for `id`.
    pub fn current_band(&self, id: &ParticipantId) -> Result<CapabilityBand, DistributorError> {
        self.registration(id).map(|r| r.band)
    }

    /// Replace the band on record for `id` with newly announced limits.
    pub fn update_band(
        &mut self,
        id: &ParticipantId,
        band: CapabilityBand,
    ) -> Result<(), DistributorError> {
        let registration = self.registration_mut(id)?;
        trace!("Participant {} announces band {}", id, band);
        registration.band = band;
        Ok(())
    }

    /// Ask every participant for its current capability and record it.
    pub fn poll_capacities(&mut self) {
        for registration in &mut self.registrations {
            registration.band = registration.participant.power_capacity();
            trace!(
                "Polled participant {}: band {}",
                registration.id,
                registration.band
            );
        }
    }

    /// Apportion `imbalance` across all participants and deliver each share
    /// through [`ContractualParticipant::signal_target`].
    ///
    /// Every participant receives exactly one signal per call, even when
    /// its share is zero. When the participants' combined capability cannot
    /// cover the imbalance, each is asked for its full band and the rest of
    /// the imbalance stays unresolved.
    pub fn signal(&mut self, tick: Tick, imbalance: i64) -> Vec<TargetSignal> {
        let fraction = self.fraction(imbalance);
        debug!(
            "Signalling imbalance {} at tick {} to {} participants (fraction {})",
            imbalance,
            tick,
            self.registrations.len(),
            fraction
        );

        let mut delivered = Vec::with_capacity(self.registrations.len());
        for registration in &mut self.registrations {
            let value = share(fraction, imbalance, &registration.band);
            trace!("Participant {} receives target {}", registration.id, value);
            registration.participant.signal_target(tick, value);
            delivered.push(TargetSignal {
                participant: registration.id.clone(),
                tick,
                value,
            });
        }
        delivered
    }

    /// Poll capacities, then signal the source's current imbalance.
    pub fn after_tick<S: BalancingSignalSource + ?Sized>(
        &mut self,
        tick: Tick,
        source: &S,
    ) -> Vec<TargetSignal> {
        self.poll_capacities();
        self.signal(tick, source.current_imbalance())
    }

    /// The share of each participant's band requested for `imbalance`,
    /// capped at one.
    pub fn fraction(&self, imbalance: i64) -> Decimal {
        if imbalance == 0 {
            return Decimal::ZERO;
        }
        let capacity: Decimal = self
            .registrations
            .iter()
            .map(|r| Decimal::from(directional_capacity(imbalance, &r.band)))
            .sum();
        if capacity.is_zero() {
            return Decimal::ZERO;
        }
        let fraction = Decimal::from(imbalance.unsigned_abs()) / capacity;
        fraction.min(Decimal::ONE)
    }

    fn registration(&self, id: &ParticipantId) -> Result<&Registration<P>, DistributorError> {
        self.registrations
            .iter()
            .find(|r| r.id == *id)
            .ok_or_else(|| DistributorError::UnknownParticipant(id.clone()))
    }

    fn registration_mut(
        &mut self,
        id: &ParticipantId,
    ) -> Result<&mut Registration<P>, DistributorError> {
        self.registrations
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or_else(|| DistributorError::UnknownParticipant(id.clone()))
    }
}

/// The part of `band` that can act against `imbalance`.
fn directional_capacity(imbalance: i64, band: &CapabilityBand) -> i64 {
    if imbalance > 0 {
        band.up()
    } else {
        band.down()
    }
}

/// Signed share for one participant. Halves round up, towards positive
/// infinity, in both directions.
fn share(fraction: Decimal, imbalance: i64, band: &CapabilityBand) -> i64 {
    if imbalance == 0 {
        return 0;
    }
    let signed = if imbalance > 0 { band.up() } else { -band.down() };
    (fraction * Decimal::from(signed) + dec!(0.5))
        .floor()
        .to_i64()
        .unwrap_or(0)
}
