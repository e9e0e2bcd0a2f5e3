//! A few balancing ticks across two aggregators.
//!
//! The grid operator's imbalance swings between surplus and shortage. Each
//! tick the distributor polls both aggregators for what their sites can
//! deliver, apportions the imbalance, and each aggregator activates the
//! offers that best fit its share.
//!
//! Run with `RUST_LOG=debug` to follow the apportionment and dispatch.

use gridflex::prelude::*;

struct Site {
    name: &'static str,
    offers: Vec<FlexOffer>,
}

impl FlexCapableSite for Site {
    fn flex_offers(&self) -> Vec<FlexOffer> {
        self.offers.clone()
    }

    fn activate_flex(&mut self, command: ActivationCommand) {
        println!("    {} activates offer #{}", self.name, command.reference_id());
    }
}

struct GridOperator {
    profile: Vec<i64>,
    tick: usize,
}

impl BalancingSignalSource for GridOperator {
    fn current_imbalance(&self) -> i64 {
        self.profile[self.tick % self.profile.len()]
    }
}

fn site(name: &'static str, offers: Vec<FlexOffer>) -> Site {
    Site { name, offers }
}

fn main() {
    env_logger::init();

    println!("╔══════════════════════════════════════════╗");
    println!("║  gridflex: Balancing Tick Example        ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut harbour = ReactiveAggregator::new(&EngineConfig::default());
    harbour.register_site(
        SiteId::new("COLD-STORE"),
        site(
            "COLD-STORE",
            vec![FlexOffer::up(1, 40), FlexOffer::down(2, 25)],
        ),
    );
    harbour.register_site(
        SiteId::new("CRANE-YARD"),
        site(
            "CRANE-YARD",
            vec![FlexOffer::up(3, 15), FlexOffer::down(4, 30), FlexOffer::down(5, 10)],
        ),
    );

    let config = EngineConfig::from_json(r#"{ "strategy": "moving_horizon" }"#)
        .expect("demo configuration is valid");
    let mut suburb = ReactiveAggregator::new(&config);
    suburb.register_site(
        SiteId::new("HEATPUMPS"),
        site(
            "HEATPUMPS",
            vec![
                FlexOffer::up(6, 60).with_timing(4, 0, 1),
                FlexOffer::up(7, 20).with_timing(4, 2, 1),
                FlexOffer::down(8, 35).with_timing(4, 1, 1),
            ],
        ),
    );
    suburb.register_site(
        SiteId::new("EV-CHARGERS"),
        site(
            "EV-CHARGERS",
            vec![FlexOffer::up(9, 45), FlexOffer::down(10, 45)],
        ),
    );

    let mut distributor = SignalDistributor::new();
    distributor
        .register(ParticipantId::new("HARBOUR"), harbour, CapabilityBand::zero())
        .expect("fresh distributor");
    distributor
        .register(ParticipantId::new("SUBURB"), suburb, CapabilityBand::zero())
        .expect("fresh distributor");

    let mut operator = GridOperator {
        profile: vec![80, 0, -50, 300],
        tick: 0,
    };

    for tick in 0..4 {
        operator.tick = tick;
        println!("━━━ Tick {} ━━━", tick);
        println!("  Imbalance: {}", operator.current_imbalance());

        let signals = distributor.after_tick(tick as Tick, &operator);
        for signal in &signals {
            let band = distributor
                .current_band(&signal.participant)
                .expect("signalled participant is registered");
            println!(
                "  {} band {} -> target {}",
                signal.participant, band, signal.value
            );
        }

        for id in distributor.participants() {
            let aggregator = distributor
                .participant_mut(&id)
                .expect("listed participant is registered");
            if let Some(outcome) = aggregator.tick(tick as Tick) {
                println!(
                    "  {} matched {} of {} ({} activations)",
                    id,
                    outcome.achieved(),
                    outcome.target,
                    outcome.activations.len()
                );
            }
        }
        println!();
    }
}
