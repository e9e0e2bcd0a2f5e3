use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridflex::core::capability::CapabilityBand;
use gridflex::core::offer_book::OfferBook;
use gridflex::core::participant::ParticipantId;
use gridflex::core::Tick;
use gridflex::matching::exhaustive::ExhaustiveCombination;
use gridflex::matching::matcher::FlexibilityMatcher;
use gridflex::matching::moving_horizon::MovingHorizon;
use gridflex::matching::strategy::MatchingStrategy;
use gridflex::signal::distributor::{ContractualParticipant, SignalDistributor};
use gridflex::simulation::scenario::{generate_offer_book, ScenarioConfig};

fn book(site_count: usize) -> OfferBook {
    generate_offer_book(&ScenarioConfig {
        site_count,
        max_offers_per_site: 3,
        seed: Some(42),
        ..Default::default()
    })
}

fn matcher(book: &OfferBook, strategy: Box<dyn MatchingStrategy>) -> FlexibilityMatcher {
    let mut matcher = FlexibilityMatcher::new(strategy);
    for site in book.sites() {
        matcher.register_site(site);
    }
    matcher
}

fn bench_exhaustive_6_sites(c: &mut Criterion) {
    let book = book(6);
    let matcher = matcher(&book, Box::new(ExhaustiveCombination));

    c.bench_function("exhaustive_6_sites", |b| {
        b.iter(|| matcher.match_offers(0, black_box(120), black_box(&book)))
    });
}

fn bench_exhaustive_8_sites(c: &mut Criterion) {
    let book = book(8);
    let matcher = matcher(&book, Box::new(ExhaustiveCombination));

    c.bench_function("exhaustive_8_sites", |b| {
        b.iter(|| matcher.match_offers(0, black_box(250), black_box(&book)))
    });
}

fn bench_moving_horizon_1000_sites(c: &mut Criterion) {
    let book = book(1000);
    let matcher = matcher(&book, Box::new(MovingHorizon));

    c.bench_function("moving_horizon_1000_sites", |b| {
        b.iter(|| matcher.match_offers(4, black_box(5_000), black_box(&book)))
    });
}

struct Sink;

impl ContractualParticipant for Sink {
    fn signal_target(&mut self, _tick: Tick, _value: i64) {}

    fn power_capacity(&mut self) -> CapabilityBand {
        CapabilityBand::new(50, 50)
    }
}

fn bench_signal_1000_participants(c: &mut Criterion) {
    let mut distributor = SignalDistributor::new();
    for i in 0..1000 {
        distributor
            .register(ParticipantId::new(format!("P{}", i)), Sink, CapabilityBand::new(i % 97, i % 89))
            .unwrap();
    }

    c.bench_function("signal_1000_participants", |b| {
        b.iter(|| distributor.signal(0, black_box(-12_345)))
    });
}

criterion_group!(
    benches,
    bench_exhaustive_6_sites,
    bench_exhaustive_8_sites,
    bench_moving_horizon_1000_sites,
    bench_signal_1000_participants
);
criterion_main!(benches);
