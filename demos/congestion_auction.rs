//! Relieving local congestion through Contract-Net rounds.
//!
//! A distribution operator has surplus energy to place inside a time window.
//! It tenders the work to flexible partners, awards the smallest bid that
//! covers the surplus and scopes the award down to exactly what is needed.
//!
//! Run with `RUST_LOG=debug` to follow the protocol messages.

use gridflex::prelude::*;
use gridflex::protocol::scoring::smallest_covering;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Partner {
    name: &'static str,
    headroom: Decimal,
    price: Decimal,
}

impl Responder<WorkProposal> for Partner {
    fn call_for_proposal(&mut self, description: &WorkProposal) -> Answer<WorkProposal> {
        if self.headroom.is_zero() {
            println!("    {} refuses (no headroom)", self.name);
            return Answer::Refuse;
        }
        let bid = WorkProposal::new(self.name, self.headroom).with_valuation(self.price);
        println!("    {} bids {} for {}", self.name, bid, description.description());
        Answer::Propose(bid)
    }

    fn accept_proposal(&mut self, award: &WorkProposal) -> Completion<WorkProposal> {
        if award.target_value() > self.headroom {
            return Completion::Failure;
        }
        self.headroom -= award.target_value();
        println!(
            "    {} absorbs {} (headroom left {})",
            self.name,
            award.target_value(),
            self.headroom
        );
        Completion::Done(award.clone())
    }

    fn reject_proposal(&mut self, _proposal: &WorkProposal) {
        println!("    {} was not selected", self.name);
    }
}

struct DistributionOperator {
    surplus: Vec<(Decimal, Tick, Tick)>,
    needed: Decimal,
    placed: Decimal,
}

impl Initiator<WorkProposal> for DistributionOperator {
    fn work_unit_description(&mut self) -> Option<WorkProposal> {
        let (amount, begin, end) = self.surplus.pop()?;
        self.needed = amount;
        Some(WorkProposal::new("absorb surplus", amount).with_window(begin, end))
    }

    fn find_best_proposal(
        &mut self,
        proposals: &[WorkProposal],
        description: &WorkProposal,
    ) -> Option<WorkProposal> {
        smallest_covering(proposals, description)
    }

    fn update_work_description(&mut self, best: &WorkProposal) -> WorkProposal {
        best.with_target(self.needed)
    }

    fn notify_work_done(&mut self, proposal: &WorkProposal) {
        self.placed += proposal.target_value();
        println!("  Placed {} with {}", proposal.target_value(), proposal.description());
    }

    fn signal_no_solution_found(&mut self) {
        println!("  No partner can take {}", self.needed);
    }
}

fn main() {
    env_logger::init();

    println!("╔══════════════════════════════════════════╗");
    println!("║  gridflex: Congestion Auction Example    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut cnp = ContractNet::new();
    cnp.register_responder(Partner {
        name: "BATTERY-PARK",
        headroom: dec!(150),
        price: dec!(4.2),
    });
    cnp.register_responder(Partner {
        name: "GREENHOUSE",
        headroom: dec!(90),
        price: dec!(2.8),
    });
    cnp.register_responder(Partner {
        name: "DATA-CENTRE",
        headroom: dec!(40),
        price: dec!(6.0),
    });

    let mut operator = DistributionOperator {
        // Tendered from the back.
        surplus: vec![
            (dec!(500), 20, 22),
            (dec!(100), 16, 18),
            (dec!(35), 12, 13),
            (dec!(80), 10, 12),
        ],
        needed: Decimal::ZERO,
        placed: Decimal::ZERO,
    };

    let mut round = 1;
    loop {
        println!("━━━ Round {} ━━━", round);
        match cnp.solicit_work(&mut operator) {
            RoundOutcome::NoWork => {
                println!("  Nothing left to tender\n");
                break;
            }
            RoundOutcome::NoSolution => {}
            RoundOutcome::Awarded {
                responder,
                completed,
                ..
            } => {
                println!("  Award to {} completed: {}", responder, completed);
            }
        }
        println!("  States: {:?}\n", cnp.transitions());
        round += 1;
    }

    println!("Total placed: {}", operator.placed);
}
