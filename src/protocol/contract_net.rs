use crate::protocol::proposal::Proposal;
use log::{debug, info, trace, warn};
use std::collections::VecDeque;
use std::fmt;

/// Position of a responder in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponderId(pub usize);

impl fmt::Display for ResponderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "responder-{}", self.0)
    }
}

/// Domain hooks supplied by whoever embeds a negotiation round.
pub trait Initiator<P: Proposal> {
    /// Description of the work to put out to tender, or `None` when there
    /// is nothing to do this round.
    fn work_unit_description(&mut self) -> Option<P>;

    /// Choose the winner among `proposals` for `description`, or `None` if
    /// none is acceptable.
    fn find_best_proposal(&mut self, proposals: &[P], description: &P) -> Option<P>;

    /// Adjust the winning proposal before it is confirmed, e.g. to scope it
    /// down to exactly the amount that is needed.
    fn update_work_description(&mut self, best: &P) -> P {
        best.clone()
    }

    /// The awarded responder reported the work as done.
    fn notify_work_done(&mut self, proposal: &P);

    /// The round ended without a winner.
    fn signal_no_solution_found(&mut self);
}

/// Reply to a call for proposals.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer<P> {
    Refuse,
    Propose(P),
}

/// Reply to an award.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<P> {
    Done(P),
    Failure,
}

/// A party that bids on work.
pub trait Responder<P: Proposal> {
    fn call_for_proposal(&mut self, description: &P) -> Answer<P>;

    /// The responder's proposal won; perform the (possibly rescoped) work.
    fn accept_proposal(&mut self, award: &P) -> Completion<P>;

    /// The responder's proposal lost.
    fn reject_proposal(&mut self, _proposal: &P) {}
}

/// Messages exchanged during a round, in Contract-Net vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<P> {
    CallForProposal { to: ResponderId, description: P },
    Refuse { from: ResponderId },
    Propose { from: ResponderId, proposal: P },
    RejectProposal { to: ResponderId, proposal: P },
    AcceptProposal { to: ResponderId, proposal: P },
    InformDone { from: ResponderId, proposal: P },
    Failure { from: ResponderId },
}

/// Where a round currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    Idle,
    Soliciting,
    Collecting,
    Evaluating,
    Confirming,
    NoSolution,
}

/// How a round ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome<P> {
    /// The initiator had no work to put out.
    NoWork,
    /// Nobody proposed, or no proposal was acceptable.
    NoSolution,
    /// A responder was awarded `proposal`. `completed` is `false` when it
    /// reported failure afterwards.
    Awarded {
        responder: ResponderId,
        proposal: P,
        completed: bool,
    },
}

/// Synchronous Contract-Net engine.
///
/// A round runs entirely inside [`ContractNet::solicit_work`]: the call for
/// proposals goes to every responder in registration order, replies are
/// counted until all responders have answered, the initiator picks a
/// winner, losers are rejected and the winner is confirmed. Messages move
/// through an internal queue, so the states visited and the messages sent
/// in the last round stay inspectable afterwards.
///
/// # Examples
///
/// ```
/// use gridflex::protocol::contract_net::{
///     Answer, Completion, ContractNet, Initiator, Responder, RoundOutcome,
/// };
/// use gridflex::protocol::proposal::WorkProposal;
/// use gridflex::protocol::scoring::closest_to_target;
/// use rust_decimal_macros::dec;
///
/// struct Bidder(rust_decimal::Decimal);
///
/// impl Responder<WorkProposal> for Bidder {
///     fn call_for_proposal(&mut self, _: &WorkProposal) -> Answer<WorkProposal> {
///         Answer::Propose(WorkProposal::new("bid", self.0))
///     }
///     fn accept_proposal(&mut self, award: &WorkProposal) -> Completion<WorkProposal> {
///         Completion::Done(award.clone())
///     }
/// }
///
/// struct Operator;
///
/// impl Initiator<WorkProposal> for Operator {
///     fn work_unit_description(&mut self) -> Option<WorkProposal> {
///         Some(WorkProposal::new("absorb", dec!(100)))
///     }
///     fn find_best_proposal(
///         &mut self,
///         proposals: &[WorkProposal],
///         description: &WorkProposal,
///     ) -> Option<WorkProposal> {
///         closest_to_target(proposals, description)
///     }
///     fn notify_work_done(&mut self, _: &WorkProposal) {}
///     fn signal_no_solution_found(&mut self) {}
/// }
///
/// let mut cnp = ContractNet::new();
/// cnp.register_responder(Bidder(dec!(60)));
/// cnp.register_responder(Bidder(dec!(110)));
///
/// match cnp.solicit_work(&mut Operator) {
///     RoundOutcome::Awarded { responder, .. } => assert_eq!(responder.0, 1),
///     other => panic!("unexpected outcome {:?}", other),
/// }
/// ```
pub struct ContractNet<P: Proposal> {
    responders: Vec<Box<dyn Responder<P>>>,
    state: ProtocolState,
    queue: VecDeque<Message<P>>,
    description: Option<P>,
    proposals: Vec<(ResponderId, P)>,
    message_count: usize,
    award: Option<(ResponderId, P)>,
    outcome: Option<RoundOutcome<P>>,
    transitions: Vec<ProtocolState>,
    pending: Vec<usize>,
    transcript: Vec<Message<P>>,
}

impl<P: Proposal> Default for ContractNet<P> {
    fn default() -> Self {
        Self {
            responders: Vec::new(),
            state: ProtocolState::Idle,
            queue: VecDeque::new(),
            description: None,
            proposals: Vec::new(),
            message_count: 0,
            award: None,
            outcome: None,
            transitions: Vec::new(),
            pending: Vec::new(),
            transcript: Vec::new(),
        }
    }
}

impl<P: Proposal> ContractNet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_responder<R: Responder<P> + 'static>(&mut self, responder: R) -> ResponderId {
        self.responders.push(Box::new(responder));
        ResponderId(self.responders.len() - 1)
    }

    pub fn responder_count(&self) -> usize {
        self.responders.len()
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// States entered during the last round, ending with `Idle`.
    pub fn transitions(&self) -> &[ProtocolState] {
        &self.transitions
    }

    /// Every message of the last round, in processing order.
    pub fn transcript(&self) -> &[Message<P>] {
        &self.transcript
    }

    /// Responders still owing an answer when each state of
    /// [`ContractNet::transitions`] was entered, index for index.
    pub fn pending_responses(&self) -> &[usize] {
        &self.pending
    }

    /// Run one negotiation round.
    ///
    /// Asks `initiator` for a work description first; without one nothing
    /// is sent and [`RoundOutcome::NoWork`] is returned.
    pub fn solicit_work<I>(&mut self, initiator: &mut I) -> RoundOutcome<P>
    where
        I: Initiator<P> + ?Sized,
    {
        self.reset();
        let Some(description) = initiator.work_unit_description() else {
            return RoundOutcome::NoWork;
        };

        debug!(
            "Soliciting {:?} from {} responders",
            description,
            self.responders.len()
        );
        self.enter(ProtocolState::Soliciting);
        for i in 0..self.responders.len() {
            self.queue.push_back(Message::CallForProposal {
                to: ResponderId(i),
                description: description.clone(),
            });
        }
        self.description = Some(description);
        self.enter(ProtocolState::Collecting);

        // With nobody to ask, every answer is already in.
        if self.responders.is_empty() {
            self.evaluate(initiator);
        }
        while let Some(message) = self.queue.pop_front() {
            trace!("Processing {:?}", message);
            self.transcript.push(message.clone());
            self.handle(message, initiator);
        }

        self.enter(ProtocolState::Idle);
        self.outcome.take().unwrap_or(RoundOutcome::NoSolution)
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.description = None;
        self.proposals.clear();
        self.message_count = 0;
        self.award = None;
        self.outcome = None;
        self.transitions.clear();
        self.pending.clear();
        self.transcript.clear();
    }

    fn enter(&mut self, state: ProtocolState) {
        trace!("Contract-net state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.transitions.push(state);
        self.pending
            .push(self.responders.len().saturating_sub(self.message_count));
    }

    fn handle<I>(&mut self, message: Message<P>, initiator: &mut I)
    where
        I: Initiator<P> + ?Sized,
    {
        match message {
            Message::CallForProposal { to, description } => {
                let reply = match self.responders[to.0].call_for_proposal(&description) {
                    Answer::Refuse => Message::Refuse { from: to },
                    Answer::Propose(proposal) => Message::Propose { from: to, proposal },
                };
                self.queue.push_back(reply);
            }
            Message::Refuse { .. } => {
                self.message_count += 1;
                self.check_all_answered(initiator);
            }
            Message::Propose { from, proposal } => {
                self.message_count += 1;
                self.proposals.push((from, proposal));
                self.check_all_answered(initiator);
            }
            Message::RejectProposal { to, proposal } => {
                self.responders[to.0].reject_proposal(&proposal);
            }
            Message::AcceptProposal { to, proposal } => {
                let reply = match self.responders[to.0].accept_proposal(&proposal) {
                    Completion::Done(done) => Message::InformDone {
                        from: to,
                        proposal: done,
                    },
                    Completion::Failure => Message::Failure { from: to },
                };
                self.queue.push_back(reply);
            }
            Message::InformDone { from, proposal } => {
                initiator.notify_work_done(&proposal);
                self.finish_award(from, true);
            }
            Message::Failure { from } => {
                // Failure after confirmation is not escalated to the initiator.
                debug!("{} reported failure on its award", from);
                self.finish_award(from, false);
            }
        }
    }

    fn check_all_answered<I>(&mut self, initiator: &mut I)
    where
        I: Initiator<P> + ?Sized,
    {
        if self.message_count == self.responders.len() {
            self.evaluate(initiator);
        }
    }

    fn evaluate<I>(&mut self, initiator: &mut I)
    where
        I: Initiator<P> + ?Sized,
    {
        self.enter(ProtocolState::Evaluating);
        let Some(description) = self.description.clone() else {
            return;
        };
        if self.proposals.is_empty() {
            self.no_solution(initiator);
            return;
        }

        let candidates: Vec<P> = self.proposals.iter().map(|(_, p)| p.clone()).collect();
        let Some(best) = initiator.find_best_proposal(&candidates, &description) else {
            self.no_solution(initiator);
            return;
        };
        let Some(winner) = candidates.iter().position(|p| *p == best) else {
            warn!("Selected proposal {:?} was never proposed", best);
            self.no_solution(initiator);
            return;
        };

        for (i, (to, proposal)) in self.proposals.iter().enumerate() {
            if i != winner {
                self.queue.push_back(Message::RejectProposal {
                    to: *to,
                    proposal: proposal.clone(),
                });
            }
        }
        let (to, _) = self.proposals[winner];
        let award = initiator.update_work_description(&best);
        info!("Awarding {:?} to {}", award, to);
        self.queue.push_back(Message::AcceptProposal {
            to,
            proposal: award.clone(),
        });
        self.award = Some((to, award));
        self.enter(ProtocolState::Confirming);
    }

    fn no_solution<I>(&mut self, initiator: &mut I)
    where
        I: Initiator<P> + ?Sized,
    {
        self.enter(ProtocolState::NoSolution);
        debug!("No solution found for {:?}", self.description);
        initiator.signal_no_solution_found();
        self.outcome = Some(RoundOutcome::NoSolution);
    }

    fn finish_award(&mut self, from: ResponderId, completed: bool) {
        if let Some((responder, proposal)) = self.award.take() {
            debug_assert_eq!(responder, from);
            self.outcome = Some(RoundOutcome::Awarded {
                responder,
                proposal,
                completed,
            });
        }
    }
}
