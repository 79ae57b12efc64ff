use serde_json::Value;

/// Where a peer session stands in the offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    OfferSent,
    AnswerPending,
    OfferReceived,
    AnswerSent,
    Connected,
    Closed,
    Failed,
}

/// What to do with an inbound candidate.
#[derive(Debug, PartialEq)]
pub enum CandidateAction {
    /// Remote description already applied; hand the candidate to the media
    /// layer now.
    Apply(Value),
    /// No remote description yet; the candidate is buffered until one is
    /// applied.
    Held,
}

/// Per-remote-peer negotiation bookkeeping.
///
/// Transitions are guarded: a transition method returns `false` when the
/// message that triggered it is a duplicate or arrives in a state that does
/// not accept it, and the caller drops the message. The relay broadcasts
/// best-effort, so duplicate offers and answers are expected, not errors.
/// The current state also acts as the mutex against interleaving two
/// negotiation operations on the same session: the flags flip before any
/// asynchronous media-layer call, so a second copy of a message observes
/// the updated state and is rejected.
#[derive(Debug)]
pub struct Negotiation {
    state: NegotiationState,
    remote_applied: bool,
    pending: Vec<Value>,
}

impl Negotiation {
    pub fn new() -> Self {
        Self {
            state: NegotiationState::Idle,
            remote_applied: false,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn remote_applied(&self) -> bool {
        self.remote_applied
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            NegotiationState::Closed | NegotiationState::Failed
        )
    }

    /// Local side starts the exchange. Only valid once, from `Idle`.
    pub fn begin_offer(&mut self) -> bool {
        if self.state != NegotiationState::Idle {
            return false;
        }
        self.state = NegotiationState::OfferSent;
        true
    }

    /// The offer left through the transport; now waiting on the answer.
    pub fn offer_dispatched(&mut self) {
        if self.state == NegotiationState::OfferSent {
            self.state = NegotiationState::AnswerPending;
        }
    }

    /// Remote peer sent an offer. Rejected once a remote description is in
    /// place, which drops duplicate deliveries and stale renegotiations.
    pub fn accept_remote_offer(&mut self) -> bool {
        if self.remote_applied || self.is_terminal() {
            return false;
        }
        self.remote_applied = true;
        self.state = NegotiationState::OfferReceived;
        true
    }

    /// The generated answer left through the transport.
    pub fn answer_dispatched(&mut self) {
        if self.state == NegotiationState::OfferReceived {
            self.state = NegotiationState::AnswerSent;
        }
    }

    /// Remote peer answered our offer. Only the first answer counts; the
    /// session must have an outstanding offer and no remote description.
    pub fn accept_remote_answer(&mut self) -> bool {
        if self.remote_applied {
            return false;
        }
        if !matches!(
            self.state,
            NegotiationState::OfferSent | NegotiationState::AnswerPending
        ) {
            return false;
        }
        self.remote_applied = true;
        self.state = NegotiationState::Connected;
        true
    }

    /// Applying the remote description failed in the media layer. The
    /// session returns to its pre-transition state so a later corrective
    /// message can still be processed.
    pub fn revert_remote(&mut self, previous: NegotiationState) {
        self.state = previous;
        self.remote_applied = false;
    }

    /// An inbound candidate: apply immediately when the remote description
    /// is in place, otherwise hold it.
    pub fn accept_candidate(&mut self, candidate: Value) -> CandidateAction {
        if self.remote_applied {
            CandidateAction::Apply(candidate)
        } else {
            self.pending.push(candidate);
            CandidateAction::Held
        }
    }

    /// Candidates held before the remote description was applied, in the
    /// order they were received. Call after the description is in place.
    pub fn drain_candidates(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.pending)
    }

    /// Media layer reports the link is up.
    pub fn established(&mut self) {
        if matches!(
            self.state,
            NegotiationState::AnswerSent
                | NegotiationState::AnswerPending
                | NegotiationState::Connected
        ) {
            self.state = NegotiationState::Connected;
        }
    }

    pub fn close(&mut self) {
        self.state = NegotiationState::Closed;
    }

    pub fn fail(&mut self) {
        self.state = NegotiationState::Failed;
    }
}

impl Default for Negotiation {
    fn default() -> Self {
        Self::new()
    }
}
