use cosmwasm_schema::cw_serde;

/// Lifecycle of a pooled event. `Closed` and `Settled` are terminal.
#[cw_serde]
pub enum EventState {
    Open,
    /// Deadline passed below target; vault refunded to the creator.
    Closed,
    /// Net-owed balances finalized by an approved settlement proposal.
    Settled,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Open => "open",
            EventState::Closed => "closed",
            EventState::Settled => "settled",
        }
    }
}

/// What a proposal does when it passes.
#[cw_serde]
pub enum ProposalKind {
    /// Disburse `amount` from the vault, charged to wallets by percentage.
    Spending,
    /// Finalize every participant's net-owed balance and settle the event.
    EventSettle,
}

impl ProposalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalKind::Spending => "spending",
            ProposalKind::EventSettle => "event_settle",
        }
    }
}

/// Result of tallying a proposal's votes at a point in time.
#[cw_serde]
pub enum ProposalOutcome {
    Pending,
    Passed,
    Rejected,
}

impl ProposalOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalOutcome::Pending => "pending",
            ProposalOutcome::Passed => "passed",
            ProposalOutcome::Rejected => "rejected",
        }
    }
}
