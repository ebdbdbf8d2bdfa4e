use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Int128, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use kitty_common::types::{EventState, ProposalKind};

pub const CONFIG: Item<Config> = Item::new("config");
/// Next event id. Saved once at instantiation, only ever incremented.
pub const EVENT_COUNTER: Item<u64> = Item::new("event_counter");
pub const EVENTS: Map<u64, PoolEvent> = Map::new("events");
/// Per-event contributor ledgers keyed by (event_id, wallet).
pub const PARTICIPANTS: Map<(u64, &Addr), Participant> = Map::new("participants");
/// Proposals keyed by (event_id, index); index comes from `PoolEvent::proposal_count`.
pub const PROPOSALS: Map<(u64, u32), Proposal> = Map::new("proposals");

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_TITLE_LEN: usize = 32;
pub const DEFAULT_MAX_WHITELIST: u32 = 10;
pub const DEFAULT_MAX_SPENDINGS: u32 = 10;
/// Also bounds both vote sets, since only participants may vote.
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 50;
pub const SETTLEMENT_TITLE: &str = "Settlement";

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    /// Native denom every event vault is funded in
    pub denom: String,
    pub max_whitelist: u32,
    pub max_spendings: u32,
    pub max_participants: u32,
}

#[cw_serde]
pub struct PoolEvent {
    pub id: u64,
    pub creator: Addr,
    pub name: String,
    pub deadline: Timestamp,
    pub target_amount: Uint128,
    pub total_contributed: Uint128,
    pub total_spent: Uint128,
    /// Funds held for this event inside the contract balance
    pub vault_balance: Uint128,
    /// Portion of `vault_balance` committed to pending spending proposals
    pub reserved: Uint128,
    /// Empty means anyone may contribute
    pub whitelist: Vec<Addr>,
    /// Receives the disbursed amount of every approved spending proposal
    pub withdraw_address: Addr,
    pub participant_count: u32,
    pub proposal_count: u32,
    pub state: EventState,
    pub created_at: Timestamp,
    /// Index of the settlement proposal that finalized the event
    pub settled_by: Option<u32>,
}

impl PoolEvent {
    pub fn available(&self) -> Uint128 {
        self.vault_balance.saturating_sub(self.reserved)
    }

    /// The creator is always allowed in, even with a whitelist set.
    pub fn is_allowed(&self, wallet: &Addr) -> bool {
        self.whitelist.is_empty() || self.creator == *wallet || self.whitelist.contains(wallet)
    }
}

#[cw_serde]
pub struct Participant {
    pub event_id: u64,
    pub wallet: Addr,
    pub contributed: Uint128,
    pub spent: Uint128,
    /// contributed - spent, written when the event is settled.
    /// Positive: owed a refund. Negative: consumed more than contributed.
    pub net_owed: Option<Int128>,
}

impl Participant {
    pub fn new(event_id: u64, wallet: Addr) -> Self {
        Self {
            event_id,
            wallet,
            contributed: Uint128::zero(),
            spent: Uint128::zero(),
            net_owed: None,
        }
    }
}

/// One entry of a spending split: `wallet` is charged `percentage`% of the amount.
#[cw_serde]
pub struct SpendingShare {
    pub wallet: Addr,
    pub percentage: u8,
}

#[cw_serde]
pub struct Proposal {
    pub event_id: u64,
    pub index: u32,
    pub kind: ProposalKind,
    pub title: String,
    pub creator: Addr,
    /// Zero for settlement proposals
    pub amount: Uint128,
    pub spendings: Vec<SpendingShare>,
    pub deadline: Timestamp,
    pub yes_votes: Vec<Addr>,
    pub no_votes: Vec<Addr>,
    pub cancelled: bool,
    pub settled: bool,
    pub created_at: Timestamp,
}

impl Proposal {
    pub fn has_voted(&self, voter: &Addr) -> bool {
        self.yes_votes.iter().chain(self.no_votes.iter()).any(|v| v == voter)
    }
}
