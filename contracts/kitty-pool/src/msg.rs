use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128};
use kitty_common::types::ProposalOutcome;

use crate::state::{Config, Participant, PoolEvent, Proposal};

#[cw_serde]
pub struct InstantiateMsg {
    /// Native denom contributions are accepted in, e.g. "uatom"
    pub denom: String,
    pub max_whitelist: Option<u32>,
    pub max_spendings: Option<u32>,
    pub max_participants: Option<u32>,
}

/// A spending split entry as submitted by the creator.
#[cw_serde]
pub struct SpendingInput {
    pub wallet: String,
    pub percentage: u8,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Open a new pooled event. The sender becomes its creator.
    CreateEvent {
        name: String,
        deadline: Timestamp,
        target_amount: Uint128,
        whitelist: Option<Vec<String>>,
        /// Destination of approved spending; defaults to the creator.
        withdraw_address: Option<String>,
    },
    /// Add wallets to the event whitelist. Creator only.
    Whitelist { event_id: u64, wallets: Vec<String> },
    /// Contribute the attached funds to the event vault.
    Contribute { event_id: u64 },
    /// Refund the vault to the creator after an unfunded deadline. Creator only.
    CloseEvent { event_id: u64 },
    /// Propose spending `amount` from the vault. Creator only.
    CreateProposal {
        event_id: u64,
        title: String,
        amount: Uint128,
        spendings: Vec<SpendingInput>,
        deadline: Timestamp,
    },
    /// Vote on a proposal. Event participants only.
    Vote {
        event_id: u64,
        proposal_index: u32,
        approve: bool,
    },
    /// Resolve a proposal: disburse when approved, cancel when rejected.
    SettleProposal { event_id: u64, proposal_index: u32 },
    /// Propose final settlement of the event. Creator only.
    CreateSettleProposal { event_id: u64, deadline: Timestamp },
    /// Finalize every participant's net-owed balance from an approved settlement proposal.
    SettleEvent { event_id: u64, proposal_index: u32 },
    /// Update contract configuration. Admin only.
    UpdateConfig {
        admin: Option<String>,
        max_whitelist: Option<u32>,
        max_spendings: Option<u32>,
        max_participants: Option<u32>,
    },
}

/// Parameters for `CreateEvent`, bundled to keep the handler signature short.
pub struct CreateEventParams {
    pub name: String,
    pub deadline: Timestamp,
    pub target_amount: Uint128,
    pub whitelist: Option<Vec<String>>,
    pub withdraw_address: Option<String>,
}

pub struct CreateProposalParams {
    pub event_id: u64,
    pub title: String,
    pub amount: Uint128,
    pub spendings: Vec<SpendingInput>,
    pub deadline: Timestamp,
}

pub struct UpdateConfigParams {
    pub admin: Option<String>,
    pub max_whitelist: Option<u32>,
    pub max_spendings: Option<u32>,
    pub max_participants: Option<u32>,
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(EventCounterResponse)]
    EventCounter {},
    #[returns(PoolEvent)]
    Event { event_id: u64 },
    #[returns(EventsResponse)]
    Events {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(VaultResponse)]
    Vault { event_id: u64 },
    #[returns(Option<Participant>)]
    Participant { event_id: u64, wallet: String },
    #[returns(ParticipantsResponse)]
    Participants {
        event_id: u64,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(Proposal)]
    Proposal { event_id: u64, index: u32 },
    #[returns(ProposalsResponse)]
    Proposals {
        event_id: u64,
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(TallyResponse)]
    Tally { event_id: u64, index: u32 },
    #[returns(PayoutsResponse)]
    Payouts { event_id: u64, index: u32 },
}

#[cw_serde]
pub struct EventCounterResponse {
    pub next: u64,
}

#[cw_serde]
pub struct EventsResponse {
    pub events: Vec<PoolEvent>,
}

#[cw_serde]
pub struct VaultResponse {
    pub event_id: u64,
    pub balance: Uint128,
    pub reserved: Uint128,
    pub available: Uint128,
}

#[cw_serde]
pub struct ParticipantsResponse {
    pub participants: Vec<Participant>,
}

#[cw_serde]
pub struct ProposalsResponse {
    pub proposals: Vec<Proposal>,
}

#[cw_serde]
pub struct TallyResponse {
    pub yes: u32,
    pub no: u32,
    pub eligible: u32,
    /// Outcome if the proposal were settled at the queried block time
    pub outcome: ProposalOutcome,
}

#[cw_serde]
pub struct PayoutEntry {
    pub wallet: Addr,
    pub percentage: u8,
    pub amount: Uint128,
}

#[cw_serde]
pub struct PayoutsResponse {
    pub total: Uint128,
    pub payouts: Vec<PayoutEntry>,
}
