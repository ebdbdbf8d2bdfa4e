use cosmwasm_std::{OverflowError, StdError, Timestamp, Uint128};
use kitty_common::SplitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    Split(#[from] SplitError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("contract already initialized")]
    AlreadyInitialized,

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("event {event_id} not found")]
    EventNotFound { event_id: u64 },

    #[error("proposal {index} not found for event {event_id}")]
    ProposalNotFound { event_id: u64, index: u32 },

    #[error("event {event_id} is not open (state: {state})")]
    EventNotOpen { event_id: u64, state: String },

    #[error("deadline must be in the future (got {deadline}, now {now})")]
    InvalidDeadline { deadline: Timestamp, now: Timestamp },

    #[error("deadline {deadline} has passed")]
    DeadlinePassed { deadline: Timestamp },

    #[error("deadline {deadline} not reached yet")]
    DeadlineNotReached { deadline: Timestamp },

    #[error("target already met: contributed {total_contributed} >= target {target_amount}")]
    TargetMetAlready {
        total_contributed: Uint128,
        target_amount: Uint128,
    },

    #[error("name too long (max {max} bytes)")]
    NameTooLong { max: usize },

    #[error("title too long (max {max} bytes)")]
    TitleTooLong { max: usize },

    #[error("wallet {wallet} is not whitelisted")]
    NotWhitelisted { wallet: String },

    #[error("whitelist is full (max {max} wallets)")]
    WhitelistFull { max: u32 },

    #[error("wallet {wallet} listed more than once")]
    DuplicateWallet { wallet: String },

    #[error("event {event_id} has reached its participant limit of {max}")]
    EventFull { event_id: u64, max: u32 },

    #[error("too many spending entries: {count} (max {max})")]
    TooManySpendings { count: usize, max: u32 },

    #[error("percentages sum to {total}, expected 100")]
    InvalidPercentageSum { total: u32 },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("must send exactly one coin ({denom})")]
    InvalidFunds { denom: String },

    #[error("must send {expected}, got {denom}")]
    WrongDenom { expected: String, denom: String },

    #[error("insufficient vault balance: need {needed}, available {available}")]
    InsufficientVaultBalance { needed: Uint128, available: Uint128 },

    #[error("{voter} already voted on proposal {index}")]
    AlreadyVoted { voter: String, index: u32 },

    #[error("proposal {index} already settled")]
    ProposalAlreadySettled { index: u32 },

    #[error("proposal {index} already cancelled")]
    ProposalAlreadyCancelled { index: u32 },

    #[error("proposal {index} is still undecided (deadline {deadline})")]
    TooEarlyToSettle { index: u32, deadline: Timestamp },

    #[error("proposal {index} was not approved")]
    ProposalNotApproved { index: u32 },

    #[error("proposal {index} is a {actual} proposal, expected {expected}")]
    ProposalKindMismatch {
        index: u32,
        expected: String,
        actual: String,
    },
}
