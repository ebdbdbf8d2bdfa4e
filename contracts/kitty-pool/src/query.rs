use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;
use kitty_common::split::split_by_percentage;

use crate::execute::tally_for;
use crate::msg::{
    EventCounterResponse, EventsResponse, ParticipantsResponse, PayoutEntry, PayoutsResponse,
    ProposalsResponse, TallyResponse, VaultResponse,
};
use crate::state::{CONFIG, EVENTS, EVENT_COUNTER, PARTICIPANTS, PROPOSALS};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_event_counter(deps: Deps) -> StdResult<Binary> {
    let next = EVENT_COUNTER.load(deps.storage)?;
    to_json_binary(&EventCounterResponse { next })
}

pub fn query_event(deps: Deps, event_id: u64) -> StdResult<Binary> {
    let event = EVENTS.load(deps.storage, event_id)?;
    to_json_binary(&event)
}

pub fn query_events(deps: Deps, start_after: Option<u64>, limit: Option<u32>) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let events: Vec<_> = EVENTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, event)| event))
        .collect::<StdResult<_>>()?;

    to_json_binary(&EventsResponse { events })
}

pub fn query_vault(deps: Deps, event_id: u64) -> StdResult<Binary> {
    let event = EVENTS.load(deps.storage, event_id)?;
    to_json_binary(&VaultResponse {
        event_id,
        balance: event.vault_balance,
        reserved: event.reserved,
        available: event.available(),
    })
}

pub fn query_participant(deps: Deps, event_id: u64, wallet: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&wallet)?;
    let participant = PARTICIPANTS.may_load(deps.storage, (event_id, &addr))?;
    to_json_binary(&participant)
}

pub fn query_participants(
    deps: Deps,
    event_id: u64,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_addr = start_after
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?;
    let start = start_addr.as_ref().map(Bound::exclusive);

    let participants: Vec<_> = PARTICIPANTS
        .prefix(event_id)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, participant)| participant))
        .collect::<StdResult<_>>()?;

    to_json_binary(&ParticipantsResponse { participants })
}

pub fn query_proposal(deps: Deps, event_id: u64, index: u32) -> StdResult<Binary> {
    let proposal = PROPOSALS.load(deps.storage, (event_id, index))?;
    to_json_binary(&proposal)
}

pub fn query_proposals(
    deps: Deps,
    event_id: u64,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let proposals: Vec<_> = PROPOSALS
        .prefix(event_id)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, proposal)| proposal))
        .collect::<StdResult<_>>()?;

    to_json_binary(&ProposalsResponse { proposals })
}

/// Current vote counts and the outcome settling would produce at this block.
pub fn query_tally(deps: Deps, env: Env, event_id: u64, index: u32) -> StdResult<Binary> {
    let event = EVENTS.load(deps.storage, event_id)?;
    let proposal = PROPOSALS.load(deps.storage, (event_id, index))?;
    let tally = tally_for(&event, &proposal);

    to_json_binary(&TallyResponse {
        yes: tally.yes,
        no: tally.no,
        eligible: tally.eligible,
        outcome: tally.outcome(env.block.time >= proposal.deadline),
    })
}

/// The per-wallet split an approved spending proposal would charge.
pub fn query_payouts(deps: Deps, event_id: u64, index: u32) -> StdResult<Binary> {
    let proposal = PROPOSALS.load(deps.storage, (event_id, index))?;

    let payouts = if proposal.spendings.is_empty() {
        vec![]
    } else {
        let percentages: Vec<u8> = proposal.spendings.iter().map(|s| s.percentage).collect();
        let amounts = split_by_percentage(proposal.amount, &percentages)
            .map_err(|err| StdError::generic_err(err.to_string()))?;
        proposal
            .spendings
            .into_iter()
            .zip(amounts)
            .map(|(share, amount)| PayoutEntry {
                wallet: share.wallet,
                percentage: share.percentage,
                amount,
            })
            .collect()
    };

    to_json_binary(&PayoutsResponse {
        total: proposal.amount,
        payouts,
    })
}
