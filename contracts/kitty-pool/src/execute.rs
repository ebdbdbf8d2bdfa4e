use cosmwasm_std::{
    coins, to_json_binary, Addr, Api, BankMsg, DepsMut, Env, Event, Int128, MessageInfo, Order,
    Response, StdError, StdResult, Storage, Timestamp, Uint128,
};
use kitty_common::split::{percentage_sum, split_by_percentage, SplitError, PERCENT_TOTAL};
use kitty_common::tally::Tally;
use kitty_common::types::{EventState, ProposalKind, ProposalOutcome};

use crate::error::ContractError;
use crate::msg::{CreateEventParams, CreateProposalParams, SpendingInput, UpdateConfigParams};
use crate::state::{
    Config, Participant, PoolEvent, Proposal, SpendingShare, CONFIG, EVENTS, EVENT_COUNTER,
    MAX_NAME_LEN, MAX_TITLE_LEN, PARTICIPANTS, PROPOSALS, SETTLEMENT_TITLE,
};

pub(crate) fn load_event(storage: &dyn Storage, event_id: u64) -> Result<PoolEvent, ContractError> {
    EVENTS
        .may_load(storage, event_id)?
        .ok_or(ContractError::EventNotFound { event_id })
}

pub(crate) fn load_proposal(
    storage: &dyn Storage,
    event_id: u64,
    index: u32,
) -> Result<Proposal, ContractError> {
    PROPOSALS
        .may_load(storage, (event_id, index))?
        .ok_or(ContractError::ProposalNotFound { event_id, index })
}

/// Votes on `proposal` measured against the event's current participant set.
pub(crate) fn tally_for(event: &PoolEvent, proposal: &Proposal) -> Tally {
    Tally::new(
        proposal.yes_votes.len(),
        proposal.no_votes.len(),
        event.participant_count,
    )
}

fn ensure_creator(event: &PoolEvent, sender: &Addr, reason: &str) -> Result<(), ContractError> {
    if *sender != event.creator {
        return Err(ContractError::Unauthorized {
            reason: reason.to_string(),
        });
    }
    Ok(())
}

fn ensure_open(event: &PoolEvent) -> Result<(), ContractError> {
    if event.state != EventState::Open {
        return Err(ContractError::EventNotOpen {
            event_id: event.id,
            state: event.state.as_str().to_string(),
        });
    }
    Ok(())
}

fn ensure_future(env: &Env, deadline: Timestamp) -> Result<(), ContractError> {
    if deadline <= env.block.time {
        return Err(ContractError::InvalidDeadline {
            deadline,
            now: env.block.time,
        });
    }
    Ok(())
}

fn ensure_unresolved(proposal: &Proposal) -> Result<(), ContractError> {
    if proposal.settled {
        return Err(ContractError::ProposalAlreadySettled {
            index: proposal.index,
        });
    }
    if proposal.cancelled {
        return Err(ContractError::ProposalAlreadyCancelled {
            index: proposal.index,
        });
    }
    Ok(())
}

/// Validate addresses and drop repeats, keeping first-seen order.
fn validate_wallet_set(api: &dyn Api, wallets: &[String]) -> StdResult<Vec<Addr>> {
    let mut out: Vec<Addr> = Vec::with_capacity(wallets.len());
    for wallet in wallets {
        let addr = api.addr_validate(wallet)?;
        if !out.contains(&addr) {
            out.push(addr);
        }
    }
    Ok(out)
}

/// Exactly one coin of the configured denom, non-zero.
fn must_pay(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    if info.funds.is_empty() {
        return Err(ContractError::InvalidAmount);
    }
    if info.funds.len() != 1 {
        return Err(ContractError::InvalidFunds {
            denom: denom.to_string(),
        });
    }
    let sent = &info.funds[0];
    if sent.denom != denom {
        return Err(ContractError::WrongDenom {
            expected: denom.to_string(),
            denom: sent.denom.clone(),
        });
    }
    if sent.amount.is_zero() {
        return Err(ContractError::InvalidAmount);
    }
    Ok(sent.amount)
}

fn net_owed(participant: &Participant) -> Result<Int128, ContractError> {
    let contributed = i128::try_from(participant.contributed.u128())
        .map_err(|_| StdError::generic_err("contributed amount exceeds signed range"))?;
    let spent = i128::try_from(participant.spent.u128())
        .map_err(|_| StdError::generic_err("spent amount exceeds signed range"))?;
    Ok(Int128::new(contributed).checked_sub(Int128::new(spent))?)
}

/// Open a new pooled event. The id comes from the global counter.
pub fn create_event(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateEventParams,
) -> Result<Response, ContractError> {
    let CreateEventParams {
        name,
        deadline,
        target_amount,
        whitelist,
        withdraw_address,
    } = params;

    let config = CONFIG.load(deps.storage)?;

    if name.len() > MAX_NAME_LEN {
        return Err(ContractError::NameTooLong { max: MAX_NAME_LEN });
    }
    ensure_future(&env, deadline)?;
    if target_amount.is_zero() {
        return Err(ContractError::InvalidAmount);
    }

    let whitelist = validate_wallet_set(deps.api, &whitelist.unwrap_or_default())?;
    if whitelist.len() > config.max_whitelist as usize {
        return Err(ContractError::WhitelistFull {
            max: config.max_whitelist,
        });
    }

    let withdraw_address = match withdraw_address {
        Some(addr) => deps.api.addr_validate(&addr)?,
        None => info.sender.clone(),
    };

    let event_id = EVENT_COUNTER.load(deps.storage)?;
    let next = event_id
        .checked_add(1)
        .ok_or_else(|| StdError::generic_err("event counter overflow"))?;

    let event = PoolEvent {
        id: event_id,
        creator: info.sender.clone(),
        name: name.clone(),
        deadline,
        target_amount,
        total_contributed: Uint128::zero(),
        total_spent: Uint128::zero(),
        vault_balance: Uint128::zero(),
        reserved: Uint128::zero(),
        whitelist,
        withdraw_address,
        participant_count: 0,
        proposal_count: 0,
        state: EventState::Open,
        created_at: env.block.time,
        settled_by: None,
    };
    EVENTS.save(deps.storage, event_id, &event)?;
    EVENT_COUNTER.save(deps.storage, &next)?;

    Ok(Response::new()
        .set_data(to_json_binary(&event_id)?)
        .add_attribute("action", "create_event")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("creator", info.sender.to_string())
        .add_event(
            Event::new("kitty_event_created")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("creator", info.sender.to_string())
                .add_attribute("name", name)
                .add_attribute("deadline", deadline.seconds().to_string())
                .add_attribute("target_amount", target_amount.to_string())
                .add_attribute("whitelist_size", event.whitelist.len().to_string()),
        ))
}

/// Add wallets to an event's whitelist. Creator only.
/// Wallets already present are skipped, not rejected.
pub fn whitelist(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    event_id: u64,
    wallets: Vec<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut event = load_event(deps.storage, event_id)?;

    ensure_creator(
        &event,
        &info.sender,
        "only the event creator can update the whitelist",
    )?;
    ensure_open(&event)?;

    let added: Vec<Addr> = validate_wallet_set(deps.api, &wallets)?
        .into_iter()
        .filter(|addr| !event.whitelist.contains(addr))
        .collect();

    // Lowered caps only bind new additions.
    if !added.is_empty()
        && event.whitelist.len() + added.len() > config.max_whitelist as usize
    {
        return Err(ContractError::WhitelistFull {
            max: config.max_whitelist,
        });
    }

    event.whitelist.extend(added.iter().cloned());
    EVENTS.save(deps.storage, event_id, &event)?;

    Ok(Response::new()
        .add_attribute("action", "whitelist")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("added", added.len().to_string())
        .add_event(
            Event::new("kitty_whitelist_updated")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute(
                    "added",
                    added
                        .iter()
                        .map(Addr::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                )
                .add_attribute("whitelist_size", event.whitelist.len().to_string()),
        ))
}

/// Contribute the attached funds to the event vault.
pub fn contribute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    event_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut event = load_event(deps.storage, event_id)?;

    ensure_open(&event)?;
    if env.block.time >= event.deadline {
        return Err(ContractError::DeadlinePassed {
            deadline: event.deadline,
        });
    }
    let amount = must_pay(&info, &config.denom)?;
    if !event.is_allowed(&info.sender) {
        return Err(ContractError::NotWhitelisted {
            wallet: info.sender.to_string(),
        });
    }

    let existing = PARTICIPANTS.may_load(deps.storage, (event_id, &info.sender))?;
    let is_new = existing.is_none();
    if is_new && event.participant_count >= config.max_participants {
        return Err(ContractError::EventFull {
            event_id,
            max: config.max_participants,
        });
    }

    let mut participant = existing.unwrap_or_else(|| Participant::new(event_id, info.sender.clone()));
    participant.contributed = participant.contributed.checked_add(amount)?;

    event.total_contributed = event.total_contributed.checked_add(amount)?;
    event.vault_balance = event.vault_balance.checked_add(amount)?;
    if is_new {
        event.participant_count += 1;
    }

    PARTICIPANTS.save(deps.storage, (event_id, &info.sender), &participant)?;
    EVENTS.save(deps.storage, event_id, &event)?;

    Ok(Response::new()
        .add_attribute("action", "contribute")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("contributor", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("kitty_contribution")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("contributor", info.sender.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("contributed", participant.contributed.to_string())
                .add_attribute("total_contributed", event.total_contributed.to_string())
                .add_attribute("new_participant", is_new.to_string()),
        ))
}

/// Close an event that missed its target: refund the vault to the creator.
/// Creator only, after the deadline.
pub fn close_event(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    event_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut event = load_event(deps.storage, event_id)?;

    ensure_creator(&event, &info.sender, "only the event creator can close it")?;
    ensure_open(&event)?;

    if env.block.time < event.deadline {
        return Err(ContractError::DeadlineNotReached {
            deadline: event.deadline,
        });
    }
    // A funded event is wound down through proposals and settlement instead.
    if event.total_contributed >= event.target_amount {
        return Err(ContractError::TargetMetAlready {
            total_contributed: event.total_contributed,
            target_amount: event.target_amount,
        });
    }

    let refund = event.vault_balance;
    event.vault_balance = Uint128::zero();
    event.reserved = Uint128::zero();
    event.state = EventState::Closed;
    EVENTS.save(deps.storage, event_id, &event)?;

    let mut response = Response::new()
        .add_attribute("action", "close_event")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("refund", refund.to_string());

    if !refund.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: event.creator.to_string(),
            amount: coins(refund.u128(), config.denom),
        });
    }

    Ok(response.add_event(
        Event::new("kitty_event_closed")
            .add_attribute("event_id", event_id.to_string())
            .add_attribute("refund", refund.to_string())
            .add_attribute("refunded_to", event.creator.to_string())
            .add_attribute("total_contributed", event.total_contributed.to_string())
            .add_attribute("target_amount", event.target_amount.to_string()),
    ))
}

/// Propose spending from the vault, charged to wallets by percentage. Creator only.
/// The amount is reserved against the vault until the proposal resolves.
pub fn create_proposal(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: CreateProposalParams,
) -> Result<Response, ContractError> {
    let CreateProposalParams {
        event_id,
        title,
        amount,
        spendings,
        deadline,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    let mut event = load_event(deps.storage, event_id)?;

    ensure_creator(
        &event,
        &info.sender,
        "only the event creator can create proposals",
    )?;
    ensure_open(&event)?;

    if title.len() > MAX_TITLE_LEN {
        return Err(ContractError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    ensure_future(&env, deadline)?;
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount);
    }

    let shares = validate_spendings(deps.api, &spendings, config.max_spendings)?;

    // Wallets charged by the split that have no ledger yet get one now, so
    // their participant slots are held until payout.
    let storage: &dyn Storage = deps.storage;
    let new_wallets: Vec<Addr> = shares
        .iter()
        .filter(|s| !PARTICIPANTS.has(storage, (event_id, &s.wallet)))
        .map(|s| s.wallet.clone())
        .collect();
    let new_count = new_wallets.len() as u32;
    if new_count > 0 && event.participant_count + new_count > config.max_participants {
        return Err(ContractError::EventFull {
            event_id,
            max: config.max_participants,
        });
    }

    let available = event.available();
    if amount > available {
        return Err(ContractError::InsufficientVaultBalance {
            needed: amount,
            available,
        });
    }

    let index = event.proposal_count;
    event.proposal_count = index
        .checked_add(1)
        .ok_or_else(|| StdError::generic_err("proposal counter overflow"))?;
    event.reserved = event.reserved.checked_add(amount)?;
    event.participant_count += new_count;

    let proposal = Proposal {
        event_id,
        index,
        kind: ProposalKind::Spending,
        title: title.clone(),
        creator: info.sender.clone(),
        amount,
        spendings: shares,
        deadline,
        yes_votes: vec![],
        no_votes: vec![],
        cancelled: false,
        settled: false,
        created_at: env.block.time,
    };
    for wallet in &new_wallets {
        PARTICIPANTS.save(
            deps.storage,
            (event_id, wallet),
            &Participant::new(event_id, wallet.clone()),
        )?;
    }
    PROPOSALS.save(deps.storage, (event_id, index), &proposal)?;
    EVENTS.save(deps.storage, event_id, &event)?;

    Ok(Response::new()
        .set_data(to_json_binary(&index)?)
        .add_attribute("action", "create_proposal")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("proposal_index", index.to_string())
        .add_event(
            Event::new("kitty_proposal_created")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("proposal_index", index.to_string())
                .add_attribute("kind", ProposalKind::Spending.as_str())
                .add_attribute("title", title)
                .add_attribute("amount", amount.to_string())
                .add_attribute("deadline", deadline.seconds().to_string())
                .add_attribute("reserved", event.reserved.to_string())
                .add_attribute("new_participants", new_count.to_string()),
        ))
}

fn validate_spendings(
    api: &dyn Api,
    spendings: &[SpendingInput],
    max_spendings: u32,
) -> Result<Vec<SpendingShare>, ContractError> {
    if spendings.len() > max_spendings as usize {
        return Err(ContractError::TooManySpendings {
            count: spendings.len(),
            max: max_spendings,
        });
    }

    let mut shares: Vec<SpendingShare> = Vec::with_capacity(spendings.len());
    for entry in spendings {
        let wallet = api.addr_validate(&entry.wallet)?;
        if shares.iter().any(|s| s.wallet == wallet) {
            return Err(ContractError::DuplicateWallet {
                wallet: wallet.to_string(),
            });
        }
        shares.push(SpendingShare {
            wallet,
            percentage: entry.percentage,
        });
    }

    let percentages: Vec<u8> = shares.iter().map(|s| s.percentage).collect();
    let total = percentage_sum(&percentages);
    if shares.is_empty() || total != PERCENT_TOTAL {
        return Err(ContractError::InvalidPercentageSum { total });
    }

    Ok(shares)
}

/// Propose final settlement of the event. Creator only.
pub fn create_settle_proposal(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    event_id: u64,
    deadline: Timestamp,
) -> Result<Response, ContractError> {
    let mut event = load_event(deps.storage, event_id)?;

    ensure_creator(
        &event,
        &info.sender,
        "only the event creator can propose settlement",
    )?;
    ensure_open(&event)?;
    ensure_future(&env, deadline)?;

    let index = event.proposal_count;
    event.proposal_count = index
        .checked_add(1)
        .ok_or_else(|| StdError::generic_err("proposal counter overflow"))?;

    let proposal = Proposal {
        event_id,
        index,
        kind: ProposalKind::EventSettle,
        title: SETTLEMENT_TITLE.to_string(),
        creator: info.sender.clone(),
        amount: Uint128::zero(),
        spendings: vec![],
        deadline,
        yes_votes: vec![],
        no_votes: vec![],
        cancelled: false,
        settled: false,
        created_at: env.block.time,
    };
    PROPOSALS.save(deps.storage, (event_id, index), &proposal)?;
    EVENTS.save(deps.storage, event_id, &event)?;

    Ok(Response::new()
        .set_data(to_json_binary(&index)?)
        .add_attribute("action", "create_settle_proposal")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("proposal_index", index.to_string())
        .add_event(
            Event::new("kitty_proposal_created")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("proposal_index", index.to_string())
                .add_attribute("kind", ProposalKind::EventSettle.as_str())
                .add_attribute("deadline", deadline.seconds().to_string()),
        ))
}

/// Cast a yes/no vote. Only recorded participants of the event may vote, once.
pub fn vote(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    event_id: u64,
    proposal_index: u32,
    approve: bool,
) -> Result<Response, ContractError> {
    let event = load_event(deps.storage, event_id)?;
    ensure_open(&event)?;

    let mut proposal = load_proposal(deps.storage, event_id, proposal_index)?;
    ensure_unresolved(&proposal)?;

    if env.block.time >= proposal.deadline {
        return Err(ContractError::DeadlinePassed {
            deadline: proposal.deadline,
        });
    }
    if !PARTICIPANTS.has(deps.storage, (event_id, &info.sender)) {
        return Err(ContractError::Unauthorized {
            reason: "only event participants can vote".to_string(),
        });
    }
    if proposal.has_voted(&info.sender) {
        return Err(ContractError::AlreadyVoted {
            voter: info.sender.to_string(),
            index: proposal_index,
        });
    }

    if approve {
        proposal.yes_votes.push(info.sender.clone());
    } else {
        proposal.no_votes.push(info.sender.clone());
    }
    PROPOSALS.save(deps.storage, (event_id, proposal_index), &proposal)?;

    let tally = tally_for(&event, &proposal);

    Ok(Response::new()
        .add_attribute("action", "vote")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("proposal_index", proposal_index.to_string())
        .add_attribute("voter", info.sender.to_string())
        .add_attribute("approve", approve.to_string())
        .add_event(
            Event::new("kitty_vote_cast")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("proposal_index", proposal_index.to_string())
                .add_attribute("voter", info.sender.to_string())
                .add_attribute("approve", approve.to_string())
                .add_attribute("yes", tally.yes.to_string())
                .add_attribute("no", tally.no.to_string())
                .add_attribute("eligible", tally.eligible.to_string())
                .add_attribute("remaining", tally.remaining().to_string()),
        ))
}

/// Resolve a proposal once its vote is decided or its deadline has passed.
///
/// Approved spending: the amount leaves the vault to the event's withdraw
/// address and each listed wallet's `spent` grows by its share. Rejected
/// proposals of either kind are cancelled and release their reservation.
/// An approved settlement proposal must go through `settle_event`.
pub fn settle_proposal(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    event_id: u64,
    proposal_index: u32,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut event = load_event(deps.storage, event_id)?;
    ensure_open(&event)?;

    let mut proposal = load_proposal(deps.storage, event_id, proposal_index)?;
    ensure_unresolved(&proposal)?;

    let tally = tally_for(&event, &proposal);
    match tally.outcome(env.block.time >= proposal.deadline) {
        ProposalOutcome::Pending => Err(ContractError::TooEarlyToSettle {
            index: proposal_index,
            deadline: proposal.deadline,
        }),
        ProposalOutcome::Rejected => {
            if proposal.kind == ProposalKind::Spending {
                event.reserved = event.reserved.checked_sub(proposal.amount)?;
            }
            proposal.cancelled = true;
            PROPOSALS.save(deps.storage, (event_id, proposal_index), &proposal)?;
            EVENTS.save(deps.storage, event_id, &event)?;

            Ok(Response::new()
                .add_attribute("action", "settle_proposal")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("proposal_index", proposal_index.to_string())
                .add_attribute("outcome", ProposalOutcome::Rejected.as_str())
                .add_event(
                    Event::new("kitty_proposal_cancelled")
                        .add_attribute("event_id", event_id.to_string())
                        .add_attribute("proposal_index", proposal_index.to_string())
                        .add_attribute("kind", proposal.kind.as_str())
                        .add_attribute("yes", tally.yes.to_string())
                        .add_attribute("no", tally.no.to_string())
                        .add_attribute("released", proposal.amount.to_string()),
                ))
        }
        ProposalOutcome::Passed => match proposal.kind {
            ProposalKind::EventSettle => Err(ContractError::ProposalKindMismatch {
                index: proposal_index,
                expected: ProposalKind::Spending.as_str().to_string(),
                actual: ProposalKind::EventSettle.as_str().to_string(),
            }),
            ProposalKind::Spending => disburse(deps, &config, &mut event, &mut proposal, tally),
        },
    }
}

fn disburse(
    deps: DepsMut,
    config: &Config,
    event: &mut PoolEvent,
    proposal: &mut Proposal,
    tally: Tally,
) -> Result<Response, ContractError> {
    let event_id = event.id;
    let amount = proposal.amount;

    let percentages: Vec<u8> = proposal.spendings.iter().map(|s| s.percentage).collect();
    let payouts = split_by_percentage(amount, &percentages).map_err(|err| match err {
        SplitError::InvalidPercentageSum { total } => ContractError::InvalidPercentageSum { total },
        other => ContractError::Split(other),
    })?;

    // Listed wallets got their ledgers when the proposal was created. Every
    // ledger is read and updated in memory before the first write.
    let mut ledgers: Vec<Participant> = Vec::with_capacity(payouts.len());
    for (share, payout) in proposal.spendings.iter().zip(payouts.iter()) {
        let mut participant = PARTICIPANTS.load(deps.storage, (event_id, &share.wallet))?;
        participant.spent = participant.spent.checked_add(*payout)?;
        ledgers.push(participant);
    }

    if amount > event.vault_balance {
        return Err(ContractError::InsufficientVaultBalance {
            needed: amount,
            available: event.vault_balance,
        });
    }

    event.vault_balance -= amount;
    event.reserved = event.reserved.saturating_sub(amount);
    event.total_spent = event.total_spent.checked_add(amount)?;
    proposal.settled = true;

    for participant in &ledgers {
        PARTICIPANTS.save(deps.storage, (event_id, &participant.wallet), participant)?;
    }
    PROPOSALS.save(deps.storage, (event_id, proposal.index), proposal)?;
    EVENTS.save(deps.storage, event_id, event)?;

    let split = proposal
        .spendings
        .iter()
        .zip(payouts.iter())
        .map(|(share, payout)| format!("{}:{}", share.wallet, payout))
        .collect::<Vec<_>>()
        .join(",");

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: event.withdraw_address.to_string(),
            amount: coins(amount.u128(), config.denom.as_str()),
        })
        .add_attribute("action", "settle_proposal")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("proposal_index", proposal.index.to_string())
        .add_attribute("outcome", ProposalOutcome::Passed.as_str())
        .add_event(
            Event::new("kitty_proposal_settled")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("proposal_index", proposal.index.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("paid_to", event.withdraw_address.to_string())
                .add_attribute("split", split)
                .add_attribute("yes", tally.yes.to_string())
                .add_attribute("no", tally.no.to_string())
                .add_attribute("vault_balance", event.vault_balance.to_string()),
        ))
}

/// Finalize the event from an approved settlement proposal.
///
/// Writes `net_owed = contributed - spent` on every participant and moves the
/// event to `Settled`. No funds move; the vault keeps whatever spending left.
pub fn settle_event(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    event_id: u64,
    proposal_index: u32,
) -> Result<Response, ContractError> {
    let mut event = load_event(deps.storage, event_id)?;
    ensure_open(&event)?;

    let mut proposal = load_proposal(deps.storage, event_id, proposal_index)?;
    if proposal.kind != ProposalKind::EventSettle {
        return Err(ContractError::ProposalKindMismatch {
            index: proposal_index,
            expected: ProposalKind::EventSettle.as_str().to_string(),
            actual: proposal.kind.as_str().to_string(),
        });
    }
    ensure_unresolved(&proposal)?;

    let tally = tally_for(&event, &proposal);
    match tally.outcome(env.block.time >= proposal.deadline) {
        ProposalOutcome::Pending => {
            return Err(ContractError::TooEarlyToSettle {
                index: proposal_index,
                deadline: proposal.deadline,
            })
        }
        ProposalOutcome::Rejected => {
            return Err(ContractError::ProposalNotApproved {
                index: proposal_index,
            })
        }
        ProposalOutcome::Passed => {}
    }

    let mut ledgers: Vec<Participant> = PARTICIPANTS
        .prefix(event_id)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, participant)| participant))
        .collect::<StdResult<_>>()?;
    for participant in ledgers.iter_mut() {
        participant.net_owed = Some(net_owed(participant)?);
    }

    proposal.settled = true;
    event.state = EventState::Settled;
    event.settled_by = Some(proposal_index);
    event.reserved = Uint128::zero();

    let mut response = Response::new()
        .add_attribute("action", "settle_event")
        .add_attribute("event_id", event_id.to_string())
        .add_attribute("proposal_index", proposal_index.to_string())
        .add_attribute("participants", ledgers.len().to_string());

    for participant in &ledgers {
        PARTICIPANTS.save(deps.storage, (event_id, &participant.wallet), participant)?;
        response = response.add_event(
            Event::new("kitty_net_owed")
                .add_attribute("event_id", event_id.to_string())
                .add_attribute("wallet", participant.wallet.to_string())
                .add_attribute("contributed", participant.contributed.to_string())
                .add_attribute("spent", participant.spent.to_string())
                .add_attribute(
                    "net_owed",
                    participant.net_owed.unwrap_or_default().to_string(),
                ),
        );
    }
    PROPOSALS.save(deps.storage, (event_id, proposal_index), &proposal)?;
    EVENTS.save(deps.storage, event_id, &event)?;

    Ok(response.add_event(
        Event::new("kitty_event_settled")
            .add_attribute("event_id", event_id.to_string())
            .add_attribute("proposal_index", proposal_index.to_string())
            .add_attribute("total_contributed", event.total_contributed.to_string())
            .add_attribute("total_spent", event.total_spent.to_string())
            .add_attribute("vault_balance", event.vault_balance.to_string()),
    ))
}

/// Update contract configuration. Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        admin,
        max_whitelist,
        max_spendings,
        max_participants,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(new_admin) = admin {
        config.admin = deps.api.addr_validate(&new_admin)?;
    }
    if let Some(max) = max_whitelist {
        config.max_whitelist = validate_limit("max_whitelist", max)?;
    }
    if let Some(max) = max_spendings {
        config.max_spendings = validate_limit("max_spendings", max)?;
    }
    if let Some(max) = max_participants {
        config.max_participants = validate_limit("max_participants", max)?;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_attribute("admin", config.admin.to_string())
        .add_attribute("max_whitelist", config.max_whitelist.to_string())
        .add_attribute("max_spendings", config.max_spendings.to_string())
        .add_attribute("max_participants", config.max_participants.to_string()))
}

pub fn validate_limit(field: &str, value: u32) -> Result<u32, ContractError> {
    if value == 0 {
        return Err(ContractError::InvalidConfig {
            reason: format!("{} must be greater than zero", field),
        });
    }
    Ok(value)
}
