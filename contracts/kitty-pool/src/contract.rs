use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{
    CreateEventParams, CreateProposalParams, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg,
    UpdateConfigParams,
};
use crate::query;
use crate::state::{
    Config, CONFIG, DEFAULT_MAX_PARTICIPANTS, DEFAULT_MAX_SPENDINGS, DEFAULT_MAX_WHITELIST,
    EVENT_COUNTER,
};

const CONTRACT_NAME: &str = "crates.io:kitty-pool";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    // The event counter is created exactly once
    if EVENT_COUNTER.may_load(deps.storage)?.is_some() {
        return Err(ContractError::AlreadyInitialized);
    }
    if msg.denom.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "denom must not be empty".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        admin: info.sender.clone(),
        denom: msg.denom,
        max_whitelist: execute::validate_limit(
            "max_whitelist",
            msg.max_whitelist.unwrap_or(DEFAULT_MAX_WHITELIST),
        )?,
        max_spendings: execute::validate_limit(
            "max_spendings",
            msg.max_spendings.unwrap_or(DEFAULT_MAX_SPENDINGS),
        )?,
        max_participants: execute::validate_limit(
            "max_participants",
            msg.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS),
        )?,
    };
    CONFIG.save(deps.storage, &config)?;
    EVENT_COUNTER.save(deps.storage, &0)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "kitty-pool")
        .add_attribute("denom", config.denom)
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateEvent {
            name,
            deadline,
            target_amount,
            whitelist,
            withdraw_address,
        } => execute::create_event(
            deps,
            env,
            info,
            CreateEventParams {
                name,
                deadline,
                target_amount,
                whitelist,
                withdraw_address,
            },
        ),
        ExecuteMsg::Whitelist { event_id, wallets } => {
            execute::whitelist(deps, env, info, event_id, wallets)
        }
        ExecuteMsg::Contribute { event_id } => execute::contribute(deps, env, info, event_id),
        ExecuteMsg::CloseEvent { event_id } => execute::close_event(deps, env, info, event_id),
        ExecuteMsg::CreateProposal {
            event_id,
            title,
            amount,
            spendings,
            deadline,
        } => execute::create_proposal(
            deps,
            env,
            info,
            CreateProposalParams {
                event_id,
                title,
                amount,
                spendings,
                deadline,
            },
        ),
        ExecuteMsg::Vote {
            event_id,
            proposal_index,
            approve,
        } => execute::vote(deps, env, info, event_id, proposal_index, approve),
        ExecuteMsg::SettleProposal {
            event_id,
            proposal_index,
        } => execute::settle_proposal(deps, env, info, event_id, proposal_index),
        ExecuteMsg::CreateSettleProposal { event_id, deadline } => {
            execute::create_settle_proposal(deps, env, info, event_id, deadline)
        }
        ExecuteMsg::SettleEvent {
            event_id,
            proposal_index,
        } => execute::settle_event(deps, env, info, event_id, proposal_index),
        ExecuteMsg::UpdateConfig {
            admin,
            max_whitelist,
            max_spendings,
            max_participants,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                admin,
                max_whitelist,
                max_spendings,
                max_participants,
            },
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::EventCounter {} => query::query_event_counter(deps),
        QueryMsg::Event { event_id } => query::query_event(deps, event_id),
        QueryMsg::Events { start_after, limit } => query::query_events(deps, start_after, limit),
        QueryMsg::Vault { event_id } => query::query_vault(deps, event_id),
        QueryMsg::Participant { event_id, wallet } => {
            query::query_participant(deps, event_id, wallet)
        }
        QueryMsg::Participants {
            event_id,
            start_after,
            limit,
        } => query::query_participants(deps, event_id, start_after, limit),
        QueryMsg::Proposal { event_id, index } => query::query_proposal(deps, event_id, index),
        QueryMsg::Proposals {
            event_id,
            start_after,
            limit,
        } => query::query_proposals(deps, event_id, start_after, limit),
        QueryMsg::Tally { event_id, index } => query::query_tally(deps, env, event_id, index),
        QueryMsg::Payouts { event_id, index } => query::query_payouts(deps, event_id, index),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
