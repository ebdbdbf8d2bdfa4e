//! Integration tests for the kitty pool.
//!
//! These tests drive the contract through its `instantiate` / `execute` /
//! `query` entry points with `cosmwasm_std::testing` mocks, decoding
//! messages from JSON the way a client would submit them.
//!
//! Run:
//! ```bash
//! cargo test -p kitty-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    coins, from_json, Addr, BankMsg, CosmosMsg, Env, Int128, MemoryStorage, OwnedDeps, Response,
    Timestamp, Uint128,
};
use kitty_common::types::{EventState, ProposalKind, ProposalOutcome};
use kitty_pool::contract::{execute, instantiate, query};
use kitty_pool::msg::{
    EventCounterResponse, EventsResponse, ExecuteMsg, InstantiateMsg, ParticipantsResponse,
    PayoutsResponse, ProposalsResponse, QueryMsg, TallyResponse, VaultResponse,
};
use kitty_pool::state::{Participant, PoolEvent, Proposal};
use kitty_pool::ContractError;
use serde_json::json;

type MockDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Constants ───

const DENOM: &str = "ukitty";
const MILLION: u128 = 1_000_000;

// ─── Helpers ───

fn setup(deps: &mut MockDeps) {
    let admin = deps.api.addr_make("admin");
    let msg = InstantiateMsg {
        denom: DENOM.to_string(),
        max_whitelist: None,
        max_spendings: None,
        max_participants: None,
    };
    instantiate(deps.as_mut(), mock_env(), message_info(&admin, &[]), msg).unwrap();
}

fn hours_from_now(hours: u64) -> Timestamp {
    mock_env().block.time.plus_seconds(hours * 3600)
}

fn env_at(time: Timestamp) -> Env {
    let mut env = mock_env();
    env.block.time = time;
    env
}

/// Decode an execute message from client-shaped JSON.
fn msg_from_json(value: serde_json::Value) -> ExecuteMsg {
    serde_json::from_value(value).unwrap()
}

fn run(
    deps: &mut MockDeps,
    env: Env,
    sender: &Addr,
    funds: u128,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let funds = if funds == 0 { vec![] } else { coins(funds, DENOM) };
    execute(deps.as_mut(), env, message_info(sender, &funds), msg)
}

fn contribute(deps: &mut MockDeps, sender: &Addr, event_id: u64, amount: u128) {
    run(
        deps,
        mock_env(),
        sender,
        amount,
        ExecuteMsg::Contribute { event_id },
    )
    .unwrap();
}

fn vote(deps: &mut MockDeps, voter: &Addr, event_id: u64, proposal_index: u32) {
    run(
        deps,
        mock_env(),
        voter,
        0,
        ExecuteMsg::Vote {
            event_id,
            proposal_index,
            approve: true,
        },
    )
    .unwrap();
}

fn query_json<T: serde::de::DeserializeOwned>(deps: &MockDeps, msg: QueryMsg) -> T {
    from_json(query(deps.as_ref(), mock_env(), msg).unwrap()).unwrap()
}

fn participant(deps: &MockDeps, event_id: u64, wallet: &Addr) -> Participant {
    let found: Option<Participant> = query_json(
        deps,
        QueryMsg::Participant {
            event_id,
            wallet: wallet.to_string(),
        },
    );
    found.unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Full lifecycle
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_event_lifecycle() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let creator = deps.api.addr_make("creator");
    let alice = deps.api.addr_make("alice");
    let bob = deps.api.addr_make("bob");

    // ── Create the event from a JSON message ──
    let res = run(
        &mut deps,
        mock_env(),
        &creator,
        0,
        msg_from_json(json!({
            "create_event": {
                "name": "Ski Trip",
                "deadline": hours_from_now(24 * 7).nanos().to_string(),
                "target_amount": (300 * MILLION).to_string(),
                "whitelist": [alice.to_string(), bob.to_string()],
                "withdraw_address": null
            }
        })),
    )
    .unwrap();
    let event_id: u64 = from_json(res.data.unwrap()).unwrap();
    assert_eq!(event_id, 0);

    let counter: EventCounterResponse = query_json(&deps, QueryMsg::EventCounter {});
    assert_eq!(counter.next, 1);

    // ── Contributions: A 100M, B 200M, creator 200M ──
    contribute(&mut deps, &alice, event_id, 100 * MILLION);
    contribute(&mut deps, &bob, event_id, 200 * MILLION);
    contribute(&mut deps, &creator, event_id, 200 * MILLION);

    let vault: VaultResponse = query_json(&deps, QueryMsg::Vault { event_id });
    assert_eq!(vault.balance, Uint128::new(500 * MILLION));
    assert_eq!(vault.available, Uint128::new(500 * MILLION));

    let event: PoolEvent = query_json(&deps, QueryMsg::Event { event_id });
    assert_eq!(event.total_contributed, Uint128::new(500 * MILLION));
    assert_eq!(event.participant_count, 3);

    // ── Spending proposal: 200M charged A 80% / B 20% ──
    let res = run(
        &mut deps,
        mock_env(),
        &creator,
        0,
        msg_from_json(json!({
            "create_proposal": {
                "event_id": event_id,
                "title": "Chalet deposit",
                "amount": (200 * MILLION).to_string(),
                "spendings": [
                    { "wallet": alice.to_string(), "percentage": 80 },
                    { "wallet": bob.to_string(), "percentage": 20 }
                ],
                "deadline": hours_from_now(48).nanos().to_string()
            }
        })),
    )
    .unwrap();
    let spending_index: u32 = from_json(res.data.unwrap()).unwrap();
    assert_eq!(spending_index, 0);

    let payouts: PayoutsResponse = query_json(
        &deps,
        QueryMsg::Payouts {
            event_id,
            index: spending_index,
        },
    );
    assert_eq!(payouts.total, Uint128::new(200 * MILLION));
    assert_eq!(payouts.payouts[0].wallet, alice);
    assert_eq!(payouts.payouts[0].amount, Uint128::new(160 * MILLION));
    assert_eq!(payouts.payouts[1].amount, Uint128::new(40 * MILLION));

    // two of three participants is a majority
    vote(&mut deps, &alice, event_id, spending_index);
    vote(&mut deps, &bob, event_id, spending_index);

    let tally: TallyResponse = query_json(
        &deps,
        QueryMsg::Tally {
            event_id,
            index: spending_index,
        },
    );
    assert_eq!((tally.yes, tally.no, tally.eligible), (2, 0, 3));
    assert_eq!(tally.outcome, ProposalOutcome::Passed);

    let res = run(
        &mut deps,
        mock_env(),
        &bob,
        0,
        ExecuteMsg::SettleProposal {
            event_id,
            proposal_index: spending_index,
        },
    )
    .unwrap();
    assert_eq!(
        res.messages[0].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: creator.to_string(),
            amount: coins(200 * MILLION, DENOM),
        })
    );

    assert_eq!(
        participant(&deps, event_id, &alice).spent,
        Uint128::new(160 * MILLION)
    );
    assert_eq!(
        participant(&deps, event_id, &bob).spent,
        Uint128::new(40 * MILLION)
    );
    let vault: VaultResponse = query_json(&deps, QueryMsg::Vault { event_id });
    assert_eq!(vault.balance, Uint128::new(300 * MILLION));
    assert_eq!(vault.reserved, Uint128::zero());

    // ── Settlement proposal, approved unanimously ──
    let res = run(
        &mut deps,
        mock_env(),
        &creator,
        0,
        ExecuteMsg::CreateSettleProposal {
            event_id,
            deadline: hours_from_now(72),
        },
    )
    .unwrap();
    let settle_index: u32 = from_json(res.data.unwrap()).unwrap();
    assert_eq!(settle_index, 1);

    for voter in [&alice, &bob, &creator] {
        vote(&mut deps, voter, event_id, settle_index);
    }

    let res = run(
        &mut deps,
        mock_env(),
        &alice,
        0,
        ExecuteMsg::SettleEvent {
            event_id,
            proposal_index: settle_index,
        },
    )
    .unwrap();
    assert!(res.messages.is_empty());
    assert!(res.events.iter().any(|e| e.ty == "kitty_event_settled"));

    assert_eq!(
        participant(&deps, event_id, &creator).net_owed,
        Some(Int128::new(200_000_000))
    );
    assert_eq!(
        participant(&deps, event_id, &bob).net_owed,
        Some(Int128::new(160_000_000))
    );
    assert_eq!(
        participant(&deps, event_id, &alice).net_owed,
        Some(Int128::new(-60_000_000))
    );

    let event: PoolEvent = query_json(&deps, QueryMsg::Event { event_id });
    assert_eq!(event.state, EventState::Settled);
    assert_eq!(event.settled_by, Some(settle_index));
    assert_eq!(event.vault_balance, Uint128::new(300 * MILLION));
    assert_eq!(event.total_spent, Uint128::new(200 * MILLION));

    let proposals: ProposalsResponse = query_json(
        &deps,
        QueryMsg::Proposals {
            event_id,
            start_after: None,
            limit: None,
        },
    );
    assert_eq!(proposals.proposals.len(), 2);
    assert!(proposals.proposals.iter().all(|p| p.settled));
    assert_eq!(proposals.proposals[1].kind, ProposalKind::EventSettle);

    // settled events are read-only
    let err = run(
        &mut deps,
        mock_env(),
        &bob,
        10,
        ExecuteMsg::Contribute { event_id },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::EventNotOpen { .. }));
}

#[test]
fn test_unfunded_event_closes_with_refund() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let creator = deps.api.addr_make("creator");
    let alice = deps.api.addr_make("alice");

    let res = run(
        &mut deps,
        mock_env(),
        &creator,
        0,
        ExecuteMsg::CreateEvent {
            name: "Concert".to_string(),
            deadline: hours_from_now(24),
            target_amount: Uint128::new(1_000 * MILLION),
            whitelist: None,
            withdraw_address: None,
        },
    )
    .unwrap();
    let event_id: u64 = from_json(res.data.unwrap()).unwrap();

    contribute(&mut deps, &alice, event_id, 300 * MILLION);

    let err = run(
        &mut deps,
        mock_env(),
        &creator,
        0,
        ExecuteMsg::CloseEvent { event_id },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::DeadlineNotReached { .. }));

    let res = run(
        &mut deps,
        env_at(hours_from_now(25)),
        &creator,
        0,
        ExecuteMsg::CloseEvent { event_id },
    )
    .unwrap();
    assert_eq!(
        res.messages[0].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: creator.to_string(),
            amount: coins(300 * MILLION, DENOM),
        })
    );
    assert!(res.events.iter().any(|e| e.ty == "kitty_event_closed"));

    let event: PoolEvent = query_json(&deps, QueryMsg::Event { event_id });
    assert_eq!(event.state, EventState::Closed);
    assert_eq!(event.vault_balance, Uint128::zero());
    // contribution history is kept
    assert_eq!(event.total_contributed, Uint128::new(300 * MILLION));
}

#[test]
fn test_rejected_proposal_releases_reservation() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let creator = deps.api.addr_make("creator");
    let alice = deps.api.addr_make("alice");
    let bob = deps.api.addr_make("bob");

    let res = run(
        &mut deps,
        mock_env(),
        &creator,
        0,
        ExecuteMsg::CreateEvent {
            name: "Dinner".to_string(),
            deadline: hours_from_now(24),
            target_amount: Uint128::new(100),
            whitelist: None,
            withdraw_address: None,
        },
    )
    .unwrap();
    let event_id: u64 = from_json(res.data.unwrap()).unwrap();
    contribute(&mut deps, &alice, event_id, 100);
    contribute(&mut deps, &bob, event_id, 100);

    run(
        &mut deps,
        mock_env(),
        &creator,
        0,
        msg_from_json(json!({
            "create_proposal": {
                "event_id": event_id,
                "title": "Wine",
                "amount": "150",
                "spendings": [{ "wallet": alice.to_string(), "percentage": 100 }],
                "deadline": hours_from_now(1).nanos().to_string()
            }
        })),
    )
    .unwrap();

    let vault: VaultResponse = query_json(&deps, QueryMsg::Vault { event_id });
    assert_eq!(vault.available, Uint128::new(50));

    // nobody votes; once voting closes 0 yes / 0 no is a rejection
    let res = run(
        &mut deps,
        env_at(hours_from_now(1)),
        &bob,
        0,
        ExecuteMsg::SettleProposal {
            event_id,
            proposal_index: 0,
        },
    )
    .unwrap();
    assert!(res.messages.is_empty());

    let proposal: Proposal = query_json(&deps, QueryMsg::Proposal { event_id, index: 0 });
    assert!(proposal.cancelled);

    let vault: VaultResponse = query_json(&deps, QueryMsg::Vault { event_id });
    assert_eq!(vault.balance, Uint128::new(200));
    assert_eq!(vault.available, Uint128::new(200));
    assert_eq!(participant(&deps, event_id, &alice).spent, Uint128::zero());
}

#[test]
fn test_listing_queries_paginate() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let creator = deps.api.addr_make("creator");
    for name in ["one", "two", "three"] {
        run(
            &mut deps,
            mock_env(),
            &creator,
            0,
            ExecuteMsg::CreateEvent {
                name: name.to_string(),
                deadline: hours_from_now(24),
                target_amount: Uint128::new(100),
                whitelist: None,
                withdraw_address: None,
            },
        )
        .unwrap();
    }

    let page: EventsResponse = query_json(
        &deps,
        QueryMsg::Events {
            start_after: Some(0),
            limit: Some(1),
        },
    );
    assert_eq!(page.events.len(), 1);
    assert_eq!(page.events[0].id, 1);
    assert_eq!(page.events[0].name, "two");

    let members: Vec<Addr> = (0..5)
        .map(|i| deps.api.addr_make(&format!("member{}", i)))
        .collect();
    for member in &members {
        contribute(&mut deps, member, 2, 10);
    }

    let first: ParticipantsResponse = query_json(
        &deps,
        QueryMsg::Participants {
            event_id: 2,
            start_after: None,
            limit: Some(3),
        },
    );
    assert_eq!(first.participants.len(), 3);

    let last_seen = first.participants[2].wallet.to_string();
    let rest: ParticipantsResponse = query_json(
        &deps,
        QueryMsg::Participants {
            event_id: 2,
            start_after: Some(last_seen),
            limit: None,
        },
    );
    assert_eq!(rest.participants.len(), 2);

    let missing: Option<Participant> = query_json(
        &deps,
        QueryMsg::Participant {
            event_id: 0,
            wallet: members[0].to_string(),
        },
    );
    assert!(missing.is_none());
}
