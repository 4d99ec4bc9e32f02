//! Integration test: subscription accounting and claim settlement.
//!
//! 1. Pool balance grows by exactly the collateral per subscribed ID,
//!    whatever the order
//! 2. A 10 ETH entitlement pays 10 ETH, then 0 ETH on the identical re-claim
//! 3. Delegated recipients receive payouts
//! 4. A rejected transfer leaves no trace
//! 5. Failed calls emit no events

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smoothing_integration_tests::{addr, call, deploy, deploy_live, init_test_tracing};
use smoothing_pool::transfer::AccountBook;
use smoothing_pool::{ErrorKind, SmoothingPool};
use smoothing_types::events::Event;
use smoothing_types::{Address, ValidatorId, Wei, WEI_PER_ETHER};

const ORACLE: Address = [0x0a; 20];

/// Pool with `root` consolidated at slot 14400 and `funds` donated.
fn pool_with_root(root: [u8; 32], funds: Wei) -> SmoothingPool {
    let mut pool = deploy_live(1, &[ORACLE]).expect("deploy");
    pool.receive(&call(addr(0xdd)).with_value(funds), b"donation")
        .expect("fund");
    pool.submit_report(&call(ORACLE), 14_400, root)
        .expect("consolidate");
    pool
}

#[test]
fn collateral_balance_independent_of_order() {
    init_test_tracing();
    let depositors = [addr(0x21), addr(0x22), addr(0x23)];
    let mut ids: Vec<ValidatorId> = (100..140).collect();

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        ids.shuffle(&mut rng);

        let mut pool = deploy(1).expect("deploy");
        let collateral = pool.subscription_collateral();
        let mut subscribed = 0u128;

        // Mix single and batch subscriptions.
        for (i, chunk) in ids.chunks(3).enumerate() {
            let depositor = depositors[i % depositors.len()];
            if chunk.len() == 1 {
                pool.subscribe_validator(&call(depositor).with_value(collateral), chunk[0])
                    .expect("single");
            } else {
                let value = collateral * chunk.len() as u128;
                pool.subscribe_validators(&call(depositor).with_value(value), chunk)
                    .expect("batch");
            }
            subscribed += chunk.len() as u128;
            assert_eq!(pool.balance(), collateral * subscribed);
        }

        assert_eq!(pool.subscription_count(), ids.len());
        assert_eq!(pool.balance(), collateral * ids.len() as u128);

        // Unsubscribing keeps the collateral in the pool.
        pool.unsubscribe_validator(&call(addr(0x99)), ids[0])
            .expect("unsubscribe");
        assert_eq!(pool.balance(), collateral * ids.len() as u128);
    }
}

#[test]
fn claim_then_identical_reclaim() {
    init_test_tracing();
    let alice = addr(0xa1);
    let tree = smoothing_integration_tests::rewards_tree(&[
        (alice, 10 * WEI_PER_ETHER),
        (addr(0xb0), WEI_PER_ETHER),
        (addr(0xc0), 2 * WEI_PER_ETHER),
    ]);
    let mut pool = pool_with_root(tree.root(), 50 * WEI_PER_ETHER);
    let mut accounts = AccountBook::new();
    let proof = tree.proof(0).expect("proof");

    let first = pool
        .claim_rewards(&call(alice), alice, 10 * WEI_PER_ETHER, &proof, &mut accounts)
        .expect("first claim");
    let second = pool
        .claim_rewards(&call(alice), alice, 10 * WEI_PER_ETHER, &proof, &mut accounts)
        .expect("second claim");

    assert_eq!(first, 10 * WEI_PER_ETHER);
    assert_eq!(second, 0);
    assert_eq!(pool.claimed_balance(&alice), 10 * WEI_PER_ETHER);
    assert_eq!(accounts.balance_of(&alice), 10 * WEI_PER_ETHER);

    let amounts: Vec<Wei> = pool
        .events()
        .records()
        .iter()
        .filter_map(|r| match r.event {
            Event::ClaimRewards { amount, .. } => Some(amount),
            _ => None,
        })
        .collect();
    assert_eq!(amounts, vec![10 * WEI_PER_ETHER, 0]);
}

#[test]
fn third_party_triggers_claim_for_delegate() {
    init_test_tracing();
    let (validator, delegate, keeper) = (addr(0x51), addr(0x52), addr(0x53));
    let tree = smoothing_integration_tests::rewards_tree(&[
        (validator, 3 * WEI_PER_ETHER),
        (addr(0x60), WEI_PER_ETHER),
    ]);
    let mut pool = pool_with_root(tree.root(), 10 * WEI_PER_ETHER);
    let mut accounts = AccountBook::new();

    pool.set_reward_recipient(&call(validator), delegate)
        .expect("delegate");
    pool.claim_rewards(
        &call(keeper),
        validator,
        3 * WEI_PER_ETHER,
        &tree.proof(0).expect("proof"),
        &mut accounts,
    )
    .expect("claim");

    assert_eq!(accounts.balance_of(&delegate), 3 * WEI_PER_ETHER);
    assert_eq!(accounts.balance_of(&validator), 0);
    assert_eq!(accounts.balance_of(&keeper), 0);
    assert_eq!(
        pool.events().records().last().map(|r| &r.event),
        Some(&Event::ClaimRewards {
            beneficiary: validator,
            recipient: delegate,
            amount: 3 * WEI_PER_ETHER,
        })
    );
}

#[test]
fn rejected_transfer_is_atomic() {
    init_test_tracing();
    let contract_wallet = addr(0x71);
    let tree = smoothing_integration_tests::rewards_tree(&[
        (contract_wallet, 4 * WEI_PER_ETHER),
        (addr(0x72), WEI_PER_ETHER),
    ]);
    let mut pool = pool_with_root(tree.root(), 10 * WEI_PER_ETHER);
    let mut accounts = AccountBook::new();
    accounts.reject_from(contract_wallet);

    let sequence = pool.events().sequence();
    let balance = pool.balance();
    let err = pool
        .claim_rewards(
            &call(contract_wallet),
            contract_wallet,
            4 * WEI_PER_ETHER,
            &tree.proof(0).expect("proof"),
            &mut accounts,
        )
        .expect_err("recipient rejects value");

    assert_eq!(err.kind(), ErrorKind::TransferFailed);
    assert_eq!(pool.claimed_balance(&contract_wallet), 0);
    assert_eq!(pool.balance(), balance);
    assert_eq!(pool.events().sequence(), sequence);
}

#[test]
fn failed_calls_emit_nothing() {
    init_test_tracing();
    let mut pool = deploy_live(2, &[ORACLE]).expect("deploy");
    let sequence = pool.events().sequence();
    let stranger = call(addr(0xee));

    let results = [
        pool.update_pool_fee(&stranger, 1),
        pool.add_oracle_member(&stranger, addr(0xee)),
        pool.submit_report(&stranger, 14_400, [1; 32]),
        pool.subscribe_validator(&stranger, 1),
        pool.unsubscribe_validator(&stranger, 1),
        pool.accept_governance(&stranger),
    ];
    for result in results {
        assert!(result.is_err());
    }
    assert_eq!(pool.events().sequence(), sequence);
    assert_eq!(pool.balance(), 0);
}
