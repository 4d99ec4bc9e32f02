//! Integration tests for the smoothing pool.
//!
//! The library only holds shared fixtures. The scenarios under `tests/`
//! drive a [`SmoothingPool`] through complete flows across the workspace
//! crates: subscription, oracle consensus, and reward claims.
//!
//! Run them with:
//! ```sh
//! cargo test -p smoothing-integration-tests
//! ```
//!
//! Set `RUST_LOG=debug` to see the pool's tracing output.

use smoothing_crypto::merkle::{RewardEntry, RewardsTree};
use smoothing_pool::config::PoolConfig;
use smoothing_pool::{CallContext, Result, SmoothingPool};
use smoothing_types::{Address, Wei};

pub const DEPLOYER: Address = [0x01; 20];
pub const GOVERNANCE: Address = [0x02; 20];
pub const FEE_RECIPIENT: Address = [0x03; 20];

pub const CHECKPOINT_SLOT_SIZE: u64 = 7200;

/// Install a fmt subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Deterministic test address: `tag` repeated over 20 bytes.
pub fn addr(tag: u8) -> Address {
    [tag; 20]
}

/// A call from `caller` without value.
pub fn call(caller: Address) -> CallContext {
    CallContext::new(caller)
}

/// Deploy with default parameters and the given quorum.
pub fn deploy(quorum: u32) -> Result<SmoothingPool> {
    let mut config = PoolConfig::new(GOVERNANCE, FEE_RECIPIENT);
    config.quorum = quorum;
    SmoothingPool::initialize(DEPLOYER, &config, 1)
}

/// Deploy, register `members` and initialize at the first checkpoint.
pub fn deploy_live(quorum: u32, members: &[Address]) -> Result<SmoothingPool> {
    let mut pool = deploy(quorum)?;
    for member in members {
        pool.add_oracle_member(&call(GOVERNANCE), *member)?;
    }
    pool.init_smoothing_pool(&call(DEPLOYER), CHECKPOINT_SLOT_SIZE)?;
    Ok(pool)
}

/// Build a rewards tree from `(beneficiary, entitlement)` pairs.
pub fn rewards_tree(entries: &[(Address, Wei)]) -> RewardsTree {
    let entries: Vec<RewardEntry> = entries
        .iter()
        .map(|&(beneficiary, entitlement)| RewardEntry {
            beneficiary,
            entitlement,
        })
        .collect();
    RewardsTree::from_entries(&entries)
}
