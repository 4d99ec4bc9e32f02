//! # smoothing-types
//!
//! Shared domain types used across the smoothing pool workspace.
//!
//! ## Modules
//!
//! - [`events`]: Events emitted by the pool
//! - [`hex`]: `0x`-prefixed hex serde adaptor for fixed-size byte arrays
//! - [`report`]: Oracle report and vote records

pub mod events;
pub mod hex;
pub mod report;

/// Common type aliases.
pub type Address = [u8; 20];
pub type Hash = [u8; 32];
pub type Wei = u128;
pub type Slot = u64;
pub type ValidatorId = u64;

/// The all-zero address.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// The all-zero hash. Also the initial canonical rewards root.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Vote value of an oracle member that has not voted yet (uint256 1).
///
/// Distinct from [`ZERO_HASH`], which is what non-members report.
pub const INITIAL_REPORT_HASH: Hash = {
    let mut h = [0u8; 32];
    h[31] = 1;
    h
};

/// Wei per ether.
pub const WEI_PER_ETHER: Wei = 1_000_000_000_000_000_000;

/// Pool fee denominator: fees are expressed in basis points.
pub const MAX_POOL_FEE_BPS: u16 = 10_000;

/// Render an address as `0x`-prefixed lowercase hex.
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", ::hex::encode(address))
}

/// Render a hash as `0x`-prefixed lowercase hex.
pub fn hash_hex(hash: &Hash) -> String {
    format!("0x{}", ::hex::encode(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_report_hash_is_one() {
        assert_ne!(INITIAL_REPORT_HASH, ZERO_HASH);
        assert_eq!(INITIAL_REPORT_HASH[31], 1);
        assert!(INITIAL_REPORT_HASH[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_address_hex() {
        let mut addr = ZERO_ADDRESS;
        addr[0] = 0x10;
        assert_eq!(
            address_hex(&addr),
            "0x1000000000000000000000000000000000000000"
        );
    }
}
