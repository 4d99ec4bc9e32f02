//! Oracle member set.
//!
//! An ordered list for enumeration plus a reverse index for membership checks.
//! Removal swaps the last member into the vacated position, so a member's
//! index can change whenever another member is removed. Callers pass the
//! index they expect and it is checked against the live position.

use std::collections::HashMap;

use smoothing_types::{address_hex, Address};

use crate::{OracleError, Result};

/// Enumerable set of oracle member addresses.
#[derive(Clone, Debug, Default)]
pub struct MemberSet {
    /// Members in storage order.
    list: Vec<Address>,
    /// Member address to its index in `list`.
    positions: HashMap<Address, usize>,
}

impl MemberSet {
    /// Create an empty member set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member.
    ///
    /// # Errors
    ///
    /// - [`OracleError::AlreadyMember`] if the address is present
    pub fn insert(&mut self, member: Address) -> Result<usize> {
        if self.positions.contains_key(&member) {
            return Err(OracleError::AlreadyMember(address_hex(&member)));
        }
        let index = self.list.len();
        self.list.push(member);
        self.positions.insert(member, index);
        Ok(index)
    }

    /// Remove a member whose current position is `index`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotAMember`] if the address is absent
    /// - [`OracleError::IndexMismatch`] if `index` is not the member's position
    pub fn remove(&mut self, member: &Address, index: usize) -> Result<()> {
        let actual = *self
            .positions
            .get(member)
            .ok_or_else(|| OracleError::NotAMember(address_hex(member)))?;
        if actual != index {
            return Err(OracleError::IndexMismatch {
                supplied: index,
                actual,
            });
        }

        self.list.swap_remove(index);
        self.positions.remove(member);
        if let Some(moved) = self.list.get(index) {
            self.positions.insert(*moved, index);
        }
        Ok(())
    }

    /// Whether `member` is in the set.
    pub fn contains(&self, member: &Address) -> bool {
        self.positions.contains_key(member)
    }

    /// Current index of `member`.
    pub fn index_of(&self, member: &Address) -> Option<usize> {
        self.positions.get(member).copied()
    }

    /// Members in storage order.
    pub fn as_slice(&self) -> &[Address] {
        &self.list
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
