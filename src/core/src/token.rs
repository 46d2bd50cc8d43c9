//! The fungible token resource the ledger takes custody of.
//!
//! The ledger never implements token semantics itself; it only calls into a
//! [`TokenResource`]. [`MemoryToken`] is an in-memory ERC-20 used by the node
//! and by tests to stand in for a deployed token.

use crate::errors::TokenError;
use crate::types::{Address, Balance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ERC-20 style operations, invoked on behalf of `caller`.
///
/// Every mutating call either applies in full or returns an error with the
/// token's state unchanged.
pub trait TokenResource {
    /// The address the token is deployed at.
    fn address(&self) -> Address;

    /// The token balance of `account`.
    fn balance_of(&self, account: Address) -> Balance;

    /// How much `spender` may still pull from `owner`.
    fn allowance(&self, owner: Address, spender: Address) -> Balance;

    /// Moves `amount` from `caller` to `to`.
    fn transfer(&mut self, caller: Address, to: Address, amount: Balance) -> Result<(), TokenError>;

    /// Moves `amount` from `from` to `to`, spending `caller`'s allowance.
    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Balance,
    ) -> Result<(), TokenError>;

    /// Sets `spender`'s allowance over `caller`'s tokens to `amount`.
    fn approve(&mut self, caller: Address, spender: Address, amount: Balance) -> Result<(), TokenError>;
}

/// An in-memory ERC-20 with a fixed supply minted to its deployer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryToken {
    address: Address,
    name: String,
    symbol: String,
    total_supply: Balance,
    balances: HashMap<Address, Balance>,
    allowances: HashMap<Address, HashMap<Address, Balance>>,
}

impl MemoryToken {
    /// Deploys a token at `address`, minting `supply` to `deployer`.
    pub fn deploy(
        address: Address,
        deployer: Address,
        name: &str,
        symbol: &str,
        supply: Balance,
    ) -> Self {
        let mut balances = HashMap::new();
        if !supply.is_zero() {
            balances.insert(deployer, supply);
        }

        Self {
            address,
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply: supply,
            balances,
            allowances: HashMap::new(),
        }
    }

    /// The token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The fixed total supply.
    pub fn total_supply(&self) -> Balance {
        self.total_supply
    }

    fn move_tokens(&mut self, from: Address, to: Address, amount: Balance) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::TransferToZero);
        }

        let from_balance = self.balance_of(from);
        let remaining = from_balance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance)?;

        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.balances.insert(from, remaining);
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl TokenResource for MemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: Address) -> Balance {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> Balance {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(&mut self, caller: Address, to: Address, amount: Balance) -> Result<(), TokenError> {
        self.move_tokens(caller, to, amount)
    }

    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Balance,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(from, caller);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance)?;

        self.move_tokens(from, to, amount)?;

        // An unlimited approval is never spent down
        if allowance != Balance::MAX {
            self.allowances.entry(from).or_default().insert(caller, remaining);
        }
        Ok(())
    }

    fn approve(&mut self, caller: Address, spender: Address, amount: Balance) -> Result<(), TokenError> {
        if spender.is_zero() {
            return Err(TokenError::ApproveToZero);
        }
        self.allowances.entry(caller).or_default().insert(spender, amount);
        Ok(())
    }
}
