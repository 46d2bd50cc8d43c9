//! The custodial ledger.
//!
//! Users deposit tokens into the ledger's custody and withdraw them only with
//! an authorization issued by the authorized signer. Every operation checks
//! all of its preconditions first, performs the external token call, and only
//! then commits its own state, so a failed call leaves the ledger untouched.

use crate::errors::LedgerError;
use crate::signature::recover_authorizer;
use crate::token::TokenResource;
use crate::types::{Address, Balance, LedgerEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Deposited balances plus the administrative identities that guard them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// The ledger's own account on the token resource
    address: Address,
    /// The token resource fixed at deployment
    token: Address,
    /// The deployer; the only account allowed to change the signer
    owner: Address,
    /// The account whose authorizations release withdrawals
    signer: Address,
    /// Deposited balance per account
    balances: HashMap<Address, Balance>,
    /// Sum of all deposited balances
    total_deposits: Balance,
}

impl Ledger {
    /// Deploys an empty ledger at `address` for `token`.
    ///
    /// The deployer becomes both the owner and the authorized signer.
    pub fn deploy(address: Address, deployer: Address, token: Address) -> Self {
        info!(
            "Deploying ledger at {:?} for token {:?} (owner {:?})",
            address, token, deployer
        );
        Self {
            address,
            token,
            owner: deployer,
            signer: deployer,
            balances: HashMap::new(),
            total_deposits: Balance::zero(),
        }
    }

    /// The ledger's own account.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The token resource this ledger holds.
    pub fn token(&self) -> Address {
        self.token
    }

    /// The owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The current authorized signer.
    pub fn signer_address(&self) -> Address {
        self.signer
    }

    /// The deposited balance of `account`, zero if it never deposited.
    pub fn balances(&self, account: Address) -> Balance {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// The sum of all deposited balances.
    pub fn total_deposits(&self) -> Balance {
        self.total_deposits
    }

    /// Iterates over accounts with a non-zero balance.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Balance)> {
        self.balances.iter().filter(|(_, balance)| !balance.is_zero())
    }

    fn ensure_token<T: TokenResource + ?Sized>(&self, token: &T) -> Result<(), LedgerError> {
        if token.address() != self.token {
            return Err(LedgerError::TokenMismatch {
                expected: self.token,
                actual: token.address(),
            });
        }
        Ok(())
    }

    /// Pulls `amount` tokens from `caller` into custody and credits them.
    pub fn deposit<T: TokenResource + ?Sized>(
        &mut self,
        token: &mut T,
        caller: Address,
        amount: Balance,
    ) -> Result<LedgerEvent, LedgerError> {
        self.ensure_token(token)?;

        if token.allowance(caller, self.address) < amount {
            warn!("Deposit of {} by {:?} rejected: not approved", amount, caller);
            return Err(LedgerError::NotApproved);
        }
        if token.balance_of(caller) < amount {
            warn!("Deposit of {} by {:?} rejected: insufficient token balance", amount, caller);
            return Err(LedgerError::InsufficientTokenBalance);
        }

        let credited = self
            .balances(caller)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let total = self
            .total_deposits
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        token.transfer_from(self.address, caller, self.address, amount)?;

        self.balances.insert(caller, credited);
        self.total_deposits = total;

        info!("Deposit of {} by {:?}", amount, caller);
        Ok(LedgerEvent::Deposit { account: caller, amount })
    }

    /// Debits `amount` from `caller` and returns the tokens, provided
    /// `signature` is the current signer's authorization for exactly
    /// `(caller, amount)`.
    ///
    /// Authorizations carry no nonce: the same one releases `amount` again
    /// for as long as the balance covers it.
    pub fn withdraw<T: TokenResource + ?Sized>(
        &mut self,
        token: &mut T,
        caller: Address,
        amount: Balance,
        signature: &[u8],
    ) -> Result<LedgerEvent, LedgerError> {
        self.ensure_token(token)?;

        let balance = self.balances(caller);
        if balance < amount {
            warn!(
                "Withdrawal of {} by {:?} rejected: balance is {}",
                amount, caller, balance
            );
            return Err(LedgerError::InsufficientBalance);
        }

        let recovered = recover_authorizer(caller, amount, signature)?;
        if recovered != self.signer {
            warn!(
                "Withdrawal of {} by {:?} rejected: signed by {:?}, signer is {:?}",
                amount, caller, recovered, self.signer
            );
            return Err(LedgerError::InvalidSignature);
        }
        debug!("Authorization for {} by {:?} verified", amount, caller);

        let remaining = balance - amount;
        let total = self
            .total_deposits
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        token.transfer(self.address, caller, amount)?;

        if remaining.is_zero() {
            self.balances.remove(&caller);
        } else {
            self.balances.insert(caller, remaining);
        }
        self.total_deposits = total;

        info!("Withdrawal of {} by {:?}", amount, caller);
        Ok(LedgerEvent::Withdraw { account: caller, amount })
    }

    /// Replaces the authorized signer. Only the owner may call this.
    pub fn set_signer_address(
        &mut self,
        caller: Address,
        signer: Address,
    ) -> Result<LedgerEvent, LedgerError> {
        if caller != self.owner {
            warn!("Signer change by non-owner {:?} rejected", caller);
            return Err(LedgerError::NotOwner);
        }

        let previous = std::mem::replace(&mut self.signer, signer);
        info!("Signer changed from {:?} to {:?}", previous, signer);
        Ok(LedgerEvent::SignerChanged { previous, current: signer })
    }

    /// Rejects a bare native-currency payment.
    pub fn receive(&self, caller: Address, value: Balance) -> Result<(), LedgerError> {
        warn!("Bare payment of {} from {:?} rejected", value, caller);
        Err(LedgerError::InvalidTransaction)
    }
}
