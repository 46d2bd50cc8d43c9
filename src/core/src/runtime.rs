//! Host runtime that applies calls to the token and the ledger.
//!
//! Calls are applied one at a time. Each call runs against a copy of the
//! state, which replaces the live state only when the call succeeds, so a
//! reverted call leaves both the token and the ledger exactly as they were.

use crate::errors::{LedgerError, RuntimeError};
use crate::ledger::Ledger;
use crate::signature::{recover_personal, Authorizer};
use crate::token::{MemoryToken, TokenResource};
use crate::types::{Address, Balance, Call, LedgerEvent, Nonce, Receipt, SignedCall};
use ethers::utils::get_contract_address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The address a contract deployed by `deployer` at `nonce` receives.
pub fn contract_address(deployer: Address, nonce: u64) -> Address {
    get_contract_address(deployer, nonce)
}

/// The bytes a sender personal-signs to submit `call`.
pub fn call_payload(chain_id: u64, nonce: Nonce, call: &Call) -> Result<Vec<u8>, RuntimeError> {
    bincode::serialize(&(chain_id, nonce, call))
        .map_err(|e| RuntimeError::SerializationError(e.to_string()))
}

/// Signs `call` as the sender's `nonce`-th transaction.
pub fn sign_call(
    sender: &Authorizer,
    chain_id: u64,
    nonce: Nonce,
    call: Call,
) -> Result<SignedCall, RuntimeError> {
    let payload = call_payload(chain_id, nonce, &call)?;
    let signature = sender.sign_personal(&payload)?;
    Ok(SignedCall { call, nonce, signature })
}

/// Token and ledger state plus the log of committed calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Runtime<T> {
    /// Domain separator for signed calls
    chain_id: u64,
    /// The token resource in custody
    token: T,
    /// The custodial ledger
    ledger: Ledger,
    /// Next nonce per sender
    nonces: HashMap<Address, Nonce>,
    /// Committed calls, in order. Stores persist these one entry per receipt.
    #[serde(skip)]
    receipts: Vec<Receipt>,
}

impl Runtime<MemoryToken> {
    /// Deploys an in-memory token and a ledger for it from `deployer`.
    ///
    /// The token takes the deployer's first contract address and the ledger
    /// the second, mirroring a token-then-ledger deployment on an EVM chain.
    pub fn genesis(
        chain_id: u64,
        deployer: Address,
        name: &str,
        symbol: &str,
        supply: Balance,
    ) -> Self {
        let token = MemoryToken::deploy(
            contract_address(deployer, 0),
            deployer,
            name,
            symbol,
            supply,
        );
        let ledger = Ledger::deploy(contract_address(deployer, 1), deployer, token.address());
        Self::new(chain_id, token, ledger)
    }
}

impl<T: TokenResource + Clone> Runtime<T> {
    /// Wraps an existing token and ledger.
    pub fn new(chain_id: u64, token: T, ledger: Ledger) -> Self {
        Self {
            chain_id,
            token,
            ledger,
            nonces: HashMap::new(),
            receipts: Vec::new(),
        }
    }

    /// The chain id signed calls must commit to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The token resource.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// The address of the token resource.
    pub fn token_address(&self) -> Address {
        self.token.address()
    }

    /// The ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The deposited balance of `account`.
    pub fn balances(&self, account: Address) -> Balance {
        self.ledger.balances(account)
    }

    /// The current authorized signer.
    pub fn signer_address(&self) -> Address {
        self.ledger.signer_address()
    }

    /// The ledger owner.
    pub fn owner(&self) -> Address {
        self.ledger.owner()
    }

    /// The token balance of `account`.
    pub fn token_balance(&self, account: Address) -> Balance {
        self.token.balance_of(account)
    }

    /// The token allowance from `owner` to `spender`.
    pub fn allowance(&self, owner: Address, spender: Address) -> Balance {
        self.token.allowance(owner, spender)
    }

    /// The next nonce `account` must sign with.
    pub fn nonce(&self, account: Address) -> Nonce {
        self.nonces.get(&account).copied().unwrap_or_default()
    }

    /// Receipts with an index of at least `from`.
    pub fn receipts(&self, from: u64) -> &[Receipt] {
        let start = (from as usize).min(self.receipts.len());
        &self.receipts[start..]
    }

    /// Number of committed calls.
    pub fn receipt_count(&self) -> u64 {
        self.receipts.len() as u64
    }

    /// Reattaches a receipt log that was stored apart from the state.
    pub fn restore_receipts(&mut self, receipts: Vec<Receipt>) {
        self.receipts = receipts;
    }

    /// Whether the ledger holds at least as many tokens as it has credited.
    pub fn is_solvent(&self) -> bool {
        self.ledger.total_deposits() <= self.token.balance_of(self.ledger.address())
    }

    /// Applies `call` on behalf of `caller`, committing only on success.
    pub fn apply(&mut self, caller: Address, call: Call) -> Result<Receipt, RuntimeError> {
        debug!("Applying {} from {:?}", call, caller);

        let mut token = self.token.clone();
        let mut ledger = self.ledger.clone();

        let events = match execute(&mut token, &mut ledger, caller, &call) {
            Ok(events) => events,
            Err(e) => {
                warn!("Call {} from {:?} reverted: {}", call, caller, e);
                return Err(e.into());
            }
        };

        self.token = token;
        self.ledger = ledger;

        let receipt = Receipt {
            index: self.receipts.len() as u64,
            caller,
            call,
            events,
        };
        self.receipts.push(receipt.clone());
        Ok(receipt)
    }

    /// Recovers the sender of `signed`, checks its nonce and applies it.
    ///
    /// The nonce is consumed even when the call reverts, so a reverted
    /// envelope can never be replayed later.
    pub fn apply_signed(&mut self, signed: &SignedCall) -> Result<Receipt, RuntimeError> {
        let payload = call_payload(self.chain_id, signed.nonce, &signed.call)?;
        let caller = recover_personal(&payload, &signed.signature)?;

        let expected = self.nonce(caller);
        if signed.nonce != expected {
            return Err(RuntimeError::InvalidNonce {
                expected,
                actual: signed.nonce,
            });
        }
        self.nonces.insert(caller, expected + 1);

        self.apply(caller, signed.call.clone())
    }
}

fn execute<T: TokenResource>(
    token: &mut T,
    ledger: &mut Ledger,
    caller: Address,
    call: &Call,
) -> Result<Vec<LedgerEvent>, LedgerError> {
    match call {
        Call::Approve { spender, amount } => {
            token.approve(caller, *spender, *amount)?;
            Ok(Vec::new())
        }
        Call::Transfer { to, amount } => {
            if *to == ledger.address() {
                // Tokens sent straight to custody are never credited
                warn!("Direct token transfer of {} from {:?} to the ledger", amount, caller);
            }
            token.transfer(caller, *to, *amount)?;
            Ok(Vec::new())
        }
        Call::Deposit { amount } => Ok(vec![ledger.deposit(token, caller, *amount)?]),
        Call::Withdraw { amount, signature } => {
            Ok(vec![ledger.withdraw(token, caller, *amount, signature)?])
        }
        Call::SetSignerAddress { signer } => Ok(vec![ledger.set_signer_address(caller, *signer)?]),
        Call::Pay { value } => {
            ledger.receive(caller, *value)?;
            Ok(Vec::new())
        }
    }
}
