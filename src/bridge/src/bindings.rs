/// Contract bindings for the deployed ledger and its token.
use crate::errors::BridgeError;
use custody_core::LedgerEvent;
use ethers::abi::{Abi, Detokenize, RawLog, Token, Tokenize};
use ethers::contract::{Contract, ContractCall};
use ethers::providers::Middleware;
use ethers::types::{Address, Bytes, Log, U256};
use std::sync::Arc;

/// ABI of the custody ledger contract.
pub const LEDGER_ABI: &str = include_str!("../contracts/CustodyLedger.abi");

/// ABI of the ERC-20 subset the ledger relies on.
pub const ERC20_ABI: &str = include_str!("../contracts/ERC20.abi");

fn parse_abi(raw: &str) -> Result<Abi, BridgeError> {
    serde_json::from_str(raw).map_err(|e| BridgeError::AbiError(format!("Invalid ABI: {}", e)))
}

fn method<M: Middleware, T: Tokenize, D: Detokenize>(
    contract: &Contract<M>,
    name: &str,
    args: T,
) -> Result<ContractCall<M, D>, BridgeError> {
    contract
        .method(name, args)
        .map_err(|e| BridgeError::ContractError(format!("{}: {}", name, e)))
}

/// The custody ledger contract interface.
pub struct LedgerContract<M: Middleware> {
    contract: Contract<M>,
}

impl<M: Middleware> LedgerContract<M> {
    /// Binds the contract deployed at `address`.
    pub fn new(address: Address, client: impl Into<Arc<M>>) -> Result<Self, BridgeError> {
        let contract = Contract::new(address, parse_abi(LEDGER_ABI)?, client.into());
        Ok(Self { contract })
    }

    /// The contract's address.
    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// The contract's ABI.
    pub fn abi(&self) -> &Abi {
        self.contract.abi()
    }

    /// Pulls `amount` approved tokens from the sender into the ledger.
    pub fn deposit(&self, amount: U256) -> Result<ContractCall<M, ()>, BridgeError> {
        method(&self.contract, "deposit", (amount,))
    }

    /// Withdraws `amount` tokens using a signer's authorization.
    pub fn withdraw(&self, amount: U256, signature: Bytes) -> Result<ContractCall<M, ()>, BridgeError> {
        method(&self.contract, "withdraw", (amount, signature))
    }

    /// Replaces the authorized signer.
    pub fn set_signer_address(&self, signer: Address) -> Result<ContractCall<M, ()>, BridgeError> {
        method(&self.contract, "setSignerAddress", (signer,))
    }

    pub fn balances(&self, account: Address) -> Result<ContractCall<M, U256>, BridgeError> {
        method(&self.contract, "balances", (account,))
    }

    pub fn signer_address(&self) -> Result<ContractCall<M, Address>, BridgeError> {
        method(&self.contract, "signerAddress", ())
    }

    pub fn owner(&self) -> Result<ContractCall<M, Address>, BridgeError> {
        method(&self.contract, "owner", ())
    }

    pub fn token(&self) -> Result<ContractCall<M, Address>, BridgeError> {
        method(&self.contract, "token", ())
    }
}

/// The ERC-20 token interface.
pub struct TokenContract<M: Middleware> {
    contract: Contract<M>,
}

impl<M: Middleware> TokenContract<M> {
    /// Binds the token deployed at `address`.
    pub fn new(address: Address, client: impl Into<Arc<M>>) -> Result<Self, BridgeError> {
        let contract = Contract::new(address, parse_abi(ERC20_ABI)?, client.into());
        Ok(Self { contract })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn approve(&self, spender: Address, amount: U256) -> Result<ContractCall<M, bool>, BridgeError> {
        method(&self.contract, "approve", (spender, amount))
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Result<ContractCall<M, U256>, BridgeError> {
        method(&self.contract, "allowance", (owner, spender))
    }

    pub fn balance_of(&self, account: Address) -> Result<ContractCall<M, U256>, BridgeError> {
        method(&self.contract, "balanceOf", (account,))
    }
}

/// Decodes a `Deposit` or `Withdraw` log emitted by the ledger.
///
/// Returns `Ok(None)` for any other log.
pub fn parse_ledger_log(abi: &Abi, log: &Log) -> Result<Option<LedgerEvent>, BridgeError> {
    let topic = match log.topics.first() {
        Some(topic) => *topic,
        None => return Ok(None),
    };

    for name in ["Deposit", "Withdraw"] {
        let event = abi
            .event(name)
            .map_err(|e| BridgeError::AbiError(e.to_string()))?;
        if event.signature() != topic {
            continue;
        }

        let parsed = event
            .parse_log(RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            })
            .map_err(|e| BridgeError::AbiError(format!("Malformed {} log: {}", name, e)))?;

        let mut account = None;
        let mut amount = None;
        for param in parsed.params {
            match (param.name.as_str(), param.value) {
                ("account", Token::Address(value)) => account = Some(value),
                ("amount", Token::Uint(value)) => amount = Some(value),
                _ => {}
            }
        }

        let (account, amount) = account
            .zip(amount)
            .ok_or_else(|| BridgeError::AbiError(format!("Malformed {} log", name)))?;

        return Ok(Some(if name == "Deposit" {
            LedgerEvent::Deposit { account, amount }
        } else {
            LedgerEvent::Withdraw { account, amount }
        }));
    }

    Ok(None)
}
