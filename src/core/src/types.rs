//! Core types for the custody ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use ethers::types::{Address, Bytes, U256};

/// Token balance, represented as a 256-bit unsigned integer to match `uint256`.
pub type Balance = U256;

/// Per-sender transaction sequence number.
pub type Nonce = u64;

/// Events emitted by the ledger for off-chain observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Tokens were pulled from `account` into the ledger.
    Deposit {
        /// The depositing account
        account: Address,
        /// The amount credited
        amount: Balance,
    },

    /// Tokens were pushed from the ledger back to `account`.
    Withdraw {
        /// The withdrawing account
        account: Address,
        /// The amount debited
        amount: Balance,
    },

    /// The owner replaced the authorized signer.
    SignerChanged {
        /// The signer before the call
        previous: Address,
        /// The signer after the call
        current: Address,
    },
}

/// A state-changing call submitted to the runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Approve `spender` to pull up to `amount` tokens from the caller.
    Approve {
        /// The account allowed to spend
        spender: Address,
        /// The new allowance
        amount: Balance,
    },

    /// Transfer tokens directly on the token resource.
    Transfer {
        /// The recipient
        to: Address,
        /// The amount to transfer
        amount: Balance,
    },

    /// Deposit tokens into the ledger.
    Deposit {
        /// The amount to deposit
        amount: Balance,
    },

    /// Withdraw tokens from the ledger with a signer authorization.
    Withdraw {
        /// The amount to withdraw
        amount: Balance,
        /// 65-byte `r || s || v` authorization over (caller, amount)
        signature: Bytes,
    },

    /// Replace the authorized signer (owner only).
    SetSignerAddress {
        /// The new signer
        signer: Address,
    },

    /// A bare native-currency payment to the ledger.
    Pay {
        /// The attached value
        value: Balance,
    },
}

/// A call signed by its sender, as submitted over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    /// The call to apply
    pub call: Call,
    /// The sender's next nonce
    pub nonce: Nonce,
    /// Personal-sign signature over the call payload
    pub signature: Bytes,
}

/// The record of a committed call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Position of the call in the runtime's log
    pub index: u64,
    /// The account that submitted the call
    pub caller: Address,
    /// The call that was applied
    pub call: Call,
    /// Events emitted while applying the call
    pub events: Vec<LedgerEvent>,
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::Deposit { account, amount } => {
                write!(f, "Deposit {{ account: {:?}, amount: {} }}", account, amount)
            }
            LedgerEvent::Withdraw { account, amount } => {
                write!(f, "Withdraw {{ account: {:?}, amount: {} }}", account, amount)
            }
            LedgerEvent::SignerChanged { previous, current } => {
                write!(
                    f,
                    "SignerChanged {{ previous: {:?}, current: {:?} }}",
                    previous, current
                )
            }
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::Approve { spender, amount } => {
                write!(f, "Approve {{ spender: {:?}, amount: {} }}", spender, amount)
            }
            Call::Transfer { to, amount } => {
                write!(f, "Transfer {{ to: {:?}, amount: {} }}", to, amount)
            }
            Call::Deposit { amount } => write!(f, "Deposit {{ amount: {} }}", amount),
            Call::Withdraw { amount, signature } => {
                write!(f, "Withdraw {{ amount: {}, signature: {} }}", amount, signature)
            }
            Call::SetSignerAddress { signer } => {
                write!(f, "SetSignerAddress {{ signer: {:?} }}", signer)
            }
            Call::Pay { value } => write!(f, "Pay {{ value: {} }}", value),
        }
    }
}

/// Parses a `0x`-prefixed or bare hex string into an address.
pub fn parse_address(s: &str) -> Option<Address> {
    let bytes = hex::decode(s.trim().trim_start_matches("0x")).ok()?;
    if bytes.len() != 20 {
        return None;
    }
    Some(Address::from_slice(&bytes))
}
