//! Withdrawal authorizations.
//!
//! An authorization is a secp256k1 signature produced off-chain by the
//! authorized signer. The byte layout is a fixed contract shared with every
//! off-chain signer:
//!
//! 1. `message = keccak256(account (20 bytes) || amount (32 bytes, big endian))`,
//!    the same bytes Solidity's `abi.encodePacked(address, uint256)` produces;
//! 2. `digest = keccak256("\x19Ethereum Signed Message:\n32" || message)`,
//!    the wallet `personal_sign` convention over the 32-byte message;
//! 3. the signature is `r (32) || s (32) || v (1)` with `v` in `{27, 28}`
//!    and `s` in the lower half of the curve order.

use crate::errors::SignatureError;
use crate::types::{Address, Balance, Bytes, U256};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{RecoveryMessage, Signature, H256};
use ethers::utils::{hash_message, keccak256};

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Half of the secp256k1 group order; larger `s` values are malleable.
pub const SECP256K1_HALF_ORDER: U256 = U256([
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

/// Packs `(account, amount)` exactly like `abi.encodePacked(address, uint256)`.
pub fn encode_authorization(account: Address, amount: Balance) -> Vec<u8> {
    let mut packed = Vec::with_capacity(20 + 32);
    packed.extend_from_slice(account.as_bytes());

    let mut word = [0u8; 32];
    amount.to_big_endian(&mut word);
    packed.extend_from_slice(&word);

    packed
}

/// Computes the message an authorization for `(account, amount)` signs.
pub fn authorization_message(account: Address, amount: Balance) -> H256 {
    H256::from(keccak256(encode_authorization(account, amount)))
}

/// Recovers the account that personal-signed `payload`.
pub fn recover_personal(payload: &[u8], signature: &[u8]) -> Result<Address, SignatureError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::InvalidLength(signature.len()));
    }

    let v = signature[64];
    if v != 27 && v != 28 {
        return Err(SignatureError::InvalidRecoveryId(v));
    }

    let r = U256::from_big_endian(&signature[..32]);
    let s = U256::from_big_endian(&signature[32..64]);
    if s > SECP256K1_HALF_ORDER {
        return Err(SignatureError::HighS);
    }

    let signature = Signature { r, s, v: v as u64 };
    let digest = hash_message(payload);
    signature
        .recover(RecoveryMessage::Hash(digest))
        .map_err(|e| SignatureError::Recovery(e.to_string()))
}

/// Recovers the signer of an authorization for `(account, amount)`.
pub fn recover_authorizer(
    account: Address,
    amount: Balance,
    signature: &[u8],
) -> Result<Address, SignatureError> {
    let message = authorization_message(account, amount);
    recover_personal(message.as_bytes(), signature)
}

/// The off-chain half of the protocol: a signing key that issues
/// authorizations and signs call envelopes.
#[derive(Clone, Debug)]
pub struct Authorizer {
    wallet: LocalWallet,
}

impl Authorizer {
    /// Wraps an existing wallet.
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }

    /// Builds an authorizer from a hex-encoded secp256k1 private key.
    pub fn from_key_hex(key: &str) -> Result<Self, SignatureError> {
        let wallet = key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| SignatureError::Signing(format!("invalid private key: {}", e)))?;
        Ok(Self { wallet })
    }

    /// Builds an authorizer from raw private key bytes.
    pub fn from_key_bytes(key: &[u8]) -> Result<Self, SignatureError> {
        let wallet = LocalWallet::from_bytes(key)
            .map_err(|e| SignatureError::Signing(format!("invalid private key: {}", e)))?;
        Ok(Self { wallet })
    }

    /// The account whose signatures this authorizer produces.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Personal-signs an arbitrary payload.
    pub fn sign_personal(&self, payload: &[u8]) -> Result<Bytes, SignatureError> {
        let digest = hash_message(payload);
        let signature = self
            .wallet
            .sign_hash(digest)
            .map_err(|e| SignatureError::Signing(e.to_string()))?;
        Ok(Bytes::from(signature.to_vec()))
    }

    /// Issues an authorization for `account` to withdraw exactly `amount`.
    pub fn authorize(&self, account: Address, amount: Balance) -> Result<Bytes, SignatureError> {
        let message = authorization_message(account, amount);
        self.sign_personal(message.as_bytes())
    }
}
