//! Tests for the withdrawal authorization encoding.

#![cfg(test)]

use custody_core::signature::{
    authorization_message, recover_authorizer, SECP256K1_HALF_ORDER, SIGNATURE_LENGTH,
};
use custody_core::{Address, Authorizer, Balance, SignatureError, U256};
use ethers::abi::{encode_packed, Token};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::keccak256;
use rand::Rng;

fn random_account() -> Address {
    let mut raw = [0u8; 20];
    rand::thread_rng().fill(&mut raw);
    Address::from(raw)
}

fn random_wallet() -> LocalWallet {
    LocalWallet::new(&mut rand::thread_rng())
}

#[test]
fn test_message_matches_abi_encode_packed() {
    let mut rng = rand::thread_rng();
    for _ in 0..16 {
        let account = random_account();
        let amount = U256::from(rng.gen::<u128>());

        let mut word = [0u8; 32];
        amount.to_big_endian(&mut word);
        let packed =
            encode_packed(&[Token::Address(account), Token::FixedBytes(word.to_vec())]).unwrap();
        assert_eq!(packed.len(), 52);
        assert_eq!(authorization_message(account, amount).0, keccak256(packed));
    }
}

#[tokio::test]
async fn test_wallet_personal_sign_is_accepted() {
    // A signer using only a stock wallet's personal_sign must interoperate
    let wallet = random_wallet();
    let account = random_account();
    let amount = Balance::from(1000u64);

    let message = authorization_message(account, amount);
    let signature = wallet.sign_message(message.as_bytes()).await.unwrap();
    let bytes = signature.to_vec();
    assert_eq!(bytes.len(), SIGNATURE_LENGTH);

    assert_eq!(recover_authorizer(account, amount, &bytes).unwrap(), wallet.address());

    let authorizer = Authorizer::new(wallet.clone());
    assert_eq!(authorizer.authorize(account, amount).unwrap().to_vec(), bytes);
}

#[test]
fn test_signing_the_raw_packed_bytes_is_not_accepted() {
    let wallet = random_wallet();
    let authorizer = Authorizer::new(wallet.clone());
    let account = random_account();
    let amount = Balance::from(7u64);

    // Signing the packed pair instead of its hash yields a different signer
    let packed = encode_packed(&[Token::Address(account), Token::Uint(amount)]).unwrap();
    let signature = authorizer.sign_personal(&packed).unwrap();
    let recovered = recover_authorizer(account, amount, &signature);
    assert!(recovered.map(|a| a != wallet.address()).unwrap_or(true));
}

#[test]
fn test_rejects_unnormalized_recovery_byte() {
    let authorizer = Authorizer::new(random_wallet());
    let account = random_account();
    let amount = Balance::from(1u64);

    let mut signature = authorizer.authorize(account, amount).unwrap().to_vec();
    signature[64] -= 27;
    assert!(matches!(
        recover_authorizer(account, amount, &signature),
        Err(SignatureError::InvalidRecoveryId(v)) if v < 2
    ));
}

#[test]
fn test_rejects_malleated_signature() {
    let authorizer = Authorizer::new(random_wallet());
    let account = random_account();
    let amount = Balance::from(1u64);

    let signature = authorizer.authorize(account, amount).unwrap().to_vec();

    // (r, n - s, v ^ 1) recovers the same key on the curve but is not canonical
    let order = SECP256K1_HALF_ORDER * 2 + 1;
    let s = U256::from_big_endian(&signature[32..64]);
    let mut flipped = [0u8; 32];
    (order - s).to_big_endian(&mut flipped);

    let mut malleated = signature.clone();
    malleated[32..64].copy_from_slice(&flipped);
    malleated[64] = if signature[64] == 27 { 28 } else { 27 };

    assert_eq!(
        recover_authorizer(account, amount, &malleated),
        Err(SignatureError::HighS)
    );
}

#[test]
fn test_rejects_wrong_lengths() {
    let account = random_account();
    let amount = Balance::from(1u64);
    for len in [0usize, 64, 66, 130] {
        assert_eq!(
            recover_authorizer(account, amount, &vec![1u8; len]),
            Err(SignatureError::InvalidLength(len))
        );
    }
}
