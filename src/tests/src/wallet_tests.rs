//! Tests for CLI wallets acting as signer and depositor.

#![cfg(test)]

use custody_cli::commands::authorize;
use custody_cli::Wallet;
use custody_core::{Balance, Call, MemoryToken, Runtime};
use tempfile::tempdir;

fn runtime_for(owner: &Wallet) -> Runtime<MemoryToken> {
    Runtime::genesis(
        31337,
        owner.address().unwrap(),
        "Token",
        "TKN",
        Balance::from(1_000_000u64),
    )
}

/// Tests that an authorization printed by the CLI releases a withdrawal.
#[tokio::test]
async fn test_cli_authorization_releases_withdrawal() {
    let dir = tempdir().unwrap();
    let signer_path = dir.path().join("signer.dat");
    let signer = Wallet::new().unwrap();
    signer.save(&signer_path).unwrap();

    let mut depositor = Wallet::new().unwrap();
    depositor.set_account_index(3);
    let b = depositor.address().unwrap();

    let mut runtime = runtime_for(&signer);
    let ledger = runtime.ledger().address();
    let owner = signer.address().unwrap();
    runtime
        .apply(owner, Call::Transfer { to: b, amount: Balance::from(1000u64) })
        .unwrap();
    runtime
        .apply(b, Call::Approve { spender: ledger, amount: Balance::from(1000u64) })
        .unwrap();
    runtime
        .apply(b, Call::Deposit { amount: Balance::from(1000u64) })
        .unwrap();

    let account = format!("{:?}", b);
    let signature = authorize::run(&signer_path, &account, Balance::from(1000u64))
        .await
        .unwrap();

    // The printed hex verifies offline before it is used
    let printed = format!("0x{}", hex::encode(&signature));
    assert_eq!(
        authorize::verify(&account, Balance::from(1000u64), &printed).unwrap(),
        owner
    );

    runtime
        .apply(b, Call::Withdraw { amount: Balance::from(1000u64), signature })
        .unwrap();
    assert_eq!(runtime.balances(b), Balance::zero());
    assert_eq!(runtime.token_balance(b), Balance::from(1000u64));
}

/// Tests that a restored wallet keeps signing for the same ledger signer.
#[test]
fn test_restored_wallet_keeps_signer_identity() {
    let signer = Wallet::new().unwrap();
    let restored = Wallet::from_phrase(signer.mnemonic()).unwrap();

    let runtime = runtime_for(&signer);
    assert_eq!(runtime.signer_address(), restored.address().unwrap());
}
