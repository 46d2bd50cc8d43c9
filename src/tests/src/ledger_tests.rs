//! Tests for deposits, withdrawals and signer administration.

#![cfg(test)]

use custody_core::runtime::contract_address;
use custody_core::{
    Address, Authorizer, Balance, Ledger, LedgerError, LedgerEvent, MemoryToken, TokenError,
    TokenResource,
};

const OWNER_KEY: &str = "0123456789012345678901234567890123456789012345678901234567890123";
const DEPOSITOR_KEY: &str = "1111111111111111111111111111111111111111111111111111111111111111";
const OTHER_KEY: &str = "3210987654321098765432109876543210987654321098765432109876543210";

struct World {
    owner: Authorizer,
    depositor: Authorizer,
    token: MemoryToken,
    ledger: Ledger,
}

fn amount(n: u64) -> Balance {
    Balance::from(n)
}

/// Deploys the token and the ledger, then hands the depositor 1000 tokens.
fn deploy() -> World {
    let owner = Authorizer::from_key_hex(OWNER_KEY).unwrap();
    let depositor = Authorizer::from_key_hex(DEPOSITOR_KEY).unwrap();

    let mut token = MemoryToken::deploy(
        contract_address(owner.address(), 0),
        owner.address(),
        "Token",
        "TKN",
        amount(1_000_000),
    );
    let ledger = Ledger::deploy(contract_address(owner.address(), 1), owner.address(), token.address());

    token
        .transfer(owner.address(), depositor.address(), amount(1000))
        .unwrap();

    World {
        owner,
        depositor,
        token,
        ledger,
    }
}

/// Approves and deposits `n` tokens from the depositor.
fn deposit(world: &mut World, n: u64) {
    let b = world.depositor.address();
    world.token.approve(b, world.ledger.address(), amount(n)).unwrap();
    world.ledger.deposit(&mut world.token, b, amount(n)).unwrap();
}

#[test]
fn test_full_withdrawal_scenario() {
    let mut world = deploy();
    let b = world.depositor.address();

    deposit(&mut world, 1000);
    assert_eq!(world.ledger.balances(b), amount(1000));
    assert_eq!(world.token.balance_of(b), Balance::zero());

    let signature = world.owner.authorize(b, amount(1000)).unwrap();
    let event = world
        .ledger
        .withdraw(&mut world.token, b, amount(1000), &signature)
        .unwrap();

    assert_eq!(event, LedgerEvent::Withdraw { account: b, amount: amount(1000) });
    assert_eq!(world.ledger.balances(b), Balance::zero());
    assert_eq!(world.token.balance_of(b), amount(1000));
    assert_eq!(world.token.balance_of(world.ledger.address()), Balance::zero());
}

#[test]
fn test_partial_withdrawal_scenario() {
    let mut world = deploy();
    let b = world.depositor.address();

    deposit(&mut world, 1000);

    let signature = world.owner.authorize(b, amount(500)).unwrap();
    world
        .ledger
        .withdraw(&mut world.token, b, amount(500), &signature)
        .unwrap();

    assert_eq!(world.ledger.balances(b), amount(500));
    assert_eq!(world.token.balance_of(b), amount(500));
    assert_eq!(world.token.balance_of(world.ledger.address()), amount(500));
}

#[test]
fn test_deposit_moves_exactly_the_amount() {
    let mut world = deploy();
    let b = world.depositor.address();

    world.token.approve(b, world.ledger.address(), amount(1000)).unwrap();
    for (n, expected) in [(1u64, 1u64), (99, 100), (400, 500)] {
        let event = world.ledger.deposit(&mut world.token, b, amount(n)).unwrap();
        assert_eq!(event, LedgerEvent::Deposit { account: b, amount: amount(n) });
        assert_eq!(world.ledger.balances(b), amount(expected));
        assert_eq!(world.token.balance_of(b), amount(1000 - expected));
    }
    assert_eq!(world.token.allowance(b, world.ledger.address()), amount(500));
}

#[test]
fn test_deposit_failures() {
    let mut world = deploy();
    let b = world.depositor.address();
    let ledger = world.ledger.address();

    // No allowance at all
    assert_eq!(
        world.ledger.deposit(&mut world.token, b, amount(1)),
        Err(LedgerError::NotApproved)
    );

    // Allowance covers the amount but the balance does not
    world.token.approve(b, ledger, amount(5000)).unwrap();
    assert_eq!(
        world.ledger.deposit(&mut world.token, b, amount(1001)),
        Err(LedgerError::InsufficientTokenBalance)
    );

    // Allowance short and balance short reports the allowance first
    world.token.approve(b, ledger, amount(10)).unwrap();
    assert_eq!(
        world.ledger.deposit(&mut world.token, b, amount(2000)),
        Err(LedgerError::NotApproved)
    );

    assert_eq!(world.ledger.balances(b), Balance::zero());
    assert_eq!(world.token.balance_of(b), amount(1000));
}

#[test]
fn test_zero_deposit_is_accepted() {
    let mut world = deploy();
    let b = world.depositor.address();

    let event = world.ledger.deposit(&mut world.token, b, Balance::zero()).unwrap();
    assert_eq!(event, LedgerEvent::Deposit { account: b, amount: Balance::zero() });
    assert_eq!(world.ledger.balances(b), Balance::zero());
}

#[test]
fn test_authorization_is_bound_to_account_and_amount() {
    let mut world = deploy();
    let b = world.depositor.address();
    deposit(&mut world, 1000);

    let signature = world.owner.authorize(b, amount(500)).unwrap();

    // Another amount
    assert_eq!(
        world.ledger.withdraw(&mut world.token, b, amount(400), &signature),
        Err(LedgerError::InvalidSignature)
    );

    // Another account with no deposit stops at the balance check
    let other = Authorizer::from_key_hex(OTHER_KEY).unwrap().address();
    assert_eq!(
        world.ledger.withdraw(&mut world.token, other, amount(500), &signature),
        Err(LedgerError::InsufficientBalance)
    );

    // Once funded, the other account still cannot spend it
    let ledger = world.ledger.address();
    world
        .token
        .transfer(world.owner.address(), other, amount(1000))
        .unwrap();
    world.token.approve(other, ledger, amount(1000)).unwrap();
    world.ledger.deposit(&mut world.token, other, amount(1000)).unwrap();
    assert_eq!(
        world.ledger.withdraw(&mut world.token, other, amount(500), &signature),
        Err(LedgerError::InvalidSignature)
    );

    assert_eq!(world.ledger.balances(b), amount(1000));
    assert_eq!(world.ledger.balances(other), amount(1000));
}

#[test]
fn test_authorization_can_be_reused_while_balance_lasts() {
    let mut world = deploy();
    let b = world.depositor.address();
    deposit(&mut world, 1000);

    let signature = world.owner.authorize(b, amount(500)).unwrap();
    for _ in 0..2 {
        world
            .ledger
            .withdraw(&mut world.token, b, amount(500), &signature)
            .unwrap();
    }
    assert_eq!(world.ledger.balances(b), Balance::zero());

    assert_eq!(
        world.ledger.withdraw(&mut world.token, b, amount(500), &signature),
        Err(LedgerError::InsufficientBalance)
    );
}

#[test]
fn test_insufficient_balance_wins_over_bad_signature() {
    let mut world = deploy();
    let b = world.depositor.address();
    deposit(&mut world, 100);

    let garbage = vec![0u8; 3];
    assert_eq!(
        world.ledger.withdraw(&mut world.token, b, amount(101), &garbage),
        Err(LedgerError::InsufficientBalance)
    );
}

#[test]
fn test_foreign_signer_is_rejected() {
    let mut world = deploy();
    let b = world.depositor.address();
    deposit(&mut world, 1000);

    // The depositor signing for itself is not enough
    let signature = world.depositor.authorize(b, amount(1000)).unwrap();
    assert_eq!(
        world.ledger.withdraw(&mut world.token, b, amount(1000), &signature),
        Err(LedgerError::InvalidSignature)
    );
    assert_eq!(world.ledger.balances(b), amount(1000));
}

#[test]
fn test_signer_rotation() {
    let mut world = deploy();
    let b = world.depositor.address();
    let new_signer = Authorizer::from_key_hex(OTHER_KEY).unwrap();
    deposit(&mut world, 1000);

    let old_signature = world.owner.authorize(b, amount(100)).unwrap();

    // Only the owner may rotate
    assert_eq!(
        world.ledger.set_signer_address(b, new_signer.address()),
        Err(LedgerError::NotOwner)
    );

    let event = world
        .ledger
        .set_signer_address(world.owner.address(), new_signer.address())
        .unwrap();
    assert_eq!(
        event,
        LedgerEvent::SignerChanged {
            previous: world.owner.address(),
            current: new_signer.address(),
        }
    );
    assert_eq!(world.ledger.signer_address(), new_signer.address());
    assert_eq!(world.ledger.owner(), world.owner.address());

    // Authorizations from the previous signer stop working
    assert_eq!(
        world.ledger.withdraw(&mut world.token, b, amount(100), &old_signature),
        Err(LedgerError::InvalidSignature)
    );

    let signature = new_signer.authorize(b, amount(100)).unwrap();
    world
        .ledger
        .withdraw(&mut world.token, b, amount(100), &signature)
        .unwrap();
    assert_eq!(world.ledger.balances(b), amount(900));
}

#[test]
fn test_bare_payment_is_rejected() {
    let world = deploy();
    for value in [Balance::zero(), amount(1), Balance::MAX] {
        assert_eq!(
            world.ledger.receive(world.depositor.address(), value),
            Err(LedgerError::InvalidTransaction)
        );
    }
}

#[test]
fn test_token_errors_surface_unchanged() {
    let mut world = deploy();
    let b = world.depositor.address();

    assert_eq!(
        world.token.transfer(b, Address::zero(), amount(1)),
        Err(TokenError::TransferToZero)
    );
    assert_eq!(
        LedgerError::from(TokenError::InsufficientBalance).to_string(),
        TokenError::InsufficientBalance.to_string()
    );
}
