//! Wallet implementation for the CLI.

use crate::errors::WalletError;
use bip32::{DerivationPath, Mnemonic, XPrv};
use custody_core::{Address, Authorizer};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// A BIP-39 wallet deriving secp256k1 accounts along `m/44'/60'/0'/0/<index>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// The BIP39 mnemonic for the wallet
    mnemonic: String,
    /// The current account index
    account_index: u32,
}

impl Wallet {
    /// Creates a new wallet with a random mnemonic.
    pub fn new() -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::random(OsRng, Default::default());

        Ok(Self {
            mnemonic: mnemonic.phrase().to_string(),
            account_index: 0,
        })
    }

    /// Restores a wallet from an existing mnemonic phrase.
    pub fn from_phrase(phrase: &str) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::new(phrase.trim(), Default::default())?;

        Ok(Self {
            mnemonic: mnemonic.phrase().to_string(),
            account_index: 0,
        })
    }

    /// Loads a wallet from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let wallet = serde_json::from_str(&contents)?;
        Ok(wallet)
    }

    /// Saves a wallet to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WalletError> {
        let contents = serde_json::to_string_pretty(self)?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        file.write_all(contents.as_bytes())?;

        Ok(())
    }

    /// Gets the mnemonic for the wallet.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Gets the current account index.
    pub fn account_index(&self) -> u32 {
        self.account_index
    }

    /// Sets the account index.
    pub fn set_account_index(&mut self, index: u32) {
        self.account_index = index;
    }

    /// Derives the signing key for the current account.
    pub fn authorizer(&self) -> Result<Authorizer, WalletError> {
        let mnemonic = Mnemonic::new(self.mnemonic.as_str(), Default::default())?;
        let seed = mnemonic.to_seed("");

        let path: DerivationPath = format!("m/44'/60'/0'/0/{}", self.account_index).parse()?;
        let xprv = XPrv::derive_from_path(seed, &path)?;

        Ok(Authorizer::from_key_bytes(&xprv.to_bytes())?)
    }

    /// Gets the address for the current account.
    pub fn address(&self) -> Result<Address, WalletError> {
        Ok(self.authorizer()?.address())
    }
}
