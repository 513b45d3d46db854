#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::primitives::{eip191_hash_message, hex, Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use safe_sigverify_adapters::K256RecoveryAdapter;
use safe_sigverify_core::{RecoveryPort, SafeTxFields, SigningError};

/// First well-known development key.
const OWNER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn owner_signer() -> PrivateKeySigner {
    OWNER_KEY.parse().expect("valid owner key")
}

pub fn safe_address() -> Address {
    "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
        .parse()
        .expect("valid safe address")
}

pub fn recipient() -> Address {
    "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB"
        .parse()
        .expect("valid recipient address")
}

pub fn minimal_tx(nonce: u64) -> SafeTxFields {
    SafeTxFields::call(recipient(), "0", U256::from(nonce))
}

pub fn b256(raw: &str) -> B256 {
    raw.parse().expect("valid 32-byte hex")
}

fn encode(r: U256, s: U256, v: u8) -> String {
    let mut bytes = Vec::with_capacity(65);
    bytes.extend_from_slice(&r.to_be_bytes::<32>());
    bytes.extend_from_slice(&s.to_be_bytes::<32>());
    bytes.push(v);
    hex::encode_prefixed(bytes)
}

/// Plain ECDSA over `hash`, `v` in {27, 28}.
pub fn sign_eoa(hash: B256) -> String {
    let sig = owner_signer().sign_hash_sync(&hash).expect("sign hash");
    encode(sig.r(), sig.s(), 27 + u8::from(sig.v()))
}

/// `eth_sign` over `hash`, `v` in {31, 32}.
pub fn sign_eth_sign(hash: B256) -> String {
    let sig = owner_signer()
        .sign_hash_sync(&eip191_hash_message(hash))
        .expect("sign personal message");
    encode(sig.r(), sig.s(), 31 + u8::from(sig.v()))
}

/// Approved-hash or contract marker for `owner`.
pub fn embedded_owner_signature(owner: Address, v: u8) -> String {
    let mut r = [0u8; 32];
    r[12..].copy_from_slice(owner.as_slice());
    encode(U256::from_be_bytes(r), U256::ZERO, v)
}

/// Backend that counts how often recovery actually ran.
#[derive(Debug, Default, Clone)]
pub struct CountingRecovery {
    calls: Arc<AtomicUsize>,
}

impl CountingRecovery {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RecoveryPort for CountingRecovery {
    fn recover_address(
        &self,
        r: B256,
        s: B256,
        y_parity: bool,
        prehash: B256,
    ) -> Result<Address, SigningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        K256RecoveryAdapter.recover_address(r, s, y_parity, prehash)
    }
}
