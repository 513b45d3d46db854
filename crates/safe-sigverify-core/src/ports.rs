use alloy::primitives::{Address, B256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("malformed signature length: expected 65 bytes, got {len}")]
    MalformedSignatureLength { len: usize },
    #[error("unsupported multi-signature: blob holds {count} concatenated signatures")]
    UnsupportedMultiSignature { count: usize },
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    #[error("invalid recovery byte: {0}")]
    InvalidRecoveryByte(u8),
    #[error("Could not recover address")]
    RecoveryFailure,
    #[error("{0}")]
    Hashing(&'static str),
}

impl SigningError {
    pub const SAFE_TX: Self = Self::Hashing("Failed to hash SafeTx");
    pub const SAFE_MESSAGE: Self = Self::Hashing("Failed to hash SafeMessage");
}

/// Elliptic-curve public key recovery.
///
/// `prehash` is the exact 32-byte digest that was signed; callers have already
/// applied any message prefixing and reduced `v` to the parity bit.
pub trait RecoveryPort {
    fn recover_address(
        &self,
        r: B256,
        s: B256,
        y_parity: bool,
        prehash: B256,
    ) -> Result<Address, SigningError>;
}

impl<T: RecoveryPort + ?Sized> RecoveryPort for std::sync::Arc<T> {
    fn recover_address(
        &self,
        r: B256,
        s: B256,
        y_parity: bool,
        prehash: B256,
    ) -> Result<Address, SigningError> {
        (**self).recover_address(r, s, y_parity, prehash)
    }
}
