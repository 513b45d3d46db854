use alloy::primitives::{Address, B256};
use tracing::debug;

use safe_sigverify_core::{ParsedSignature, RecoveryPort, SigningError, SIGNATURE_LEN};

use crate::codec::{parse_signature, split_concatenated_signatures};
use crate::recovery::{K256RecoveryAdapter, OwnerRecoverer};
use crate::SigVerifyConfig;

/// Codec, classifier and recoverer wired together.
///
/// Whether a recovered owner is allowed to act stays with the caller;
/// [`SignatureVerifier::is_owner`] only compares against the list it is given.
#[derive(Debug)]
pub struct SignatureVerifier<R = K256RecoveryAdapter> {
    recoverer: OwnerRecoverer<R>,
}

impl SignatureVerifier<K256RecoveryAdapter> {
    pub fn from_config(config: &SigVerifyConfig) -> Self {
        Self::new(OwnerRecoverer::from_config(config))
    }
}

impl Default for SignatureVerifier<K256RecoveryAdapter> {
    fn default() -> Self {
        Self::from_config(&SigVerifyConfig::default())
    }
}

impl<R: RecoveryPort> SignatureVerifier<R> {
    pub fn new(recoverer: OwnerRecoverer<R>) -> Self {
        Self { recoverer }
    }

    pub fn recoverer(&self) -> &OwnerRecoverer<R> {
        &self.recoverer
    }

    /// Owner claimed by a single `0x`-prefixed 65-byte signature over `hash`.
    pub fn recover_owner(&self, signature: &str, hash: B256) -> Result<Address, SigningError> {
        let parsed = parse_signature(signature)?;
        self.recoverer.recover(&parsed, hash)
    }

    pub fn is_owner(
        &self,
        signature: &str,
        hash: B256,
        owners: &[Address],
    ) -> Result<bool, SigningError> {
        let owner = self.recover_owner(signature, hash)?;
        let known = owners.contains(&owner);
        if !known {
            debug!(%owner, "recovered signer is not a listed owner");
        }
        Ok(known)
    }

    /// Owners behind every entry of a concatenated Safe `signatures` blob, in
    /// blob order. Contract signatures yield the address stored in `r`.
    pub fn recover_owners(&self, blob: &[u8], hash: B256) -> Result<Vec<Address>, SigningError> {
        split_concatenated_signatures(blob)?
            .iter()
            .map(|entry| {
                let mut record = [0u8; SIGNATURE_LEN];
                record.copy_from_slice(&entry[..SIGNATURE_LEN]);
                self.recoverer
                    .recover(&ParsedSignature::from_bytes(&record), hash)
            })
            .collect()
    }
}
