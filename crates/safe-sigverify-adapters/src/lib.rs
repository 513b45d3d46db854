pub mod codec;
pub mod config;
pub mod hashing;
pub mod recovery;
pub mod verifier;

pub use codec::{classify, parse_signature, split_concatenated_signatures};
pub use config::SigVerifyConfig;
pub use hashing::{
    build_domain, parse_chain_id, SafeContext, SafeMessageHasher, SafeTxHasher, SafeTxHashes,
};
pub use recovery::{K256RecoveryAdapter, OwnerRecoverer, RecoveryCache};
pub use verifier::SignatureVerifier;
