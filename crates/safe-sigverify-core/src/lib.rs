pub mod domain;
pub mod ports;
pub mod signature;
pub mod version;

pub use domain::{DomainSeparator, Operation, SafeMessagePayload, SafeTxFields};
pub use ports::{RecoveryPort, SigningError};
pub use signature::{ParsedSignature, SignatureType, SIGNATURE_LEN};
pub use version::{includes_chain_id_in_domain, uses_base_gas_field_name, SafeVersion};
