use std::borrow::Cow;

use alloy::dyn_abi::TypedData;
use alloy::primitives::{eip191_hash_message, hex, keccak256, Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolStruct;
use serde::Serialize;
use tracing::debug;

use safe_sigverify_core::{
    includes_chain_id_in_domain, uses_base_gas_field_name, DomainSeparator, SafeMessagePayload,
    SafeTxFields, SafeVersion, SigningError,
};

/// `SafeTx` as hashed by Safe >= 1.0.0.
mod current {
    use alloy::sol;

    sol! {
        struct SafeTx {
            address to;
            uint256 value;
            bytes data;
            uint8 operation;
            uint256 safeTxGas;
            uint256 baseGas;
            uint256 gasPrice;
            address gasToken;
            address refundReceiver;
            uint256 nonce;
        }
    }
}

/// `SafeTx` before 1.0.0 renamed `dataGas`.
mod legacy {
    use alloy::sol;

    sol! {
        struct SafeTx {
            address to;
            uint256 value;
            bytes data;
            uint8 operation;
            uint256 safeTxGas;
            uint256 dataGas;
            uint256 gasPrice;
            address gasToken;
            address refundReceiver;
            uint256 nonce;
        }
    }
}

sol! {
    struct SafeMessage {
        bytes message;
    }
}

/// The two `SafeTx` layouts. Only the sixth field name differs, which is
/// enough to change the type hash.
enum SafeTxStruct {
    Current(current::SafeTx),
    Legacy(legacy::SafeTx),
}

impl SafeTxStruct {
    fn hash_struct(&self) -> B256 {
        match self {
            Self::Current(tx) => tx.eip712_hash_struct(),
            Self::Legacy(tx) => tx.eip712_hash_struct(),
        }
    }
}

/// Domain, struct and final hash of one Safe transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxHashes {
    pub domain_hash: B256,
    pub message_hash: B256,
    pub safe_tx_hash: B256,
}

pub fn build_domain(
    chain_id: U256,
    verifying_contract: Address,
    version: Option<&SafeVersion>,
) -> DomainSeparator {
    if includes_chain_id_in_domain(version) {
        DomainSeparator::WithChainId {
            chain_id,
            verifying_contract,
        }
    } else {
        DomainSeparator::ContractOnly { verifying_contract }
    }
}

/// Chain ids arrive as decimal strings.
pub fn parse_chain_id(raw: &str) -> Result<U256, SigningError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SigningError::Hashing("Invalid chain id"));
    }
    U256::from_str_radix(raw, 10).map_err(|_| SigningError::Hashing("Invalid chain id"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SafeTxHasher;

impl SafeTxHasher {
    pub fn hash(
        &self,
        domain: &DomainSeparator,
        version: Option<&SafeVersion>,
        tx: &SafeTxFields,
    ) -> Result<B256, SigningError> {
        self.hashes(domain, version, tx).map(|h| h.safe_tx_hash)
    }

    pub fn hashes(
        &self,
        domain: &DomainSeparator,
        version: Option<&SafeVersion>,
        tx: &SafeTxFields,
    ) -> Result<SafeTxHashes, SigningError> {
        let domain_hash = domain.hash();
        let message_hash = safe_tx_struct(version, tx)?.hash_struct();
        Ok(SafeTxHashes {
            domain_hash,
            message_hash,
            safe_tx_hash: signing_hash(domain_hash, message_hash),
        })
    }

    /// EIP-712 `encodeType` of the `SafeTx` layout selected by `version`.
    pub fn type_string(version: Option<&SafeVersion>) -> Cow<'static, str> {
        if uses_base_gas_field_name(version) {
            current::SafeTx::eip712_encode_type()
        } else {
            legacy::SafeTx::eip712_encode_type()
        }
    }
}

fn safe_tx_struct(
    version: Option<&SafeVersion>,
    tx: &SafeTxFields,
) -> Result<SafeTxStruct, SigningError> {
    let value = parse_u256(&tx.value).ok_or_else(|| coerce_failure("value", &tx.value))?;
    let data = match tx.data.as_deref() {
        Some(raw) => hex::decode(raw)
            .map(Bytes::from)
            .map_err(|_| coerce_failure("data", raw))?,
        None => Bytes::new(),
    };
    let gas_price = match tx.gas_price.as_deref() {
        Some(raw) => parse_u256(raw).ok_or_else(|| coerce_failure("gasPrice", raw))?,
        None => U256::ZERO,
    };
    let operation = u8::from(tx.operation);
    let safe_tx_gas = tx.safe_tx_gas.unwrap_or_default();
    let base_gas = tx.base_gas.unwrap_or_default();
    let gas_token = tx.gas_token.unwrap_or_default();
    let refund_receiver = tx.refund_receiver.unwrap_or_default();

    if uses_base_gas_field_name(version) {
        Ok(SafeTxStruct::Current(current::SafeTx {
            to: tx.to,
            value,
            data,
            operation,
            safeTxGas: safe_tx_gas,
            baseGas: base_gas,
            gasPrice: gas_price,
            gasToken: gas_token,
            refundReceiver: refund_receiver,
            nonce: tx.nonce,
        }))
    } else {
        Ok(SafeTxStruct::Legacy(legacy::SafeTx {
            to: tx.to,
            value,
            data,
            operation,
            safeTxGas: safe_tx_gas,
            dataGas: base_gas,
            gasPrice: gas_price,
            gasToken: gas_token,
            refundReceiver: refund_receiver,
            nonce: tx.nonce,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SafeMessageHasher;

impl SafeMessageHasher {
    pub fn hash(
        &self,
        domain: &DomainSeparator,
        payload: &SafeMessagePayload,
    ) -> Result<B256, SigningError> {
        let inner = match payload {
            SafeMessagePayload::RawString(message) => eip191_hash_message(message.as_bytes()),
            SafeMessagePayload::TypedData(value) => {
                let typed: TypedData = serde_json::from_value(value.clone()).map_err(|e| {
                    debug!(error = %e, "typed data payload did not parse");
                    SigningError::SAFE_MESSAGE
                })?;
                typed.eip712_signing_hash().map_err(|e| {
                    debug!(error = %e, "typed data payload did not hash");
                    SigningError::SAFE_MESSAGE
                })?
            }
        };

        let message = SafeMessage {
            message: Bytes::copy_from_slice(inner.as_slice()),
        };
        Ok(signing_hash(domain.hash(), message.eip712_hash_struct()))
    }
}

/// A Safe as the gateway sees it: where it lives and which contract version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeContext {
    pub chain_id: U256,
    pub address: Address,
    pub version: Option<SafeVersion>,
}

impl SafeContext {
    pub fn new(chain_id: U256, address: Address, version: Option<SafeVersion>) -> Self {
        Self {
            chain_id,
            address,
            version,
        }
    }

    pub fn domain(&self) -> DomainSeparator {
        build_domain(self.chain_id, self.address, self.version.as_ref())
    }

    pub fn safe_tx_hashes(&self, tx: &SafeTxFields) -> Result<SafeTxHashes, SigningError> {
        SafeTxHasher.hashes(&self.domain(), self.version.as_ref(), tx)
    }

    pub fn safe_tx_hash(&self, tx: &SafeTxFields) -> Result<B256, SigningError> {
        self.safe_tx_hashes(tx).map(|h| h.safe_tx_hash)
    }

    pub fn message_hash(&self, payload: &SafeMessagePayload) -> Result<B256, SigningError> {
        SafeMessageHasher.hash(&self.domain(), payload)
    }
}

/// `keccak256(0x1901 || domainSeparator || structHash)`.
fn signing_hash(domain_hash: B256, struct_hash: B256) -> B256 {
    let mut buf = [0u8; 66];
    buf[..2].copy_from_slice(&[0x19, 0x01]);
    buf[2..34].copy_from_slice(domain_hash.as_slice());
    buf[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

fn parse_u256(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    let (digits, radix) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (raw, 10),
    };
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, radix).ok()
}

fn coerce_failure(field: &'static str, raw: &str) -> SigningError {
    debug!(field, raw, "safe tx field is not coercible");
    SigningError::SAFE_TX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u256_accepts_decimal_and_hex() {
        assert_eq!(parse_u256("42"), Some(U256::from(42)));
        assert_eq!(parse_u256("0x2a"), Some(U256::from(42)));
        assert_eq!(parse_u256(" 7 "), Some(U256::from(7)));
        assert_eq!(parse_u256(""), None);
        assert_eq!(parse_u256("0x"), None);
        assert_eq!(parse_u256("ten"), None);
    }

    #[test]
    fn signing_hash_matches_sol_struct() {
        let domain = DomainSeparator::WithChainId {
            chain_id: U256::from(5),
            verifying_contract: Address::repeat_byte(0x11),
        };
        let message = SafeMessage {
            message: Bytes::from_static(b"abc"),
        };
        assert_eq!(
            signing_hash(domain.hash(), message.eip712_hash_struct()),
            message.eip712_signing_hash(&domain.to_eip712_domain())
        );
    }

    #[test]
    fn chain_id_must_be_decimal() {
        assert_eq!(parse_chain_id("137"), Ok(U256::from(137)));
        assert!(parse_chain_id("0x89").is_err());
        assert!(parse_chain_id("").is_err());
    }
}
