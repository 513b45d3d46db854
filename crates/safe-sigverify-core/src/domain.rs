use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// EIP-712 domain of a Safe.
///
/// Pre-1.3.0 Safes hash a domain without `chainId`. The field is absent from
/// the domain type, not zeroed, so the two variants have different type hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainSeparator {
    #[serde(rename_all = "camelCase")]
    WithChainId {
        chain_id: U256,
        verifying_contract: Address,
    },
    #[serde(rename_all = "camelCase")]
    ContractOnly { verifying_contract: Address },
}

impl DomainSeparator {
    pub fn verifying_contract(&self) -> Address {
        match self {
            Self::WithChainId {
                verifying_contract, ..
            }
            | Self::ContractOnly { verifying_contract } => *verifying_contract,
        }
    }

    pub fn chain_id(&self) -> Option<U256> {
        match self {
            Self::WithChainId { chain_id, .. } => Some(*chain_id),
            Self::ContractOnly { .. } => None,
        }
    }

    pub fn to_eip712_domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            None,
            None,
            self.chain_id(),
            Some(self.verifying_contract()),
            None,
        )
    }

    /// `hashStruct(EIP712Domain)`.
    pub fn hash(&self) -> B256 {
        self.to_eip712_domain().separator()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Operation {
    #[default]
    Call,
    DelegateCall,
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(format!("unknown operation {other}")),
        }
    }
}

/// Fields of a Safe transaction as received from callers.
///
/// `value` and `gas_price` stay textual until hashing; nullable fields are
/// resolved to protocol zero values by the hasher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxFields {
    pub to: Address,
    pub value: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub operation: Operation,
    pub nonce: U256,
    #[serde(default)]
    pub safe_tx_gas: Option<U256>,
    #[serde(default)]
    pub base_gas: Option<U256>,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub gas_token: Option<Address>,
    #[serde(default)]
    pub refund_receiver: Option<Address>,
}

impl SafeTxFields {
    /// A plain call with every optional field left unset.
    pub fn call(to: Address, value: impl Into<String>, nonce: U256) -> Self {
        Self {
            to,
            value: value.into(),
            data: None,
            operation: Operation::Call,
            nonce,
            safe_tx_gas: None,
            base_gas: None,
            gas_price: None,
            gas_token: None,
            refund_receiver: None,
        }
    }
}

/// Message a Safe is asked to endorse.
///
/// Deserialises untagged: a JSON string is a raw message, an object is
/// EIP-712 typed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SafeMessagePayload {
    RawString(String),
    TypedData(Value),
}
