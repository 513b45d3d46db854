use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Length of a single `r || s || v` signature record.
pub const SIGNATURE_LEN: usize = 65;

/// Safe signature scheme, multiplexed through the recovery byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureType {
    /// `v == 0`: EIP-1271 contract signature, owner in `r`.
    ContractSignature,
    /// `v == 1`: hash pre-approved on chain, owner in `r`.
    ApprovedHash,
    /// `v > 30`: `eth_sign` over the personal-message hash, `v` shifted by 4.
    EthSign,
    Eoa,
}

impl SignatureType {
    pub fn from_v(v: u8) -> Self {
        if v == 0 {
            Self::ContractSignature
        } else if v == 1 {
            Self::ApprovedHash
        } else if v > 30 {
            Self::EthSign
        } else {
            Self::Eoa
        }
    }

    /// Whether the owner is embedded in `r` rather than recovered.
    pub fn is_embedded_owner(self) -> bool {
        matches!(self, Self::ContractSignature | Self::ApprovedHash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl ParsedSignature {
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Self {
        Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    pub fn signature_type(&self) -> SignatureType {
        SignatureType::from_v(self.v)
    }

    /// Address stored in the low 20 bytes of `r`.
    pub fn embedded_owner(&self) -> Address {
        Address::from_word(self.r)
    }
}
