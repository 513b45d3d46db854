//! Request handlers for the CLI subcommands.

use alloy::primitives::{Address, B256, U256};
use eyre::WrapErr;
use serde::{Deserialize, Serialize};

use safe_sigverify_adapters::{
    parse_chain_id, parse_signature, SafeContext, SigVerifyConfig, SignatureVerifier,
};
use safe_sigverify_core::{SafeMessagePayload, SafeTxFields, SafeVersion, SignatureType};

/// Chain ids are decimal strings in the service API, numbers elsewhere.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChainIdInput {
    Number(u64),
    Text(String),
}

impl ChainIdInput {
    fn resolve(&self) -> eyre::Result<U256> {
        match self {
            Self::Number(n) => Ok(U256::from(*n)),
            Self::Text(raw) => parse_chain_id(raw).wrap_err_with(|| format!("chainId '{raw}'")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SafeRequest<T> {
    chain_id: ChainIdInput,
    safe_address: Address,
    #[serde(default)]
    safe_version: Option<SafeVersion>,
    #[serde(flatten)]
    body: T,
}

impl<T> SafeRequest<T> {
    fn context(&self) -> eyre::Result<SafeContext> {
        Ok(SafeContext::new(
            self.chain_id.resolve()?,
            self.safe_address,
            self.safe_version.clone(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TxBody {
    tx: SafeTxFields,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: SafeMessagePayload,
}

#[derive(Debug, Deserialize)]
struct RecoverRequest {
    signature: String,
    hash: B256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageHashResponse {
    safe_message_hash: B256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecoverResponse {
    signature_type: SignatureType,
    owner: String,
}

pub fn tx_hash(input: &str) -> eyre::Result<String> {
    let request: SafeRequest<TxBody> =
        serde_json::from_str(input).wrap_err("invalid tx-hash request")?;
    let ctx = request.context()?;
    let hashes = ctx
        .safe_tx_hashes(&request.body.tx)
        .wrap_err("failed to hash Safe transaction")?;
    tracing::info!(
        safe = %ctx.address,
        safe_tx_hash = %hashes.safe_tx_hash,
        "computed safe tx hash"
    );
    Ok(serde_json::to_string_pretty(&hashes)?)
}

pub fn message_hash(input: &str) -> eyre::Result<String> {
    let request: SafeRequest<MessageBody> =
        serde_json::from_str(input).wrap_err("invalid message-hash request")?;
    let ctx = request.context()?;
    let safe_message_hash = ctx
        .message_hash(&request.body.message)
        .wrap_err("failed to hash Safe message")?;
    tracing::info!(safe = %ctx.address, %safe_message_hash, "computed safe message hash");
    Ok(serde_json::to_string_pretty(&MessageHashResponse { safe_message_hash })?)
}

pub fn recover(input: &str) -> eyre::Result<String> {
    let request: RecoverRequest =
        serde_json::from_str(input).wrap_err("invalid recover request")?;
    let parsed = parse_signature(&request.signature).wrap_err("invalid signature")?;
    let signature_type = parsed.signature_type();

    let verifier = SignatureVerifier::from_config(&SigVerifyConfig::from_env());
    let owner = verifier
        .recoverer()
        .recover(&parsed, request.hash)
        .wrap_err("failed to recover owner")?;
    tracing::info!(%owner, ?signature_type, "recovered owner");

    Ok(serde_json::to_string_pretty(&RecoverResponse {
        signature_type,
        owner: owner.to_checksum(None),
    })?)
}
