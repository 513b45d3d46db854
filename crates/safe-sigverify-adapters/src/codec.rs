//! Signature blob parsing.
//!
//! The recovery pipeline handles exactly one signature per call. Callers
//! holding a Safe `signatures` blob split it first with
//! [`split_concatenated_signatures`].

use alloy::primitives::{hex, Bytes};

use safe_sigverify_core::{ParsedSignature, SignatureType, SigningError, SIGNATURE_LEN};

const WORD: usize = 32;

/// Parses one `0x`-prefixed 65-byte signature. Hex digits may be any case.
pub fn parse_signature(blob: &str) -> Result<ParsedSignature, SigningError> {
    if !blob.starts_with("0x") {
        return Err(SigningError::MalformedSignature(
            "signature must be 0x-prefixed hex".to_owned(),
        ));
    }
    let bytes = hex::decode(blob)
        .map_err(|e| SigningError::MalformedSignature(format!("invalid hex: {e}")))?;

    if bytes.len() != SIGNATURE_LEN {
        if bytes.len() > SIGNATURE_LEN && bytes.len() % SIGNATURE_LEN == 0 {
            return Err(SigningError::UnsupportedMultiSignature {
                count: bytes.len() / SIGNATURE_LEN,
            });
        }
        return Err(SigningError::MalformedSignatureLength { len: bytes.len() });
    }

    let mut record = [0u8; SIGNATURE_LEN];
    record.copy_from_slice(&bytes);
    let parsed = ParsedSignature::from_bytes(&record);

    if !hex::encode_prefixed(parsed.to_bytes()).eq_ignore_ascii_case(blob) {
        return Err(SigningError::MalformedSignature(
            "signature does not re-encode to its input".to_owned(),
        ));
    }

    Ok(parsed)
}

pub fn classify(v: u8) -> SignatureType {
    SignatureType::from_v(v)
}

/// Splits a Safe `signatures` blob into one entry per owner.
///
/// Static parts are 65 bytes each. A contract signature (`v == 0`) stores in
/// `s` the offset of its dynamic part (`length || data`), which is appended to
/// that entry. The static region ends at the lowest dynamic offset.
pub fn split_concatenated_signatures(blob: &[u8]) -> Result<Vec<Bytes>, SigningError> {
    if blob.len() < SIGNATURE_LEN {
        return Err(SigningError::MalformedSignatureLength { len: blob.len() });
    }

    let mut static_end = blob.len();
    let mut offset = 0;
    let mut out = Vec::new();

    while offset + SIGNATURE_LEN <= static_end {
        let record = &blob[offset..offset + SIGNATURE_LEN];
        let mut entry = record.to_vec();

        if classify(record[64]) == SignatureType::ContractSignature {
            let dynamic_at = word_to_offset(&record[WORD..2 * WORD]).ok_or_else(|| {
                SigningError::MalformedSignature("contract signature offset overflows".to_owned())
            })?;
            if dynamic_at < offset + SIGNATURE_LEN {
                return Err(SigningError::MalformedSignature(format!(
                    "contract signature offset {dynamic_at} points into the static region"
                )));
            }
            let len_end = dynamic_at
                .checked_add(WORD)
                .filter(|end| *end <= blob.len())
                .ok_or_else(|| {
                    SigningError::MalformedSignature(format!(
                        "contract signature offset {dynamic_at} out of range"
                    ))
                })?;
            let data_len = word_to_offset(&blob[dynamic_at..len_end]).ok_or_else(|| {
                SigningError::MalformedSignature("contract signature length overflows".to_owned())
            })?;
            let data_end = len_end
                .checked_add(data_len)
                .filter(|end| *end <= blob.len())
                .ok_or_else(|| {
                    SigningError::MalformedSignature(
                        "contract signature data is truncated".to_owned(),
                    )
                })?;

            entry.extend_from_slice(&blob[dynamic_at..data_end]);
            static_end = static_end.min(dynamic_at);
        }

        out.push(Bytes::from(entry));
        offset += SIGNATURE_LEN;
    }

    if offset != static_end {
        return Err(SigningError::MalformedSignature(format!(
            "{} trailing bytes after static signatures",
            static_end.saturating_sub(offset)
        )));
    }

    Ok(out)
}

fn word_to_offset(word: &[u8]) -> Option<usize> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let low: [u8; 8] = low.try_into().ok()?;
    usize::try_from(u64::from_be_bytes(low)).ok()
}
