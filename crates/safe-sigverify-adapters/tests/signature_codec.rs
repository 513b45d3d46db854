mod common;

use alloy::primitives::{hex, B256};
use safe_sigverify_adapters::{classify, parse_signature, split_concatenated_signatures};
use safe_sigverify_core::{SignatureType, SigningError};

use common::{embedded_owner_signature, owner_signer, sign_eoa};

#[test]
fn parses_single_signature() {
    let raw = sign_eoa(B256::repeat_byte(0x42));
    let parsed = parse_signature(&raw).expect("parse signature");
    assert!(parsed.v == 27 || parsed.v == 28);
    assert_eq!(hex::encode_prefixed(parsed.to_bytes()), raw);
}

#[test]
fn parsing_is_case_insensitive() {
    let raw = sign_eoa(B256::repeat_byte(0x42));
    let upper = format!("0x{}", raw[2..].to_ascii_uppercase());
    assert_eq!(
        parse_signature(&upper).expect("upper"),
        parse_signature(&raw).expect("lower")
    );
}

#[test]
fn rejects_concatenated_signatures() {
    let one = sign_eoa(B256::repeat_byte(0x42));
    let two = format!("{one}{}", &one[2..]);
    assert_eq!(
        parse_signature(&two),
        Err(SigningError::UnsupportedMultiSignature { count: 2 })
    );
}

#[test]
fn rejects_wrong_length() {
    let short = format!("0x{}", "11".repeat(64));
    assert_eq!(
        parse_signature(&short),
        Err(SigningError::MalformedSignatureLength { len: 64 })
    );
    let long = format!("0x{}", "11".repeat(66));
    assert_eq!(
        parse_signature(&long),
        Err(SigningError::MalformedSignatureLength { len: 66 })
    );
}

#[test]
fn rejects_stray_characters() {
    let raw = sign_eoa(B256::repeat_byte(0x42));
    let stray = format!("{}zz", &raw[..raw.len() - 2]);
    assert!(matches!(
        parse_signature(&stray),
        Err(SigningError::MalformedSignature(_))
    ));
    let odd = format!("{raw}1");
    assert!(matches!(
        parse_signature(&odd),
        Err(SigningError::MalformedSignature(_))
    ));
}

#[test]
fn requires_lowercase_0x_prefix() {
    let raw = sign_eoa(B256::repeat_byte(0x42));
    for input in [raw[2..].to_owned(), format!("0X{}", &raw[2..])] {
        assert!(matches!(
            parse_signature(&input),
            Err(SigningError::MalformedSignature(_))
        ));
    }
}

#[test]
fn classifier_matches_parsed_v() {
    let approved = embedded_owner_signature(owner_signer().address(), 1);
    let parsed = parse_signature(&approved).expect("parse approved hash");
    assert_eq!(classify(parsed.v), SignatureType::ApprovedHash);
}

#[test]
fn splits_static_signatures() {
    let a = sign_eoa(B256::repeat_byte(1));
    let b = embedded_owner_signature(owner_signer().address(), 1);
    let blob = hex::decode(format!("{a}{}", &b[2..])).expect("blob");

    let parts = split_concatenated_signatures(&blob).expect("split");
    assert_eq!(parts.len(), 2);
    assert_eq!(hex::encode_prefixed(&parts[0]), a);
    assert_eq!(hex::encode_prefixed(&parts[1]), b);
}

#[test]
fn splits_contract_signature_with_dynamic_part() {
    let eoa = hex::decode(sign_eoa(B256::repeat_byte(1))).expect("eoa");

    // Static part: r = verifier, s = offset of dynamic part (130), v = 0.
    let mut contract = vec![0u8; 65];
    contract[12..32].copy_from_slice(&[0xcc; 20]);
    contract[63] = 130;
    let mut dynamic = vec![0u8; 32];
    dynamic[31] = 3;
    dynamic.extend_from_slice(&[0xde, 0xad, 0xbe]);

    let mut blob = contract.clone();
    blob.extend_from_slice(&eoa);
    blob.extend_from_slice(&dynamic);

    let parts = split_concatenated_signatures(&blob).expect("split");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].len(), 65 + 32 + 3);
    assert_eq!(&parts[0][..65], contract.as_slice());
    assert_eq!(&parts[0][65..], dynamic.as_slice());
    assert_eq!(parts[1].as_ref(), eoa.as_slice());
}

#[test]
fn split_rejects_out_of_range_offset() {
    let mut contract = vec![0u8; 65];
    contract[63] = 200;
    assert!(matches!(
        split_concatenated_signatures(&contract),
        Err(SigningError::MalformedSignature(_))
    ));
}

#[test]
fn split_rejects_trailing_bytes() {
    let mut blob = hex::decode(sign_eoa(B256::repeat_byte(1))).expect("eoa");
    blob.extend_from_slice(&[0u8; 10]);
    assert!(matches!(
        split_concatenated_signatures(&blob),
        Err(SigningError::MalformedSignature(_))
    ));
}
