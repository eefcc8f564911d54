use birthmark_core::hashing::{canonical_encoding, digest_all, digest_feature, sha256_hex};
use birthmark_core::model::{Feature, OffsetVector};

fn feature(mnemonic: &str, a: i64, b: i64, c: i64) -> Feature {
    Feature::new(mnemonic, OffsetVector::new(a, b, c))
}

#[test]
fn canonical_encoding_sorts_keys_and_has_no_whitespace() {
    let encoded = canonical_encoding(&feature("bl", 1, 0, -2));
    assert_eq!(
        encoded,
        r#"{"branch_offset":-2,"codeblock_offset":0,"mnemonic":"bl","opcode_offset":1}"#
    );
}

#[test]
fn digest_is_sha256_of_canonical_encoding() {
    let f = feature("movs", 0, 0, 0);
    let digest = digest_feature(&f);
    assert_eq!(digest.as_str(), sha256_hex(canonical_encoding(&f).as_bytes()));
    assert_eq!(digest.as_str().len(), 64);
    assert!(digest.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn equal_features_share_a_digest() {
    assert_eq!(digest_feature(&feature("b", 2, 0, -2)), digest_feature(&feature("b", 2, 0, -2)));
}

#[test]
fn any_component_change_alters_the_digest() {
    let base = digest_feature(&feature("b", 2, 0, -2));
    for other in [
        feature("bl", 2, 0, -2),
        feature("b", 3, 0, -2),
        feature("b", 2, 1, -2),
        feature("b", 2, 0, 2),
    ] {
        assert_ne!(base, digest_feature(&other), "{other:?} collided");
    }
}

#[test]
fn sha256_hex_matches_known_vector() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn digest_all_preserves_order_and_features() {
    let features = vec![feature("movs", 0, 0, 0), feature("bx", 0, 1, 0)];
    let digested = digest_all(features.clone());
    assert_eq!(digested.len(), 2);
    assert_eq!(digested[0].feature, features[0]);
    assert_eq!(digested[1].digest, digest_feature(&features[1]));
}
