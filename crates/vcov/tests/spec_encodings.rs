//! Decoding covariance specifications from TOML.

use hdreg_vcov::{CrvType, HcType, VcovSpec};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Wrapper {
    vcov: VcovSpec,
}

fn decode(src: &str) -> Result<VcovSpec, toml::de::Error> {
    toml::from_str::<Wrapper>(src).map(|w| w.vcov)
}

#[test]
fn string_encodings() {
    assert_eq!(decode(r#"vcov = "iid""#).unwrap(), VcovSpec::Iid);
    assert_eq!(
        decode(r#"vcov = "hetero""#).unwrap(),
        VcovSpec::Hetero(HcType::Hc1)
    );
    assert_eq!(
        decode(r#"vcov = "HC2""#).unwrap(),
        VcovSpec::Hetero(HcType::Hc2)
    );
}

#[test]
fn map_encoding() {
    let spec = decode(r#"vcov = { CRV1 = "firm" }"#).unwrap();
    assert_eq!(
        spec,
        VcovSpec::Cluster {
            kind: CrvType::Crv1,
            cluster: "firm".to_string()
        }
    );
}

#[test]
fn table_encoding() {
    let spec = decode("[vcov]\nCRV3 = \"state\"\n").unwrap();
    assert_eq!(spec.cluster(), Some("state"));
}

#[test]
fn single_element_list_encoding() {
    let spec = decode(r#"vcov = [{ CRV3 = "state" }]"#).unwrap();
    assert_eq!(
        spec,
        VcovSpec::Cluster {
            kind: CrvType::Crv3,
            cluster: "state".to_string()
        }
    );
}

#[test]
fn invalid_encodings_are_rejected() {
    let err = decode(r#"vcov = "HC4""#).unwrap_err();
    assert!(err.to_string().contains("unknown vcov type"));

    let err = decode(r#"vcov = { CRV2 = "firm" }"#).unwrap_err();
    assert!(err.to_string().contains("unknown cluster vcov key"));

    let err = decode(r#"vcov = { CRV1 = "a", CRV3 = "b" }"#).unwrap_err();
    assert!(err.to_string().contains("exactly one entry"));

    let err = decode(r#"vcov = [{ CRV1 = "a" }, { CRV1 = "b" }]"#).unwrap_err();
    assert!(err.to_string().contains("one cluster entry"));

    assert!(decode("vcov = 3").is_err());
}
