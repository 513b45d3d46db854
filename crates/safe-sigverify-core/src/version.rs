//! Safe contract version gates.
//!
//! The EIP-712 layout a Safe reduces signatures to changed across releases.
//! An absent or unparsable version is treated as the latest release, so both
//! gates pass.

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// `chainId` joined the domain separator in 1.3.0.
const CHAIN_ID_IN_DOMAIN: &str = ">=1.3.0";
/// `dataGas` was renamed to `baseGas` in 1.0.0.
const BASE_GAS_FIELD_NAME: &str = ">=1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeVersion(String);

impl SafeVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parsed(&self) -> Option<Version> {
        Version::parse(self.0.trim()).ok()
    }

    fn satisfies(&self, requirement: &str) -> bool {
        let (Some(version), Ok(req)) = (self.parsed(), VersionReq::parse(requirement)) else {
            return true;
        };
        req.matches(&version)
    }
}

impl From<&str> for SafeVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl std::fmt::Display for SafeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn includes_chain_id_in_domain(version: Option<&SafeVersion>) -> bool {
    version.map_or(true, |v| v.satisfies(CHAIN_ID_IN_DOMAIN))
}

pub fn uses_base_gas_field_name(version: Option<&SafeVersion>) -> bool {
    version.map_or(true, |v| v.satisfies(BASE_GAS_FIELD_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_gate_follows_1_3_0() {
        assert!(!includes_chain_id_in_domain(Some(&"1.2.0".into())));
        assert!(!includes_chain_id_in_domain(Some(&"1.1.1".into())));
        assert!(includes_chain_id_in_domain(Some(&"1.3.0".into())));
        assert!(includes_chain_id_in_domain(Some(&"1.3.0+L2".into())));
        assert!(includes_chain_id_in_domain(Some(&"1.4.1".into())));
        assert!(includes_chain_id_in_domain(None));
    }

    #[test]
    fn base_gas_gate_follows_1_0_0() {
        assert!(!uses_base_gas_field_name(Some(&"0.1.0".into())));
        assert!(uses_base_gas_field_name(Some(&"1.0.0".into())));
        assert!(uses_base_gas_field_name(Some(&"1.3.0".into())));
        assert!(uses_base_gas_field_name(None));
    }

    #[test]
    fn unparsable_version_passes_both_gates() {
        let junk = SafeVersion::new("not-a-version");
        assert!(includes_chain_id_in_domain(Some(&junk)));
        assert!(uses_base_gas_field_name(Some(&junk)));
    }
}
