//! Convert the validated account set into the published artifacts.
//!
//! Exactly two artifacts are produced: a YAML form and a JSON form, both
//! deterministic (names and fields in sorted order, fixed indentation) and
//! both decodable back into the same [`AccountSet`].

use std::collections::BTreeMap;

use crate::error::Error;
use crate::import::AccountSet;

pub const YAML_ARTIFACT: &str = "accounts.yaml";
pub const JSON_ARTIFACT: &str = "accounts.json";

/// Serialize the account set into the artifact map (name → content).
pub fn convert(accounts: &AccountSet) -> Result<BTreeMap<String, String>, Error> {
    let yaml = serde_yaml::to_string(accounts).map_err(|e| Error::Serialization(Box::new(e)))?;
    let json =
        serde_json::to_string_pretty(accounts).map_err(|e| Error::Serialization(Box::new(e)))?;

    let mut artifacts = BTreeMap::new();
    artifacts.insert(YAML_ARTIFACT.to_string(), yaml);
    artifacts.insert(JSON_ARTIFACT.to_string(), json);
    Ok(artifacts)
}
