//! Directory import: read, merge and validate the account source files.
//!
//! Every YAML file in the import directory contributes a mapping from
//! account name to account record. Files are read in lexicographic order and
//! merged recursively (later files win on scalar collisions). A per-file
//! index of top-level names is kept from the pre-merge data so that the same
//! account name defined in two files is rejected, something the merged
//! result alone cannot reveal.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::error::Error;
use crate::validate::{validate, RawAccounts};

/// One validated account record.
///
/// Fields are declared alphabetically so serialized key order matches the
/// published artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automated: Option<BTreeMap<String, bool>>,
    pub email: String,
    pub id: String,
    pub owner: String,
}

/// The full validated mapping from account name to account.
pub type AccountSet = BTreeMap<String, Account>;

/// Read every YAML file in `path`, merge and validate the result.
///
/// Fails with [`Error::DuplicateAccountName`] when two files define the same
/// top-level account name, and propagates validator errors unchanged.
pub fn load_directory(path: impl AsRef<Path>) -> Result<AccountSet, Error> {
    let dir = path.as_ref();
    info!(directory = %dir.display(), "importing account data");

    let sources = read_sources(dir)?;
    let (mut merged, origins) = merge_sources(sources);
    check_duplicate_names(&origins)?;
    normalize_ids(&mut merged);
    validate(&merged)?;

    let accounts = to_account_set(merged)?;
    info!(accounts = accounts.len(), "account data imported and validated");
    Ok(accounts)
}

/// Read and parse each YAML file, in lexicographic file order.
fn read_sources(dir: &Path) -> Result<Vec<(String, RawAccounts)>, Error> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if path.is_file() && is_yaml {
            files.push(path);
        }
    }
    files.sort();

    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let text = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let accounts: RawAccounts = serde_yaml::from_str(&text).map_err(|source| Error::Parse {
            path: path.clone(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!(file = %file_name, accounts = accounts.len(), "parsed source file");
        sources.push((file_name, accounts));
    }

    Ok(sources)
}

/// Merge the per-file mappings into one, recording which file(s) each
/// top-level account name came from.
fn merge_sources(
    sources: Vec<(String, RawAccounts)>,
) -> (RawAccounts, BTreeMap<String, Vec<String>>) {
    let mut merged = RawAccounts::new();
    let mut origins: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (file, accounts) in sources {
        for (name, value) in accounts {
            origins.entry(name.clone()).or_default().push(file.clone());
            match merged.get_mut(&name) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    merged.insert(name, value);
                }
            }
        }
    }

    (merged, origins)
}

/// Recursive last-write-wins merge: colliding mappings merge key by key,
/// anything else is overwritten by the later value.
fn deep_merge(base: &mut Value, other: Value) {
    match (base, other) {
        (Value::Mapping(base), Value::Mapping(other)) => {
            for (key, value) in other {
                match base.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, other) => *slot = other,
    }
}

fn check_duplicate_names(origins: &BTreeMap<String, Vec<String>>) -> Result<(), Error> {
    for (name, files) in origins {
        if files.len() > 1 {
            return Err(Error::DuplicateAccountName {
                name: name.clone(),
                files: files.clone(),
            });
        }
    }
    Ok(())
}

/// Canonicalize the `id` field to its string form (`42` → `"42"`). Runs
/// before validation so differently-typed duplicates still collide.
fn normalize_ids(accounts: &mut RawAccounts) {
    for data in accounts.values_mut() {
        if let Value::Mapping(record) = data {
            if let Some(id) = record.get_mut("id") {
                if let Value::Number(number) = id {
                    *id = Value::String(number.to_string());
                }
            }
        }
    }
}

fn to_account_set(raw: RawAccounts) -> Result<AccountSet, Error> {
    raw.into_iter()
        .map(|(name, value)| {
            let account: Account =
                serde_yaml::from_value(value).map_err(|e| Error::Serialization(Box::new(e)))?;
            Ok((name, account))
        })
        .collect()
}
