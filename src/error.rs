//! Error taxonomy for the import → convert → publish pipeline.
//!
//! Every failure the pipeline can surface has its own variant so call sites
//! (and tests) can branch on the kind instead of parsing messages. All
//! validation errors are fatal and carry the name of the offending account.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("account data is empty")]
    EmptyData,

    #[error("duplicated id {id} found (account {name})")]
    DuplicateId { name: String, id: String },

    #[error("account {name} is defined in more than one file: {}", .files.join(", "))]
    DuplicateAccountName { name: String, files: Vec<String> },

    #[error("account {name} has no email")]
    MissingEmail { name: String },

    #[error("account {name} has no @ in its email")]
    InvalidEmail { name: String },

    #[error("account {name} has no account id")]
    MissingId { name: String },

    #[error("account {name} has no owner")]
    MissingOwner { name: String },

    #[error("account {name} has a non-string owner")]
    InvalidOwnerType { name: String },

    #[error("account {name} has an empty owner")]
    EmptyOwner { name: String },

    #[error("account {name} has an automated section that is not a mapping")]
    InvalidAutomatedType { name: String },

    #[error("account {name} has a non-string key in its automated section")]
    InvalidAutomatedKey { name: String },

    #[error("account {name} automated flag {key} must be a boolean")]
    InvalidAutomatedValue { name: String, key: String },

    #[error("failed to serialize account data: {0}")]
    Serialization(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Remote(#[from] StoreError),
}
