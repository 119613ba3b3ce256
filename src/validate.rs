//! Consistency checks for the merged account data.
//!
//! The checks run over the raw YAML values rather than a typed struct
//! because the taxonomy distinguishes a missing field from one of the wrong
//! type; a typed deserialize would conflate the two. Validation is
//! fail-fast: the first violation found is returned, and accounts are
//! visited in name order so the first error is deterministic.

use std::collections::{BTreeMap, HashSet};

use serde_yaml::Value;

use crate::error::Error;

/// Merged account data before typed conversion: account name → raw record.
pub type RawAccounts = BTreeMap<String, Value>;

/// Validate the merged account set, returning the first violation found.
///
/// Expects `id` fields to already be normalized to strings; a numeric id is
/// reported as missing.
pub fn validate(accounts: &RawAccounts) -> Result<(), Error> {
    if accounts.is_empty() {
        return Err(Error::EmptyData);
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for (name, data) in accounts {
        let id = field_str(data, "id");

        if let Some(id) = id {
            if !seen_ids.insert(id) {
                return Err(Error::DuplicateId {
                    name: name.clone(),
                    id: id.to_string(),
                });
            }
        }

        match field_str(data, "email") {
            None | Some("") => return Err(Error::MissingEmail { name: name.clone() }),
            Some(email) if !email.contains('@') => {
                return Err(Error::InvalidEmail { name: name.clone() })
            }
            Some(_) => {}
        }

        if matches!(id, None | Some("")) {
            return Err(Error::MissingId { name: name.clone() });
        }

        match data.get("owner") {
            None => return Err(Error::MissingOwner { name: name.clone() }),
            Some(Value::String(owner)) if owner.is_empty() => {
                return Err(Error::EmptyOwner { name: name.clone() })
            }
            Some(Value::String(_)) => {}
            Some(_) => return Err(Error::InvalidOwnerType { name: name.clone() }),
        }

        if let Some(automated) = data.get("automated") {
            validate_automated(name, automated)?;
        }
    }

    Ok(())
}

/// The `automated` sub-schema: a mapping from string keys to genuine
/// booleans. Truthy non-booleans (integers, strings) are rejected.
fn validate_automated(name: &str, automated: &Value) -> Result<(), Error> {
    let Value::Mapping(flags) = automated else {
        return Err(Error::InvalidAutomatedType {
            name: name.to_string(),
        });
    };

    for (key, value) in flags {
        let Value::String(key) = key else {
            return Err(Error::InvalidAutomatedKey {
                name: name.to_string(),
            });
        };
        if !value.is_bool() {
            return Err(Error::InvalidAutomatedValue {
                name: name.to_string(),
                key: key.clone(),
            });
        }
    }

    Ok(())
}

fn field_str<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts(yaml: &str) -> RawAccounts {
        serde_yaml::from_str(yaml).expect("test fixture must be valid YAML")
    }

    #[test]
    fn valid_accounts_pass() {
        let data = accounts(
            r#"
            acct1:
              id: "1"
              email: one@example.com
              owner: team-one
            acct2:
              id: "2"
              email: two@example.com
              owner: team-two
              automated:
                create_users: true
                rotate_keys: false
            "#,
        );
        assert!(validate(&data).is_ok());
    }

    #[test]
    fn empty_account_set_is_rejected() {
        let data = RawAccounts::new();
        assert!(matches!(validate(&data), Err(Error::EmptyData)));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let data = accounts(
            r#"
            acct1: {id: "42", email: a@example.com, owner: me}
            acct2: {id: "42", email: b@example.com, owner: you}
            "#,
        );
        match validate(&data) {
            Err(Error::DuplicateId { name, id }) => {
                assert_eq!(name, "acct2");
                assert_eq!(id, "42");
            }
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn missing_email_is_rejected() {
        let data = accounts(r#"{acct1: {id: "1", owner: me}}"#);
        assert!(matches!(validate(&data), Err(Error::MissingEmail { .. })));
    }

    #[test]
    fn empty_email_is_rejected() {
        let data = accounts(r#"{acct1: {id: "1", email: "", owner: me}}"#);
        assert!(matches!(validate(&data), Err(Error::MissingEmail { .. })));
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        let data = accounts(r#"{acct1: {id: "1", email: not-an-email, owner: me}}"#);
        assert!(matches!(validate(&data), Err(Error::InvalidEmail { .. })));
    }

    #[test]
    fn missing_id_is_rejected() {
        let data = accounts(r#"{acct1: {email: a@example.com, owner: me}}"#);
        assert!(matches!(validate(&data), Err(Error::MissingId { .. })));
    }

    #[test]
    fn empty_id_is_rejected() {
        let data = accounts(r#"{acct1: {id: "", email: a@example.com, owner: me}}"#);
        assert!(matches!(validate(&data), Err(Error::MissingId { .. })));
    }

    #[test]
    fn missing_owner_is_rejected() {
        let data = accounts(r#"{acct1: {id: "1", email: a@example.com}}"#);
        assert!(matches!(validate(&data), Err(Error::MissingOwner { .. })));
    }

    #[test]
    fn boolean_owner_is_rejected() {
        let data = accounts(r#"{acct1: {id: "1", email: a@example.com, owner: true}}"#);
        assert!(matches!(
            validate(&data),
            Err(Error::InvalidOwnerType { .. })
        ));
    }

    #[test]
    fn numeric_owner_is_rejected() {
        let data = accounts(r#"{acct1: {id: "1", email: a@example.com, owner: 42}}"#);
        assert!(matches!(
            validate(&data),
            Err(Error::InvalidOwnerType { .. })
        ));
    }

    #[test]
    fn empty_owner_is_rejected() {
        let data = accounts(r#"{acct1: {id: "1", email: a@example.com, owner: ""}}"#);
        assert!(matches!(validate(&data), Err(Error::EmptyOwner { .. })));
    }

    #[test]
    fn automated_must_be_a_mapping() {
        let data = accounts(
            r#"{acct1: {id: "1", email: a@example.com, owner: me, automated: [true]}}"#,
        );
        assert!(matches!(
            validate(&data),
            Err(Error::InvalidAutomatedType { .. })
        ));
    }

    #[test]
    fn automated_keys_must_be_strings() {
        let data = accounts(
            r#"{acct1: {id: "1", email: a@example.com, owner: me, automated: {1: true}}}"#,
        );
        assert!(matches!(
            validate(&data),
            Err(Error::InvalidAutomatedKey { .. })
        ));
    }

    #[test]
    fn automated_values_must_be_real_booleans() {
        let data = accounts(
            r#"{acct1: {id: "1", email: a@example.com, owner: me, automated: {flag: "true"}}}"#,
        );
        match validate(&data) {
            Err(Error::InvalidAutomatedValue { name, key }) => {
                assert_eq!(name, "acct1");
                assert_eq!(key, "flag");
            }
            other => panic!("expected InvalidAutomatedValue, got {other:?}"),
        }
    }

    #[test]
    fn empty_automated_mapping_is_fine() {
        let data = accounts(r#"{acct1: {id: "1", email: a@example.com, owner: me, automated: {}}}"#);
        assert!(validate(&data).is_ok());
    }

    #[test]
    fn duplicate_check_runs_before_field_checks() {
        // The second account shares an id and also has a broken email; the
        // id collision wins because it is detected first.
        let data = accounts(
            r#"
            acct1: {id: "7", email: a@example.com, owner: me}
            acct2: {id: "7", email: broken, owner: you}
            "#,
        );
        assert!(matches!(validate(&data), Err(Error::DuplicateId { .. })));
    }
}
