// Remote parameter store - trait + implementations
//
// The trait mirrors the store's own calls one-to-one so that multi-step
// operations built on top of it (tagged writes, paginated listings) stay
// observable step by step.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::Error;

#[cfg(test)]
pub mod memory;
pub mod ssm;

pub use ssm::SsmStore;

pub type Tags = BTreeMap<String, String>;

/// A single write. The store refuses tags together with `overwrite`, so a
/// put never carries tags; they are attached with [`ParameterStore::add_tags`].
#[derive(Debug, Clone)]
pub struct PutRequest<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// Encryption key id or alias. `None` means the store's managed key.
    pub key_id: Option<&'a str>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Plaintext when fetched with decryption, ciphertext otherwise.
    pub value: String,
    pub kind: String,
    pub version: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterPage {
    pub parameters: Vec<Parameter>,
    pub next_token: Option<String>,
}

/// One remote round trip per method.
///
/// Implementations map the store's "parameter not found" and "parameter
/// already exists" faults to [`Error::NotFound`] and [`Error::AlreadyExists`];
/// everything else becomes [`Error::Store`].
pub trait ParameterStore {
    /// Returns the version assigned to the new value.
    fn put_parameter(&self, request: &PutRequest<'_>) -> Result<u64, Error>;

    fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<Parameter, Error>;

    /// Fetch one page of the listing under `path`. Pass the previous page's
    /// `next_token` to continue; `None` starts from the beginning.
    fn get_parameters_by_path(
        &self,
        path: &str,
        recursive: bool,
        with_decryption: bool,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, Error>;

    fn delete_parameter(&self, name: &str) -> Result<(), Error>;

    /// Set tags on a parameter. Keys already present get the new value,
    /// keys not mentioned are left as they are.
    fn add_tags(&self, name: &str, tags: &Tags) -> Result<(), Error>;

    fn list_tags(&self, name: &str) -> Result<Tags, Error>;
}
