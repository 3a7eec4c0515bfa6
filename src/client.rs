// Secret operations on top of a parameter store

use crate::error::Error;
use crate::secret::{Secret, SecretMetadata};
use crate::store::{ParameterStore, PutRequest, Tags};

/// Parse `key=value` tag arguments. Each must contain exactly one `=` and a
/// non-empty key. Later duplicates win.
pub fn parse_tags<I, T>(specs: I) -> Result<Tags, Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut tags = Tags::new();
    for spec in specs {
        let spec = spec.as_ref();
        match spec.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.contains('=') => {
                tags.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "invalid tag format: {spec} (expected key=value)"
                )))
            }
        }
    }
    Ok(tags)
}

pub struct SecretClient<S> {
    store: S,
}

impl<S: ParameterStore> SecretClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write a secret and return the version the store assigned.
    ///
    /// The store rejects a put that both overwrites and tags, so a tagged
    /// write is two calls: the value first (a plain create, retried with
    /// overwrite if the path exists and `overwrite` is set), then the tags.
    /// The two steps are not atomic. If the tag call fails the new value is
    /// already stored and stays untagged; the error is returned as is.
    pub fn write(
        &self,
        path: &str,
        value: &str,
        tags: &Tags,
        overwrite: bool,
        kms_key: &str,
    ) -> Result<u64, Error> {
        if value.is_empty() {
            return Err(Error::InvalidInput("value cannot be empty".to_string()));
        }

        let mut request = PutRequest {
            name: path,
            value,
            key_id: Some(kms_key).filter(|k| !k.is_empty()),
            overwrite,
        };

        if tags.is_empty() {
            tracing::debug!(path, overwrite, "writing secret");
            return self.store.put_parameter(&request);
        }

        request.overwrite = false;
        tracing::debug!(path, "creating secret before tagging");
        let version = match self.store.put_parameter(&request) {
            Ok(version) => version,
            Err(err) if overwrite && err.is_already_exists() => {
                tracing::debug!(path, "secret exists, overwriting without tags");
                request.overwrite = true;
                self.store.put_parameter(&request)?
            }
            Err(err) => return Err(err),
        };

        self.set_tags(path, tags)?;
        Ok(version)
    }

    /// Add or replace the given tag keys. Other keys keep their values.
    pub fn set_tags(&self, path: &str, tags: &Tags) -> Result<(), Error> {
        tracing::debug!(path, count = tags.len(), "setting tags");
        self.store.add_tags(path, tags)
    }

    /// Fetch and decrypt a secret. Tags are fetched separately and are
    /// best effort: if that call fails the secret comes back untagged.
    pub fn read(&self, path: &str) -> Result<Secret, Error> {
        tracing::debug!(path, "reading secret");
        let parameter = self.store.get_parameter(path, true)?;

        let tags = match self.store.list_tags(path) {
            Ok(tags) => tags,
            Err(err) => {
                tracing::warn!(path, error = %err, "could not fetch tags, continuing without");
                Tags::new()
            }
        };

        Ok(Secret {
            name: path.to_string(),
            value: parameter.value,
            kind: parameter.kind,
            version: parameter.version,
            tags,
        })
    }

    /// List everything under `path`, walking every page in order. A failed
    /// page fails the whole listing.
    pub fn list(&self, path: &str, recursive: bool) -> Result<Vec<SecretMetadata>, Error> {
        let mut secrets = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.store.get_parameters_by_path(
                path,
                recursive,
                false,
                next_token.as_deref(),
            )?;
            pages += 1;
            tracing::debug!(path, page = pages, items = page.parameters.len(), "fetched page");

            secrets.extend(page.parameters.into_iter().map(|p| SecretMetadata {
                name: p.name,
                kind: p.kind,
                version: p.version,
                last_modified: p.last_modified,
                description: p.description,
                tier: p.tier,
            }));

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(path, pages, total = secrets.len(), "listing complete");
        Ok(secrets)
    }

    pub fn delete(&self, path: &str) -> Result<(), Error> {
        tracing::debug!(path, "deleting secret");
        self.store.delete_parameter(path)
    }

    /// Existence probe. Never decrypts.
    pub fn exists(&self, path: &str) -> Result<bool, Error> {
        match self.store.get_parameter(path, false) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
