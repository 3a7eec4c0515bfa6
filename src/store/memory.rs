// In-memory store used by the tests. Behaves like the remote store for the
// calls the client makes, counts every call, and can be told to fail.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use chrono::Utc;

use super::{Parameter, ParameterPage, ParameterStore, PutRequest, Tags};
use crate::error::Error;

#[derive(Debug, thiserror::Error)]
#[error("injected failure")]
pub struct Injected;

#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub put: usize,
    pub get: usize,
    pub get_by_path: usize,
    pub delete: usize,
    pub add_tags: usize,
    pub list_tags: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.put + self.get + self.get_by_path + self.delete + self.add_tags + self.list_tags
    }
}

struct Entry {
    parameter: Parameter,
    key_id: Option<String>,
    tags: Tags,
}

pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Entry>>,
    calls: RefCell<Calls>,
    /// Names fetched with decryption, in call order.
    decrypted: RefCell<Vec<String>>,
    page_size: usize,
    pub fail_put: Cell<bool>,
    pub fail_get: Cell<bool>,
    pub fail_add_tags: Cell<bool>,
    pub fail_list_tags: Cell<bool>,
    /// Zero-based index of the listing page that should fail.
    pub fail_page: Cell<Option<usize>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_page_size(10)
    }
}

impl MemoryStore {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Calls::default()),
            decrypted: RefCell::new(Vec::new()),
            page_size: page_size.max(1),
            fail_put: Cell::new(false),
            fail_get: Cell::new(false),
            fail_add_tags: Cell::new(false),
            fail_list_tags: Cell::new(false),
            fail_page: Cell::new(None),
        }
    }

    /// Seed a parameter without touching the call counters.
    pub fn insert(&self, name: &str, value: &str) {
        let mut entries = self.entries.borrow_mut();
        let version = entries.get(name).map_or(1, |e| e.parameter.version + 1);
        entries.insert(
            name.to_string(),
            Entry {
                parameter: Parameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    kind: "SecureString".to_string(),
                    version,
                    last_modified: Some(Utc::now()),
                    description: None,
                    tier: Some("Standard".to_string()),
                },
                key_id: None,
                tags: Tags::new(),
            },
        );
    }

    pub fn calls(&self) -> Calls {
        self.calls.borrow().clone()
    }

    pub fn value_of(&self, name: &str) -> Option<String> {
        self.entries
            .borrow()
            .get(name)
            .map(|e| e.parameter.value.clone())
    }

    pub fn tags_of(&self, name: &str) -> Option<Tags> {
        self.entries.borrow().get(name).map(|e| e.tags.clone())
    }

    pub fn key_id_of(&self, name: &str) -> Option<String> {
        self.entries.borrow().get(name).and_then(|e| e.key_id.clone())
    }

    pub fn decrypted(&self) -> Vec<String> {
        self.decrypted.borrow().clone()
    }

    fn under(path: &str, name: &str, recursive: bool) -> bool {
        let base = path.trim_end_matches('/');
        let Some(rest) = name.strip_prefix(base).and_then(|r| r.strip_prefix('/')) else {
            return false;
        };
        !rest.is_empty() && (recursive || !rest.contains('/'))
    }

    fn masked(parameter: &Parameter, with_decryption: bool) -> Parameter {
        let mut parameter = parameter.clone();
        if !with_decryption {
            parameter.value = format!("<encrypted:{}>", parameter.value.len());
        }
        parameter
    }
}

impl ParameterStore for MemoryStore {
    fn put_parameter(&self, request: &PutRequest<'_>) -> Result<u64, Error> {
        self.calls.borrow_mut().put += 1;
        if self.fail_put.get() {
            return Err(Error::store("PutParameter", Injected));
        }

        let mut entries = self.entries.borrow_mut();
        match entries.get_mut(request.name) {
            Some(_) if !request.overwrite => Err(Error::AlreadyExists(request.name.to_string())),
            Some(entry) => {
                entry.parameter.value = request.value.to_string();
                entry.parameter.version += 1;
                entry.parameter.last_modified = Some(Utc::now());
                entry.key_id = request.key_id.map(str::to_string);
                Ok(entry.parameter.version)
            }
            None => {
                entries.insert(
                    request.name.to_string(),
                    Entry {
                        parameter: Parameter {
                            name: request.name.to_string(),
                            value: request.value.to_string(),
                            kind: "SecureString".to_string(),
                            version: 1,
                            last_modified: Some(Utc::now()),
                            description: None,
                            tier: Some("Standard".to_string()),
                        },
                        key_id: request.key_id.map(str::to_string),
                        tags: Tags::new(),
                    },
                );
                Ok(1)
            }
        }
    }

    fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<Parameter, Error> {
        self.calls.borrow_mut().get += 1;
        if self.fail_get.get() {
            return Err(Error::store("GetParameter", Injected));
        }

        let entries = self.entries.borrow();
        let entry = entries
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        if with_decryption {
            self.decrypted.borrow_mut().push(name.to_string());
        }
        Ok(Self::masked(&entry.parameter, with_decryption))
    }

    fn get_parameters_by_path(
        &self,
        path: &str,
        recursive: bool,
        with_decryption: bool,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, Error> {
        let page_index = {
            let mut calls = self.calls.borrow_mut();
            calls.get_by_path += 1;
            calls.get_by_path - 1
        };
        if self.fail_page.get() == Some(page_index) {
            return Err(Error::store("GetParametersByPath", Injected));
        }

        let start: usize = match next_token {
            Some(token) => token
                .parse()
                .map_err(|_| Error::store("GetParametersByPath", Injected))?,
            None => 0,
        };

        let entries = self.entries.borrow();
        let matching: Vec<&Entry> = entries
            .values()
            .filter(|e| Self::under(path, &e.parameter.name, recursive))
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let parameters = matching[start.min(end)..end]
            .iter()
            .map(|e| Self::masked(&e.parameter, with_decryption))
            .collect();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(ParameterPage {
            parameters,
            next_token,
        })
    }

    fn delete_parameter(&self, name: &str) -> Result<(), Error> {
        self.calls.borrow_mut().delete += 1;
        self.entries
            .borrow_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn add_tags(&self, name: &str, tags: &Tags) -> Result<(), Error> {
        self.calls.borrow_mut().add_tags += 1;
        if self.fail_add_tags.get() {
            return Err(Error::store("AddTagsToResource", Injected));
        }

        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| Error::store("AddTagsToResource", Injected))?;
        for (key, value) in tags {
            entry.tags.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn list_tags(&self, name: &str) -> Result<Tags, Error> {
        self.calls.borrow_mut().list_tags += 1;
        if self.fail_list_tags.get() {
            return Err(Error::store("ListTagsForResource", Injected));
        }

        self.entries
            .borrow()
            .get(name)
            .map(|e| e.tags.clone())
            .ok_or_else(|| Error::store("ListTagsForResource", Injected))
    }
}
