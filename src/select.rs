// Interactive fuzzy selection over secret names

use inquire::{InquireError, Select};

use crate::error::Error;

/// Outcome of an interactive pick. Cancelling is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(String),
    Cancelled,
}

pub trait Selector {
    /// Let the user pick one of `names`. Callers must not pass an empty list.
    fn select(&self, names: Vec<String>) -> Result<Selection, Error>;
}

/// Score `candidate` against the typed filter, or `None` to hide it.
///
/// Case-insensitive. Substring hits rank above scattered (subsequence)
/// hits; earlier and tighter matches rank higher within each group.
pub fn match_score(filter: &str, candidate: &str) -> Option<i64> {
    if filter.is_empty() {
        return Some(0);
    }

    let filter = filter.to_lowercase();
    let candidate = candidate.to_lowercase();

    if let Some(pos) = candidate.find(&filter) {
        return Some(1_000_000 - pos as i64);
    }

    let mut chars = candidate.char_indices();
    let mut first = None;
    let mut last = 0;
    for wanted in filter.chars() {
        let (idx, _) = chars.by_ref().find(|(_, c)| *c == wanted)?;
        first.get_or_insert(idx);
        last = idx;
    }
    let span = last - first.unwrap_or(last);
    Some(-(span as i64))
}

pub struct PromptSelector {
    page_size: usize,
}

impl PromptSelector {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }
}

impl Default for PromptSelector {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Selector for PromptSelector {
    fn select(&self, names: Vec<String>) -> Result<Selection, Error> {
        let scorer = |input: &str, _option: &String, value: &str, _idx: usize| match_score(input, value);

        let result = Select::new("Secret:", names)
            .with_page_size(self.page_size)
            .with_help_message("Type to filter, Enter to select, Esc or Ctrl+C to cancel")
            .with_scorer(&scorer)
            .prompt();

        match result {
            Ok(name) => Ok(Selection::Chosen(name)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Ok(Selection::Cancelled)
            }
            Err(e) => Err(Error::Prompt(e.to_string())),
        }
    }
}
