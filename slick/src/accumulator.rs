use std::collections::BTreeMap;

use crate::parser::FieldDelta;

/// Chat fields merged from every delta since the last reset.
///
/// The set of fields isn't known ahead of time since servers send whatever
/// keys they like (`role`, `content`, `reasoning_content`, ...). Only
/// `content` is read by callers today. A field whose fragments have all been
/// `null` is present with no value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccumulatedResult {
    fields: BTreeMap<String, Option<String>>,
}

impl AccumulatedResult {
    pub fn content(&self) -> Option<&str> {
        self.get("content")
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|value| value.as_deref())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_deref()))
    }
}

/// Running merge of chat deltas for a single generation.
#[derive(Debug, Default)]
pub struct Accumulator {
    result: AccumulatedResult,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends each fragment to its field. Unset and `null` fields take the
    /// incoming fragment as is; a `null` fragment never clears text.
    pub fn apply<I>(&mut self, deltas: I)
    where
        I: IntoIterator<Item = FieldDelta>,
    {
        for FieldDelta { field, fragment } in deltas {
            match self.result.fields.get_mut(&field) {
                Some(Some(existing)) => {
                    if let Some(fragment) = fragment {
                        existing.push_str(&fragment);
                    }
                }
                _ => {
                    self.result.fields.insert(field, fragment);
                }
            }
        }
    }

    pub fn snapshot(&self) -> AccumulatedResult {
        self.result.clone()
    }

    pub fn reset(&mut self) {
        self.result.fields.clear();
    }
}
