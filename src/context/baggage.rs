//! Propagated key/value baggage.

use std::fmt;

/// Insertion-ordered string map carried alongside one request.
///
/// Built once per request through [`BaggageBuilder`] and then shared
/// read-only for the rest of that request's processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baggage {
    entries: Vec<(String, String)>,
}

impl Baggage {
    /// Start an empty builder. Baggage never inherits state from a previous request.
    pub fn builder() -> BaggageBuilder {
        BaggageBuilder::default()
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Baggage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

/// Builder for [`Baggage`].
#[derive(Debug, Default)]
pub struct BaggageBuilder {
    entries: Vec<(String, String)>,
}

impl BaggageBuilder {
    /// Add an entry. Re-putting a key replaces its value and keeps its position.
    pub fn put(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn build(self) -> Baggage {
        Baggage {
            entries: self.entries,
        }
    }
}
