//! The ambiguity log: one entry per distinct ambiguous name per run.
//!
//! The log is an ordinary value returned by the qualifier, not shared global
//! state. Entries keep first-seen order so repeated runs over the same model
//! produce identical logs.

use std::collections::HashSet;

use serde::Serialize;

/// A name that matched several equally-ranked declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ambiguity {
    /// The name as written at the first ambiguous reference
    pub name: String,
    /// Fully-qualified names of every candidate, each listed once
    pub candidates: Vec<String>,
}

/// Append-only log of ambiguous names, keyed by original name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbiguityLog {
    entries: Vec<Ambiguity>,
    seen: HashSet<String>,
}

impl AmbiguityLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an ambiguous name.
    ///
    /// Returns `false` (and changes nothing) if the name was already logged;
    /// only the first occurrence's candidates are kept.
    pub fn record(&mut self, name: &str, candidates: Vec<String>) -> bool {
        if !self.seen.insert(name.to_string()) {
            return false;
        }
        self.entries.push(Ambiguity {
            name: name.to_string(),
            candidates,
        });
        true
    }

    /// Append the entries of `other` that are not already present.
    ///
    /// Returns the entries that were newly added, in order.
    pub fn merge(&mut self, other: AmbiguityLog) -> Vec<&Ambiguity> {
        let start = self.entries.len();
        for entry in other.entries {
            self.record(&entry.name, entry.candidates);
        }
        self.entries[start..].iter().collect()
    }

    /// Look up the entry for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Ambiguity> {
        if !self.seen.contains(name) {
            return None;
        }
        self.entries.iter().find(|e| e.name == name)
    }

    /// Whether `name` has been logged as ambiguous.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Entries in first-seen order.
    #[must_use]
    pub fn entries(&self) -> &[Ambiguity] {
        &self.entries
    }

    /// Number of distinct ambiguous names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no ambiguity was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn records_each_name_once() {
        let mut log = AmbiguityLog::new();

        assert!(log.record("MyService", names(&["A.MyService", "B.MyService"])));
        assert!(!log.record("MyService", names(&["C.MyService", "D.MyService"])));

        assert_eq!(log.len(), 1);
        assert_eq!(
            log.get("MyService").unwrap().candidates,
            names(&["A.MyService", "B.MyService"])
        );
    }

    #[test]
    fn merge_keeps_first_seen_order_and_reports_new_entries() {
        let mut first = AmbiguityLog::new();
        first.record("Alpha", names(&["X.Alpha", "Y.Alpha"]));

        let mut second = AmbiguityLog::new();
        second.record("Alpha", names(&["Z.Alpha", "W.Alpha"]));
        second.record("Beta", names(&["X.Beta", "Y.Beta"]));

        let added: Vec<String> = first.merge(second).iter().map(|e| e.name.clone()).collect();

        assert_eq!(added, names(&["Beta"]));
        let order: Vec<&str> = first.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "Beta"]);
        assert_eq!(first.get("Alpha").unwrap().candidates, names(&["X.Alpha", "Y.Alpha"]));
    }

    #[test]
    fn unknown_names_are_absent() {
        let log = AmbiguityLog::new();
        assert!(log.is_empty());
        assert!(log.get("Anything").is_none());
        assert!(!log.contains("Anything"));
    }
}
