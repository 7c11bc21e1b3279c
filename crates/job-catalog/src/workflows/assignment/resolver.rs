use tracing::{debug, trace};

use crate::workflows::roster::{
    names_match, normalize_name, AttributeKind, EmployeeRecord, RosterSnapshot,
};

/// Ancestor names already resolved in the current pass, used to narrow a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionScope {
    constraints: Vec<(AttributeKind, String)>,
}

impl ResolutionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: AttributeKind, name: &str) -> Self {
        self.push(kind, name);
        self
    }

    pub fn push(&mut self, kind: AttributeKind, name: &str) {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return;
        }
        self.constraints.retain(|(existing, _)| *existing != kind);
        self.constraints.push((kind, normalized));
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    fn admits(&self, record: &EmployeeRecord) -> bool {
        self.constraints.iter().all(|(kind, name)| {
            record
                .attribute_name(*kind)
                .map(|candidate| names_match(candidate, name))
                .unwrap_or(false)
        })
    }
}

/// Case-insensitive name → id lookup over a roster snapshot.
pub struct ReferenceIdResolver<'a> {
    roster: &'a RosterSnapshot,
    substring_fallback: bool,
}

impl<'a> ReferenceIdResolver<'a> {
    pub fn new(roster: &'a RosterSnapshot) -> Self {
        Self {
            roster,
            substring_fallback: false,
        }
    }

    /// Enables "contains" matching against indexed names as a last resort.
    pub fn with_substring_fallback(mut self, enabled: bool) -> Self {
        self.substring_fallback = enabled;
        self
    }

    /// Precedence: constrained scan, unconstrained scan, index, then (opt-in) substring.
    pub fn resolve_id(
        &self,
        kind: AttributeKind,
        name: &str,
        scope: &ResolutionScope,
    ) -> Option<u64> {
        let needle = normalize_name(name);
        if needle.is_empty() {
            return None;
        }

        if !scope.is_empty() {
            if let Some(id) = self.scan(kind, &needle, Some(scope)) {
                trace!(kind = kind.label(), name, id, "resolved within scope");
                return Some(id);
            }
        }

        if let Some(id) = self.scan(kind, &needle, None) {
            trace!(kind = kind.label(), name, id, "resolved outside scope");
            return Some(id);
        }

        if let Some(id) = self.roster.index().lookup(kind, &needle) {
            trace!(kind = kind.label(), name, id, "resolved from reference index");
            return Some(id);
        }

        if self.substring_fallback {
            if let Some(id) = self.partial_match(kind, &needle) {
                debug!(kind = kind.label(), name, id, "resolved by partial name match");
                return Some(id);
            }
        }

        debug!(kind = kind.label(), name, "reference name did not resolve");
        None
    }

    fn scan(
        &self,
        kind: AttributeKind,
        needle: &str,
        scope: Option<&ResolutionScope>,
    ) -> Option<u64> {
        self.roster.records().iter().find_map(|record| {
            let id = record.attribute_id(kind)?;
            let candidate = record.attribute_name(kind)?;
            if !names_match(candidate, needle) {
                return None;
            }
            match scope {
                Some(scope) if !scope.admits(record) => None,
                _ => Some(id),
            }
        })
    }

    /// Unique id among indexed names that contain, or are contained by, the needle.
    fn partial_match(&self, kind: AttributeKind, needle: &str) -> Option<u64> {
        let mut found: Option<u64> = None;
        for (key, id) in self.roster.index().entries_of(kind) {
            if !(key.contains(needle) || needle.contains(key)) {
                continue;
            }
            match found {
                Some(existing) if existing != id => {
                    debug!(
                        kind = kind.label(),
                        needle, "partial name match is ambiguous; leaving unresolved"
                    );
                    return None;
                }
                _ => found = Some(id),
            }
        }
        found
    }
}
