//! Process-wide atom interner.
//!
//! Mirrors the teacher's `schema::catalog` registration pattern: a
//! read-mostly table guarded so lookups on an already-interned string never
//! block each other. An `Atom` is a reference-counted `str`; cloning it is a
//! pointer bump, and two atoms built from equal strings always share the same
//! backing allocation.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::error::NodeError;

pub type Atom = Arc<str>;

pub struct AtomTable {
    inner: RwLock<HashMap<Box<str>, Atom>>,
}

impl AtomTable {
    fn new() -> Self {
        AtomTable {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Interns `raw`, trimming surrounding whitespace. Empty atoms are rejected.
    pub fn intern(&self, raw: &str) -> Result<Atom, NodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NodeError::InvalidAtom(raw.to_string()));
        }
        if let Some(found) = self.inner.read().get(trimmed) {
            return Ok(found.clone());
        }
        let mut guard = self.inner.write();
        if let Some(found) = guard.get(trimmed) {
            return Ok(found.clone());
        }
        let atom: Atom = Arc::from(trimmed);
        guard.insert(Box::from(trimmed), atom.clone());
        tracing::debug!(atom = %atom, "interned new atom");
        Ok(atom)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static TABLE: OnceLock<AtomTable> = OnceLock::new();

/// Returns the process-wide atom table, initializing it on first use.
pub fn table() -> &'static AtomTable {
    TABLE.get_or_init(AtomTable::new)
}

/// Convenience wrapper around `table().intern`.
pub fn intern(raw: &str) -> Result<Atom, NodeError> {
    table().intern(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedupes_equal_strings() {
        let a = intern("hello").unwrap();
        let b = intern("  hello  ").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn empty_atom_rejected() {
        assert!(intern("   ").is_err());
    }
}
