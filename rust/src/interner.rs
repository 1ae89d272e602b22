//! Person-id interning.
//!
//! The optimizer stores its working grid densely by person index; this maps
//! the caller's string ids onto those indices and back.

use rustc_hash::FxHashMap;

/// Dense person index into the optimizer grid.
pub type PersonIdx = usize;

/// Bidirectional map between person id strings and grid columns.
#[derive(Debug, Clone, Default)]
pub struct PersonIdInterner {
    to_idx: FxHashMap<String, PersonIdx>,
    ids: Vec<String>,
}

impl PersonIdInterner {
    /// Intern the ids in order; duplicates keep their first column.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut interner = Self::default();
        for id in ids {
            interner.intern(id);
        }
        interner
    }

    pub fn intern(&mut self, id: &str) -> PersonIdx {
        if let Some(&idx) = self.to_idx.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id.to_string());
        self.to_idx.insert(id.to_string(), idx);
        idx
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<PersonIdx> {
        self.to_idx.get(id).copied()
    }

    #[inline]
    pub fn resolve(&self, idx: PersonIdx) -> Option<&str> {
        self.ids.get(idx).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_roster_order() {
        let interner = PersonIdInterner::from_ids(["m2", "m1", "m2", "m3"]);

        assert_eq!(interner.len(), 3);
        assert_eq!(interner.get("m2"), Some(0));
        assert_eq!(interner.get("m1"), Some(1));
        assert_eq!(interner.get("m3"), Some(2));
        assert_eq!(interner.resolve(1), Some("m1"));
        assert_eq!(interner.get("ghost"), None);
        assert_eq!(interner.resolve(7), None);
    }
}
