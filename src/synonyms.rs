//! Function alias tracking
//!
//! Keeps track of which function names are known and which of them are
//! synonymous with each other. Synonymity is transitive: aliasing `a` to `b`
//! and later `b` to `c` puts all three names in one set.

use std::collections::{BTreeSet, HashMap};

/// A set of mutually interchangeable function names
pub type SynonymSet = BTreeSet<String>;

/// Partition of every known function name into disjoint synonym sets.
#[derive(Debug, Default, Clone)]
pub struct SynonymMap {
    /// Maps each known name to the slot holding its synonym set
    name_to_set: HashMap<String, usize>,
    /// Synonym sets; slots emptied by a merge stay empty
    sets: Vec<SynonymSet>,
}

impl SynonymMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name not (yet) known to be synonymous with any other.
    ///
    /// No effect if the name is already known. Returns the set the name
    /// belongs to.
    pub fn add_singleton(&mut self, name: &str) -> &SynonymSet {
        let slot = self.slot_for(name);
        &self.sets[slot]
    }

    /// Record that `name` and `alias` are synonymous, merging whatever sets
    /// each of them already belonged to.
    pub fn add_alias(&mut self, name: &str, alias: &str) -> &SynonymSet {
        let name_slot = self.slot_for(name);
        let alias_slot = self.slot_for(alias);
        if name_slot == alias_slot {
            return &self.sets[name_slot];
        }

        // Fold the smaller set into the larger one so re-pointing stays cheap
        let (keep, absorb) = if self.sets[name_slot].len() >= self.sets[alias_slot].len() {
            (name_slot, alias_slot)
        } else {
            (alias_slot, name_slot)
        };

        let absorbed = std::mem::take(&mut self.sets[absorb]);
        for member in &absorbed {
            self.name_to_set.insert(member.clone(), keep);
        }
        self.sets[keep].extend(absorbed);
        &self.sets[keep]
    }

    /// The synonym set `name` belongs to, if it is known.
    pub fn synonyms_of(&self, name: &str) -> Option<&SynonymSet> {
        self.name_to_set.get(name).map(|&slot| &self.sets[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_set.contains_key(name)
    }

    /// Number of distinct names known to the map
    pub fn len(&self) -> usize {
        self.name_to_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_set.is_empty()
    }

    /// Current partition, sorted by each set's smallest member.
    pub fn synonym_sets(&self) -> Vec<&SynonymSet> {
        let mut sets: Vec<&SynonymSet> = self.sets.iter().filter(|s| !s.is_empty()).collect();
        sets.sort();
        sets
    }

    fn slot_for(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.name_to_set.get(name) {
            return slot;
        }
        let slot = self.sets.len();
        self.sets.push(BTreeSet::from([name.to_string()]));
        self.name_to_set.insert(name.to_string(), slot);
        slot
    }
}
