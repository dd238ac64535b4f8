//! Dense indexing of task ids.
//!
//! Maps external task ids to contiguous integers so traversal state can live
//! in plain vectors instead of hash sets.

use rustc_hash::FxHashMap;

use crate::models::TaskId;

/// Dense node index (u32 for compact storage).
pub type NodeIdx = u32;

/// Bidirectional mapping between task ids and dense node indices.
#[derive(Debug, Clone)]
pub struct TaskIdInterner {
    to_idx: FxHashMap<TaskId, NodeIdx>,
    from_idx: Vec<TaskId>,
}

impl TaskIdInterner {
    /// Create a new interner with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_idx: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_idx: Vec::with_capacity(capacity),
        }
    }

    /// Intern an id, returning its index.
    /// If already interned, returns the existing index.
    pub fn intern(&mut self, id: TaskId) -> NodeIdx {
        if let Some(&idx) = self.to_idx.get(&id) {
            return idx;
        }
        let idx = self.from_idx.len() as NodeIdx;
        self.from_idx.push(id);
        self.to_idx.insert(id, idx);
        idx
    }

    #[inline]
    pub fn get(&self, id: TaskId) -> Option<NodeIdx> {
        self.to_idx.get(&id).copied()
    }

    /// Task id for an index. Panics on an index this interner never issued.
    #[inline]
    pub fn resolve(&self, idx: NodeIdx) -> TaskId {
        self.from_idx[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.from_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_idx.is_empty()
    }
}

impl Default for TaskIdInterner {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
