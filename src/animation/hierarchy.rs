//! Timeline transform hierarchy
//!
//! Timelines reference their parent by index into the same flat table. World
//! transforms are resolved on demand and memoized per evaluation pass with a
//! `world_updated` flag, so the result does not depend on the order in which
//! timelines are resolved.

use crate::math::Transform2D;

/// Cached transform state of one timeline
#[derive(Clone, Debug, Default)]
pub struct TransformInfo {
    /// Parent timeline index copied from the definition, `None` for roots
    pub parent: Option<usize>,
    pub local: Transform2D,
    pub world: Transform2D,
    /// True once `world` reflects the current `local` values of the chain
    pub world_updated: bool,
}

impl TransformInfo {
    /// Create an entry for a timeline with the given parent
    pub fn new(parent: Option<usize>) -> Self {
        Self {
            parent,
            ..Default::default()
        }
    }

    /// Store a freshly sampled local transform and invalidate the world cache
    pub fn set_local(&mut self, local: Transform2D) {
        self.local = local;
        self.world_updated = false;
    }
}

/// Flat table of timeline transforms indexed like the animation's timelines
#[derive(Clone, Debug, Default)]
pub struct TransformHierarchy {
    infos: Vec<TransformInfo>,
    // Reused between resolves
    stack: Vec<usize>,
}

impl TransformHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hierarchy from per-timeline parent indices
    pub fn from_parents(parents: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            infos: parents.into_iter().map(TransformInfo::new).collect(),
            stack: Vec::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.infos.clear();
    }

    /// Get an entry by timeline index
    pub fn get(&self, index: usize) -> Option<&TransformInfo> {
        self.infos.get(index)
    }

    /// Store the sampled local transform of a timeline
    pub fn set_local(&mut self, index: usize, local: Transform2D) {
        if let Some(info) = self.infos.get_mut(index) {
            info.set_local(local);
        }
    }

    /// Mark every world transform stale
    pub fn invalidate(&mut self) {
        for info in &mut self.infos {
            info.world_updated = false;
        }
    }

    /// Resolve the world transform of `index`, resolving stale ancestors first.
    ///
    /// The ancestor walk is bounded by the table length; a chain that runs
    /// longer (only possible with an unvalidated cyclic definition) is cut
    /// and its topmost entry treated as a root.
    pub fn resolve(&mut self, index: usize) -> Transform2D {
        let Some(info) = self.infos.get(index) else {
            return Transform2D::IDENTITY;
        };
        if info.world_updated {
            return info.world;
        }

        // Collect the stale part of the chain, child first
        self.stack.clear();
        let mut current = Some(index);
        while let Some(idx) = current {
            let info = &self.infos[idx];
            if info.world_updated || self.stack.len() > self.infos.len() {
                break;
            }
            self.stack.push(idx);
            current = info.parent;
        }

        // Apply root to leaf
        while let Some(idx) = self.stack.pop() {
            let world = match self.infos[idx].parent {
                Some(parent) if self.infos[parent].world_updated => {
                    self.infos[parent].world * self.infos[idx].local
                }
                _ => self.infos[idx].local,
            };
            let info = &mut self.infos[idx];
            info.world = world;
            info.world_updated = true;
        }

        self.infos[index].world
    }

    /// Resolve every entry
    pub fn resolve_all(&mut self) {
        for index in 0..self.infos.len() {
            self.resolve(index);
        }
    }
}
