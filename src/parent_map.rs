//! C3: Parent Map — `child -> parent`, first-writer-wins, used to walk a
//! path back from the destination once a job terminates with `PageFound`.

use dashmap::DashMap;

use crate::error::JobError;
use crate::types::Title;

#[derive(Default)]
pub struct ParentMap {
    parents: DashMap<Title, Title>,
}

impl ParentMap {
    pub fn new() -> Self {
        Self { parents: DashMap::new() }
    }

    /// Records `parent` as the parent of `child` iff `child` has none yet.
    /// Returns `true` if this call recorded the parent, `false` if `child`
    /// already had one (first writer wins).
    pub fn try_set_parent(&self, child: &Title, parent: &Title) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.parents.entry(child.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(parent.clone());
                true
            }
        }
    }

    /// Walks the chain `to -> parent(to) -> ... -> from`, returning it
    /// reversed as `[from, ..., to]`. Fails with `NoPath` if any ancestor
    /// is missing before `from` is reached.
    pub fn walk(&self, from: &Title, to: &Title) -> Result<Vec<Title>, JobError> {
        if from == to {
            return Ok(vec![from.clone()]);
        }

        let mut chain = vec![to.clone()];
        let mut current = to.clone();
        loop {
            if current == *from {
                break;
            }
            match self.parents.get(&current) {
                Some(parent) => {
                    let parent = parent.clone();
                    chain.push(parent.clone());
                    current = parent;
                }
                None => return Err(JobError::NoPath),
            }
        }

        chain.reverse();
        Ok(chain)
    }
}
