use crate::{hydrator::Hydrator, Entity, Shared};

use rowmap_core::{schema::Relation, stmt::Id, Error, Result};
use tracing::debug;

use std::{cell::OnceCell, fmt};

/// A related entity loaded on first access.
///
/// Instances are shared through the hydrator's lazy cache, so every
/// dereference of the same target during a session sees one resolution.
pub struct LazyItem<T> {
    hydrator: Hydrator,
    relation: Relation,
    id: Id,
    resolved: OnceCell<Shared<T>>,
}

impl<T> LazyItem<T> {
    /// The foreign id.
    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

impl<T: Entity> LazyItem<T> {
    pub(crate) fn new(hydrator: Hydrator, relation: Relation, id: Id) -> LazyItem<T> {
        LazyItem {
            hydrator,
            relation,
            id,
            resolved: OnceCell::new(),
        }
    }

    /// Load the entity. The result is memoized.
    pub fn resolve(&self) -> Result<Shared<T>> {
        if let Some(entity) = self.resolved.get() {
            return Ok(entity.clone());
        }

        debug!(
            target_entity = %self.relation.target,
            column = %self.relation.their_column,
            id = %self.id,
            "resolving lazy item"
        );

        let entity = self
            .hydrator
            .select::<T>(
                &self.relation.their_column,
                &[self.id.to_value()],
                false,
                true,
            )?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::not_found(format!(
                    "{} where {} = {}",
                    self.relation.target, self.relation.their_column, self.id
                ))
            })?;

        Ok(self.resolved.get_or_init(|| entity).clone())
    }
}

impl<T> fmt::Debug for LazyItem<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("LazyItem")
            .field("target", &self.relation.target)
            .field("id", &self.id)
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}
