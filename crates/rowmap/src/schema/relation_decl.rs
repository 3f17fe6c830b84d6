use rowmap_core::schema::{EntityType, RelationKind};

#[derive(Debug, Clone)]
pub struct RelationDecl {
    pub kind: RelationKind,
    pub target: EntityType,
    pub their_column: String,
    pub our_column: Option<String>,
}

impl RelationDecl {
    pub fn many_to_one<T: 'static>(their_column: impl Into<String>) -> RelationDecl {
        RelationDecl::new::<T>(RelationKind::ManyToOne, their_column)
    }

    pub fn one_to_one<T: 'static>(their_column: impl Into<String>) -> RelationDecl {
        RelationDecl::new::<T>(RelationKind::OneToOne, their_column)
    }

    /// Requires [`our_column`](Self::our_column) naming the owning id.
    pub fn one_to_many<T: 'static>(their_column: impl Into<String>) -> RelationDecl {
        RelationDecl::new::<T>(RelationKind::OneToMany, their_column)
    }

    pub fn our_column(mut self, column: impl Into<String>) -> RelationDecl {
        self.our_column = Some(column.into());
        self
    }

    fn new<T: 'static>(kind: RelationKind, their_column: impl Into<String>) -> RelationDecl {
        RelationDecl {
            kind,
            target: EntityType::of::<T>(),
            their_column: their_column.into(),
            our_column: None,
        }
    }
}
