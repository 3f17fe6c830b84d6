use super::EntityType;

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub kind: RelationKind,

    /// Entity on the other side
    pub target: EntityType,

    /// Column on the target's table matched against our value
    pub their_column: String,

    /// Column on our table holding the value to match. For `OneToMany` this
    /// is the owning id column.
    pub our_column: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    ManyToOne,
    OneToOne,
    OneToMany,
}

impl RelationKind {
    /// `ManyToOne` and `OneToOne` resolve to a single entity.
    pub fn is_to_one(self) -> bool {
        matches!(self, Self::ManyToOne | Self::OneToOne)
    }
}
