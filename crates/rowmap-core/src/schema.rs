//! Immutable runtime description of an entity type and its table.

mod field;
pub use field::{EnumTy, Field, FieldTy, PrimaryKey};

mod relation;
pub use relation::{Relation, RelationKind};

mod verify;

use std::{any::TypeId, fmt};

#[derive(Debug)]
pub struct Schema {
    /// The Rust type this schema describes
    pub entity: EntityType,

    /// Table the entity is stored in
    pub table: String,

    /// Index of the id field in `fields`
    pub id: usize,

    /// Mapped fields, in declaration order
    pub fields: Vec<Field>,
}

/// Stable identifier for an entity type.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct EntityType {
    pub id: TypeId,
    pub name: &'static str,
}

impl Schema {
    /// The id field.
    pub fn id_field(&self) -> &Field {
        &self.fields[self.id]
    }

    /// Column holding the identity of a row.
    pub fn id_column(&self) -> &str {
        self.id_field().column_name()
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.column.as_deref() == Some(column))
    }

    /// True when the database generates the id on insert.
    pub fn is_auto_increment(&self) -> bool {
        self.id_field().is_auto_increment()
    }

    /// Fields stored in a column of this entity's table.
    pub fn column_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.iter().filter(|field| field.column.is_some())
    }

    /// Fields the persister may write: every column except an auto-increment
    /// id, skipping relations that do not own a column on this side.
    pub fn writable_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.column_fields().filter(|field| {
            if field.is_auto_increment() {
                return false;
            }

            match &field.relation {
                Some(relation) => relation.kind.is_to_one() && relation.our_column.is_some(),
                None => true,
            }
        })
    }
}

impl EntityType {
    pub fn of<T: 'static>() -> EntityType {
        EntityType {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "EntityType({})", self.name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name)
    }
}

/// `my_app::model::Company` -> `Company`. Generic arguments are kept whole.
fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    match path.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
