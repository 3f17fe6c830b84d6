use super::RelationDecl;
use crate::DbEnum;

use rowmap_core::schema::{EnumTy, FieldTy};

/// Declaration of one field of an entity.
///
/// A field is part of the schema when it carries a property mapping or a
/// relation declaration.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,

    /// Column mapping
    pub property: Option<PropertyDecl>,

    pub relation: Option<RelationDecl>,

    /// Id marker
    pub id: Option<IdDecl>,

    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    /// Defaults to the field name
    pub column: Option<String>,

    pub ty: FieldTy,
}

#[derive(Debug, Clone, Copy)]
pub struct IdDecl {
    pub auto_increment: bool,
}

impl FieldDecl {
    /// An unmapped field. Use [`mapped`](Self::mapped), [`ty`](Self::ty),
    /// [`column`](Self::column) or [`relation`](Self::relation) to map it.
    pub fn new(name: impl Into<String>) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            property: None,
            relation: None,
            id: None,
            nullable: false,
        }
    }

    /// Map the field to a raw column of the same name.
    pub fn mapped(mut self) -> FieldDecl {
        self.property_mut();
        self
    }

    pub fn ty(mut self, ty: FieldTy) -> FieldDecl {
        self.property_mut().ty = ty;
        self
    }

    /// Store an enum implementing [`DbEnum`].
    pub fn enumeration<T: DbEnum>(self) -> FieldDecl {
        let name = std::any::type_name::<T>();
        let name = name.rsplit("::").next().unwrap_or(name);

        self.ty(FieldTy::Enum(EnumTy {
            name,
            variants: T::variants(),
        }))
    }

    pub fn column(mut self, column: impl Into<String>) -> FieldDecl {
        self.property_mut().column = Some(column.into());
        self
    }

    pub fn nullable(mut self) -> FieldDecl {
        self.nullable = true;
        self
    }

    /// Mark the field as the entity id. The application assigns its value.
    pub fn id(mut self) -> FieldDecl {
        self.id = Some(IdDecl {
            auto_increment: false,
        });
        self
    }

    /// Mark the field as an id generated by the database.
    pub fn auto_increment(mut self) -> FieldDecl {
        self.id = Some(IdDecl {
            auto_increment: true,
        });
        self
    }

    pub fn relation(mut self, relation: RelationDecl) -> FieldDecl {
        self.relation = Some(relation);
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.property.is_some() || self.relation.is_some()
    }

    fn property_mut(&mut self) -> &mut PropertyDecl {
        self.property.get_or_insert_with(|| PropertyDecl {
            column: None,
            ty: FieldTy::Raw,
        })
    }
}
