//! Entity declarations as written by application code, before they are
//! resolved into [`rowmap_core::Schema`] descriptors.

mod entity_decl;
pub use entity_decl::EntityDecl;

mod field_decl;
pub use field_decl::{FieldDecl, PropertyDecl};

mod relation_decl;
pub use relation_decl::RelationDecl;

pub use rowmap_core::schema::*;
