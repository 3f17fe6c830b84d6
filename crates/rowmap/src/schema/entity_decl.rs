use super::FieldDecl;

use rowmap_core::{
    schema::{EntityType, Field, PrimaryKey, Relation, Schema},
    Error, Result,
};

/// Declaration of an entity type.
#[derive(Debug, Clone, Default)]
pub struct EntityDecl {
    /// Entity-table declarations. Exactly one is valid.
    pub tables: Vec<String>,

    /// Field declarations, in order
    pub fields: Vec<FieldDecl>,
}

impl EntityDecl {
    pub fn new(table: impl Into<String>) -> EntityDecl {
        EntityDecl {
            tables: vec![table.into()],
            fields: vec![],
        }
    }

    /// Adds another table declaration.
    pub fn table(mut self, table: impl Into<String>) -> EntityDecl {
        self.tables.push(table.into());
        self
    }

    pub fn field(mut self, field: FieldDecl) -> EntityDecl {
        self.fields.push(field);
        self
    }

    /// Resolve the declaration into a verified schema descriptor.
    pub fn build(&self, entity: EntityType, table_name_prefix: &str) -> Result<Schema> {
        let table = match &self.tables[..] {
            [table] => format!("{table_name_prefix}{table}"),
            tables => {
                return Err(Error::configuration(format!(
                    "{entity}: expected one entity table declaration, found {}",
                    tables.len()
                )))
            }
        };

        let fields: Vec<Field> = self
            .fields
            .iter()
            .filter(|field| field.is_mapped())
            .map(convert_field)
            .collect();

        if fields.is_empty() {
            return Err(Error::configuration(format!("{entity}: no mapped fields")));
        }

        let id = fields.iter().position(Field::is_id).unwrap_or(0);

        let schema = Schema {
            entity,
            table,
            id,
            fields,
        };

        schema.verify()?;
        Ok(schema)
    }
}

fn convert_field(decl: &FieldDecl) -> Field {
    let relation = decl.relation.as_ref();
    let to_many = relation.map(|r| !r.kind.is_to_one()).unwrap_or(false);

    // One-to-many fields live on the other table
    let column = match &decl.property {
        Some(property) if !to_many => Some(
            property
                .column
                .clone()
                .unwrap_or_else(|| decl.name.clone()),
        ),
        _ => None,
    };

    let relation = relation.map(|relation| Relation {
        kind: relation.kind,
        target: relation.target,
        their_column: relation.their_column.clone(),
        our_column: relation.our_column.clone().or_else(|| {
            if relation.kind.is_to_one() {
                column.clone()
            } else {
                None
            }
        }),
    });

    // An id marker only counts on a field stored in a column
    let primary_key = match (&decl.id, &decl.property) {
        (Some(id), Some(_)) => Some(PrimaryKey {
            auto_increment: id.auto_increment,
        }),
        _ => None,
    };

    Field {
        name: decl.name.clone(),
        column,
        ty: decl
            .property
            .as_ref()
            .map(|property| property.ty.clone())
            .unwrap_or(rowmap_core::schema::FieldTy::Raw),
        nullable: decl.nullable,
        relation,
        primary_key,
    }
}
