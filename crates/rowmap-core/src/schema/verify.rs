use super::{RelationKind, Schema};
use crate::{Error, Result};

use std::collections::HashSet;

struct Verify<'a> {
    schema: &'a Schema,
}

impl Schema {
    /// Checks the descriptor invariants. Called once when a schema is built.
    pub fn verify(&self) -> Result<()> {
        Verify { schema: self }.verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        self.verify_has_fields()?;
        self.verify_table_name()?;
        self.verify_single_id()?;
        self.verify_unique_names()?;
        self.verify_relations()?;
        Ok(())
    }

    fn verify_has_fields(&self) -> Result<()> {
        if self.schema.fields.is_empty() {
            return Err(self.error("no mapped fields"));
        }

        Ok(())
    }

    fn verify_table_name(&self) -> Result<()> {
        if self.schema.table.trim().is_empty() {
            return Err(self.error("table name is empty"));
        }

        Ok(())
    }

    fn verify_single_id(&self) -> Result<()> {
        let ids: Vec<_> = self
            .schema
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.is_id())
            .collect();

        match &ids[..] {
            [] => Err(self.error("no id field declared")),
            [(index, field)] => {
                if *index != self.schema.id {
                    return Err(self.error(format!(
                        "id index {} does not point at id field `{}`",
                        self.schema.id, field.name
                    )));
                }

                if field.column.is_none() {
                    return Err(self.error(format!("id field `{}` has no column", field.name)));
                }

                Ok(())
            }
            _ => Err(self.error(format!("{} id fields declared", ids.len()))),
        }
    }

    fn verify_unique_names(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut columns = HashSet::new();

        for field in &self.schema.fields {
            if !names.insert(field.name.as_str()) {
                return Err(self.error(format!("field `{}` declared twice", field.name)));
            }

            if let Some(column) = &field.column {
                if !columns.insert(column.as_str()) {
                    return Err(self.error(format!("column `{column}` mapped twice")));
                }
            }
        }

        Ok(())
    }

    fn verify_relations(&self) -> Result<()> {
        for field in &self.schema.fields {
            let Some(relation) = &field.relation else {
                continue;
            };

            if relation.their_column.is_empty() {
                return Err(self.error(format!(
                    "relation `{}` has no target column",
                    field.name
                )));
            }

            match relation.kind {
                RelationKind::ManyToOne | RelationKind::OneToOne => {
                    if field.column.is_none() {
                        return Err(self.error(format!(
                            "relation `{}` has no column holding the foreign id",
                            field.name
                        )));
                    }

                    if field.is_auto_increment() {
                        return Err(self.error(format!(
                            "relation id `{}` cannot be auto-increment",
                            field.name
                        )));
                    }
                }
                RelationKind::OneToMany => {
                    if relation.our_column.is_none() {
                        return Err(self.error(format!(
                            "one-to-many relation `{}` has no owning column",
                            field.name
                        )));
                    }

                    if field.is_id() {
                        return Err(self.error(format!(
                            "one-to-many relation `{}` cannot be the id",
                            field.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn error(&self, message: impl std::fmt::Display) -> Error {
        Error::configuration(format!("{}: {message}", self.schema.entity))
    }
}
