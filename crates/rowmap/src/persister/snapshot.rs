use indexmap::IndexMap;
use rowmap_core::stmt::{Id, Value};

/// Database-shaped view of an entity at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySnapshot {
    pub id: Option<Id>,

    /// Column name -> converted value, in schema order
    pub columns: IndexMap<String, Value>,
}

impl EntitySnapshot {
    pub fn new(id: Option<Id>) -> EntitySnapshot {
        EntitySnapshot {
            id,
            columns: IndexMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> EntitySnapshot {
        self.insert(column, value);
        self
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// A copy holding only the columns `keep` accepts.
    pub fn narrow(&self, keep: impl Fn(&str, &Value) -> bool) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id.clone(),
            columns: self
                .columns
                .iter()
                .filter(|(column, value)| keep(column, value))
                .map(|(column, value)| (column.clone(), value.clone()))
                .collect(),
        }
    }

    /// Columns that differ from `prior` or are missing from it.
    pub fn changed_since(&self, prior: &EntitySnapshot) -> EntitySnapshot {
        self.narrow(|column, value| prior.get(column) != Some(value))
    }
}
