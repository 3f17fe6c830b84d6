/// `DELETE FROM <table> WHERE <id_column> IN (?, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub id_column: String,
    pub count: usize,
}

impl Delete {
    pub fn new(table: impl Into<String>, id_column: impl Into<String>, count: usize) -> Delete {
        Delete {
            table: table.into(),
            id_column: id_column.into(),
            count,
        }
    }
}
