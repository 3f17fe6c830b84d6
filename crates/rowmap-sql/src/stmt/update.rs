/// `UPDATE <table> SET <column> = ?, ... WHERE <id_column> = ?`
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub columns: Vec<String>,
    pub id_column: String,
}

impl Update {
    pub fn new(
        table: impl Into<String>,
        columns: Vec<String>,
        id_column: impl Into<String>,
    ) -> Update {
        Update {
            table: table.into(),
            columns,
            id_column: id_column.into(),
        }
    }
}
