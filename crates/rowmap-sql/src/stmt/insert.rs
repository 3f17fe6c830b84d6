/// `INSERT INTO <table> (<columns>) VALUES (?, ...) [RETURNING <column>]`
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,

    /// Column whose generated value is returned
    pub returning: Option<String>,
}

impl Insert {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Insert {
        Insert {
            table: table.into(),
            columns,
            returning: None,
        }
    }

    pub fn returning(mut self, column: impl Into<String>) -> Insert {
        self.returning = Some(column.into());
        self
    }
}
