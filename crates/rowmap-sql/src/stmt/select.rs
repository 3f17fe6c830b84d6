/// `SELECT * FROM <table> WHERE <column> IN (?, ...) [FOR UPDATE]`
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,

    /// Column matched against the parameters
    pub column: String,

    /// Number of values in the `IN` list
    pub count: usize,

    /// Request row-level locks
    pub for_update: bool,
}

impl Select {
    pub fn new(table: impl Into<String>, column: impl Into<String>, count: usize) -> Select {
        Select {
            table: table.into(),
            column: column.into(),
            count,
            for_update: false,
        }
    }

    pub fn for_update(mut self, for_update: bool) -> Select {
        self.for_update = for_update;
        self
    }
}
