use rowmap_core::{driver::Statement, stmt::Row, Result};

/// Rows fetched one at a time from an executed statement.
pub struct StatementRows {
    statement: Box<dyn Statement>,
    done: bool,
}

impl StatementRows {
    pub fn new(statement: Box<dyn Statement>) -> StatementRows {
        StatementRows {
            statement,
            done: false,
        }
    }
}

impl Iterator for StatementRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.statement.fetch_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
