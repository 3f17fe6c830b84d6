//! Collaborator traits implemented by database drivers.

mod capability;
pub use capability::{Capability, Dialect};

use crate::{
    stmt::{Row, Value},
    Result,
};

use std::fmt::Debug;

/// A blocking database connection.
pub trait Connection: Debug + 'static {
    /// Describes the SQL flavor and features of the database.
    fn capability(&self) -> &Capability;

    /// Prepare a parameterized statement.
    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement>>;

    /// Prepare and run a statement without parameters.
    fn query(&self, sql: &str) -> Result<Box<dyn Statement>> {
        let mut statement = self.prepare(sql)?;
        statement.execute(&[])?;
        Ok(statement)
    }

    /// Key generated by the most recent insert on this connection.
    fn last_insert_id(&self) -> Result<Value>;

    fn begin_transaction(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;
}

/// A prepared statement. Executing it again discards unread rows.
pub trait Statement {
    /// Run the statement with the given positional parameters.
    fn execute(&mut self, params: &[Value]) -> Result<()>;

    /// Next row produced by the last execution, if any.
    fn fetch_row(&mut self) -> Result<Option<Row>>;
}
