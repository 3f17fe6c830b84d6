mod value;
pub(crate) use value::Value;

use rowmap_core::{
    driver::{self, Capability},
    stmt::{self, Row},
    Error, Result,
};
use rusqlite::Connection as RusqliteConnection;
use tracing::trace;
use url::Url;

use std::{
    collections::VecDeque,
    fmt,
    path::{Path, PathBuf},
    rc::Rc,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver)?;

        if url.scheme() != "sqlite" {
            return Err(Error::configuration(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn connect(&self) -> Result<Connection> {
        match self {
            Sqlite::File(path) => Connection::open(path),
            Sqlite::InMemory => Connection::in_memory(),
        }
    }
}

/// A blocking connection to one SQLite database.
pub struct Connection {
    connection: Rc<RusqliteConnection>,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory().map_err(Error::driver)?;
        Ok(Self::from_rusqlite(connection))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver)?;
        Ok(Self::from_rusqlite(connection))
    }

    pub fn from_rusqlite(connection: RusqliteConnection) -> Self {
        Self {
            connection: Rc::new(connection),
        }
    }

    /// Run one or more statements without parameters, e.g. DDL.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql).map_err(Error::driver)
    }
}

impl driver::Connection for Connection {
    fn capability(&self) -> &Capability {
        &Capability::SQLITE
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn driver::Statement>> {
        // Surface syntax errors now rather than on first execution
        self.connection.prepare_cached(sql).map_err(Error::driver)?;

        Ok(Box::new(Statement {
            connection: self.connection.clone(),
            sql: sql.to_string(),
            rows: VecDeque::new(),
        }))
    }

    fn last_insert_id(&self) -> Result<stmt::Value> {
        Ok(stmt::Value::I64(self.connection.last_insert_rowid()))
    }

    fn begin_transaction(&self) -> Result<()> {
        self.connection.execute_batch("BEGIN").map_err(Error::driver)
    }

    fn commit(&self) -> Result<()> {
        self.connection.execute_batch("COMMIT").map_err(Error::driver)
    }

    fn rollback(&self) -> Result<()> {
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(Error::driver)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("sqlite::Connection")
            .field("path", &self.connection.path())
            .finish()
    }
}

/// Rows produced by an execution are buffered until fetched.
struct Statement {
    connection: Rc<RusqliteConnection>,
    sql: String,
    rows: VecDeque<Row>,
}

impl driver::Statement for Statement {
    fn execute(&mut self, params: &[stmt::Value]) -> Result<()> {
        self.rows.clear();

        let mut stmt = self
            .connection
            .prepare_cached(&self.sql)
            .map_err(Error::driver)?;

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let params = params.iter().map(Value::from_core);
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(Error::driver)?;

        while let Some(row) = rows.next().map_err(Error::driver)? {
            let mut values = Row::new();

            for (index, column) in columns.iter().enumerate() {
                values.insert(column.clone(), Value::from_sql(row, index)?.into_inner());
            }

            self.rows.push_back(values);
        }

        trace!(sql = %self.sql, rows = self.rows.len(), "sqlite statement executed");
        Ok(())
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}
