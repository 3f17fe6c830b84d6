use crate::ExecLog;

use rowmap::{
    driver::{Capability, Connection, Statement},
    Result, Row, Value,
};

use std::{cell::RefCell, fmt, rc::Rc};

/// One executed statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverOp {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A connection wrapper that logs every executed statement for testing
/// purposes. Transaction control is logged as `BEGIN`, `COMMIT` and
/// `ROLLBACK`.
pub struct LoggingConnection {
    /// The underlying connection that actually executes statements
    inner: Box<dyn Connection>,

    ops_log: Rc<RefCell<Vec<DriverOp>>>,

    /// SQL of every prepared statement
    prepared: Rc<RefCell<Vec<String>>>,
}

impl LoggingConnection {
    pub fn new(inner: impl Connection) -> Self {
        Self {
            inner: Box::new(inner),
            ops_log: Rc::default(),
            prepared: Rc::default(),
        }
    }

    /// Get a handle to the statement log. It stays valid after the
    /// connection moves into an entity manager.
    pub fn log(&self) -> ExecLog {
        ExecLog::new(self.ops_log.clone(), self.prepared.clone())
    }

    fn record(&self, sql: &str, params: &[Value]) {
        self.ops_log.borrow_mut().push(DriverOp {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

impl Connection for LoggingConnection {
    fn capability(&self) -> &Capability {
        self.inner.capability()
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn Statement>> {
        self.prepared.borrow_mut().push(sql.to_string());

        Ok(Box::new(LoggingStatement {
            inner: self.inner.prepare(sql)?,
            sql: sql.to_string(),
            ops_log: self.ops_log.clone(),
        }))
    }

    fn last_insert_id(&self) -> Result<Value> {
        self.inner.last_insert_id()
    }

    fn begin_transaction(&self) -> Result<()> {
        self.record("BEGIN", &[]);
        self.inner.begin_transaction()
    }

    fn commit(&self) -> Result<()> {
        self.record("COMMIT", &[]);
        self.inner.commit()
    }

    fn rollback(&self) -> Result<()> {
        self.record("ROLLBACK", &[]);
        self.inner.rollback()
    }
}

impl fmt::Debug for LoggingConnection {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("LoggingConnection")
            .field("inner", &self.inner)
            .field("ops", &self.ops_log.borrow().len())
            .finish()
    }
}

struct LoggingStatement {
    inner: Box<dyn Statement>,
    sql: String,
    ops_log: Rc<RefCell<Vec<DriverOp>>>,
}

impl Statement for LoggingStatement {
    fn execute(&mut self, params: &[Value]) -> Result<()> {
        self.ops_log.borrow_mut().push(DriverOp {
            sql: self.sql.clone(),
            params: params.to_vec(),
        });

        self.inner.execute(params)
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        self.inner.fetch_row()
    }
}
