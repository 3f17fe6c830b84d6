#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// SQL dialect used when rendering statements.
    pub dialect: Dialect,

    /// Inserts can return generated keys with a `RETURNING` clause. When
    /// false, keys are read with `last_insert_id`.
    pub returning: bool,

    /// Supports row-level locking with `SELECT ... FOR UPDATE`.
    pub select_for_update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        dialect: Dialect::Sqlite,
        returning: false,
        select_for_update: false,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        dialect: Dialect::Postgresql,
        returning: true,
        select_for_update: true,
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        select_for_update: true,
        ..Self::SQLITE
    };
}
