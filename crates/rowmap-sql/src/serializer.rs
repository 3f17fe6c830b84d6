#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::Comma;

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
use params::Placeholder;

mod statement;

use crate::stmt::Statement;

use rowmap_core::driver::{Capability, Dialect};

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects.
    flavor: Flavor,

    /// When false, `FOR UPDATE` hints are dropped.
    select_for_update: bool,
}

struct Formatter<'a> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Placeholders written so far
    params: usize,
}

impl Serializer {
    /// Serializer matching a connection's capability.
    pub fn new(capability: &Capability) -> Serializer {
        let flavor = match capability.dialect {
            Dialect::Sqlite => Flavor::Sqlite,
            Dialect::Postgresql => Flavor::Postgresql,
            Dialect::Mysql => Flavor::Mysql,
        };

        Serializer {
            flavor,
            select_for_update: capability.select_for_update,
        }
    }

    pub fn serialize(&self, stmt: &Statement) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params: 0,
        };

        stmt.to_sql(&mut fmt);

        ret
    }
}

impl Formatter<'_> {
    fn placeholder(&mut self) -> Placeholder {
        self.params += 1;
        Placeholder(self.params)
    }

    /// `n` placeholders, comma separated.
    fn placeholders(&mut self, n: usize) -> Comma<Vec<Placeholder>> {
        Comma((0..n).map(|_| self.placeholder()).collect())
    }
}
