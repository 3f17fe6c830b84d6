use super::Serializer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl Serializer {
    pub(super) fn is_mysql(&self) -> bool {
        self.flavor == Flavor::Mysql
    }

    /// Quote character for identifiers.
    pub(super) fn quote(&self) -> char {
        match self.flavor {
            Flavor::Mysql => '`',
            Flavor::Postgresql | Flavor::Sqlite => '"',
        }
    }
}
