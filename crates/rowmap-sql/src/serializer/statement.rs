use super::{Comma, Formatter, Ident, ToSql};

use crate::stmt::{Delete, Insert, Select, Statement, Update};

impl ToSql for &Statement {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Select(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &Select {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = Ident(&self.table);
        let column = Ident(&self.column);
        let params = f.placeholders(self.count);
        let lock = if self.for_update && f.serializer.select_for_update {
            Some(" FOR UPDATE")
        } else {
            None
        };

        fmt!(f, "SELECT * FROM " table " WHERE " column " IN (" params ")" lock);
    }
}

impl ToSql for &Insert {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = Ident(&self.table);

        if self.columns.is_empty() {
            if f.serializer.is_mysql() {
                fmt!(f, "INSERT INTO " table " () VALUES ()");
            } else {
                fmt!(f, "INSERT INTO " table " DEFAULT VALUES");
            }
        } else {
            let columns = Comma(self.columns.iter().map(Ident));
            let params = f.placeholders(self.columns.len());

            fmt!(f, "INSERT INTO " table " (" columns ") VALUES (" params ")");
        }

        if let Some(returning) = &self.returning {
            fmt!(f, " RETURNING " Ident(returning));
        }
    }
}

impl ToSql for &Update {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = Ident(&self.table);

        fmt!(f, "UPDATE " table " SET ");

        let mut s = "";
        for column in &self.columns {
            let param = f.placeholder();
            fmt!(f, s Ident(column) " = " param);
            s = ", ";
        }

        let param = f.placeholder();
        fmt!(f, " WHERE " Ident(&self.id_column) " = " param);
    }
}

impl ToSql for &Delete {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = Ident(&self.table);
        let column = Ident(&self.id_column);
        let params = f.placeholders(self.count);

        fmt!(f, "DELETE FROM " table " WHERE " column " IN (" params ")");
    }
}
