use super::{Flavor, Formatter, ToSql};

/// Positional parameter, numbered from 1.
pub(super) struct Placeholder(pub(super) usize);

impl ToSql for Placeholder {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match f.serializer.flavor {
            Flavor::Mysql | Flavor::Sqlite => f.dst.push('?'),
            Flavor::Postgresql => {
                f.dst.push('$');
                f.dst.push_str(&self.0.to_string());
            }
        }
    }
}
