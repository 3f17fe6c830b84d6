use super::Relation;
use crate::stmt::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Name of the field on the entity
    pub name: String,

    /// Column storing the field. `None` for relation-only fields such as
    /// `OneToMany`, which live on the other table.
    pub column: Option<String>,

    /// How column values are converted
    pub ty: FieldTy,

    /// True if the field can be null (`None` in Rust).
    pub nullable: bool,

    /// Set when the field references another entity
    pub relation: Option<Relation>,

    /// Set on the entity's id field
    pub primary_key: Option<PrimaryKey>,
}

/// Semantic type of a column, selecting the value converter.
#[derive(Clone, PartialEq)]
pub enum FieldTy {
    /// Passed through untouched
    Raw,
    Int,
    Float,
    Bool,
    /// Date only, time truncated to midnight
    Date,
    /// Full timestamp
    DateTime,
    Enum(EnumTy),
}

/// Declared enumeration of an `enum` field.
#[derive(Clone, PartialEq)]
pub struct EnumTy {
    /// Name of the Rust enum
    pub name: &'static str,

    /// Database values of every variant
    pub variants: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryKey {
    /// The database generates the key on insert
    pub auto_increment: bool,
}

impl Field {
    /// Column name, falling back to the field name.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    pub fn is_id(&self) -> bool {
        self.primary_key.is_some()
    }

    pub fn is_auto_increment(&self) -> bool {
        self.primary_key
            .map(|pk| pk.auto_increment)
            .unwrap_or(false)
    }

    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }

    /// True for `ManyToOne` / `OneToOne` fields.
    pub fn is_to_one(&self) -> bool {
        self.relation
            .as_ref()
            .map(|relation| relation.kind.is_to_one())
            .unwrap_or(false)
    }

    /// True for `OneToMany` fields.
    pub fn is_to_many(&self) -> bool {
        self.relation
            .as_ref()
            .map(|relation| !relation.kind.is_to_one())
            .unwrap_or(false)
    }
}

impl FieldTy {
    /// `strftime` format used for date and datetime columns.
    pub fn date_format(&self) -> Option<&'static str> {
        match self {
            FieldTy::Date => Some("%Y-%m-%d"),
            FieldTy::DateTime => Some("%Y-%m-%d %H:%M:%S"),
            _ => None,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldTy::Date | FieldTy::DateTime)
    }

    pub fn as_enum(&self) -> Option<&EnumTy> {
        match self {
            FieldTy::Enum(ty) => Some(ty),
            _ => None,
        }
    }
}

impl EnumTy {
    pub fn contains(&self, value: &Value) -> bool {
        self.variants.iter().any(|variant| variant == value)
    }
}

impl fmt::Debug for FieldTy {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldTy::Raw => fmt.write_str("raw"),
            FieldTy::Int => fmt.write_str("int"),
            FieldTy::Float => fmt.write_str("float"),
            FieldTy::Bool => fmt.write_str("bool"),
            FieldTy::Date => fmt.write_str("date"),
            FieldTy::DateTime => fmt.write_str("datetime"),
            FieldTy::Enum(ty) => ty.fmt(fmt),
        }
    }
}

impl fmt::Debug for EnumTy {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "enum {}{:?}", self.name, self.variants)
    }
}
