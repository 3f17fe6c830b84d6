use super::DbEnum;
use crate::{
    hydrator::Hydrator,
    relation::{Collection, Item},
    Entity,
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rowmap_core::{
    schema::{EntityType, Relation},
    stmt::{Id, Value},
    Error, Result,
};

use std::fmt;

/// Runtime value of a mapped field, exchanged between the engine and
/// [`Entity::load_field`] / [`Entity::dump_field`].
#[derive(Clone, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),

    /// Declared variant of an `enum` field
    Enum(Value),

    /// `ManyToOne` / `OneToOne` relation
    Item(ItemValue),

    /// `OneToMany` relation
    Collection(CollectionValue),
}

/// Erased relation item.
#[derive(Clone)]
pub enum ItemValue {
    /// Produced by hydration; becomes a lazy item once the entity picks the
    /// target type.
    Pending(PendingItem),

    /// A loaded entity, by its id. `None` when the target has not been
    /// inserted yet.
    Loaded(Option<Id>),

    /// Only the foreign id is known.
    Reference(Id),
}

#[derive(Clone)]
pub struct PendingItem {
    pub(crate) hydrator: Hydrator,
    pub(crate) relation: Relation,
    pub(crate) id: Id,
}

/// Erased relation collection.
#[derive(Clone)]
pub enum CollectionValue {
    /// The owner has no id; there is nothing to load.
    Empty,
    Pending(PendingCollection),
}

#[derive(Clone)]
pub struct PendingCollection {
    pub(crate) hydrator: Hydrator,
    pub(crate) relation: Relation,
    pub(crate) owner: Id,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::I64(_) => "integer",
            FieldValue::F64(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Date(_) => "date",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Enum(_) => "enum",
            FieldValue::Item(_) => "item",
            FieldValue::Collection(_) => "collection",
        }
    }

    /// Runtime value of a raw column.
    pub fn from_value(value: Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(v) => FieldValue::Bool(v),
            Value::I64(v) => FieldValue::I64(v),
            Value::F64(v) => FieldValue::F64(v),
            Value::String(v) => FieldValue::String(v),
            Value::Bytes(v) => FieldValue::Bytes(v),
        }
    }

    pub fn into_item<T: Entity>(self) -> Result<Item<T>> {
        match self {
            FieldValue::Item(item) => item.into_item(),
            other => Err(mismatch("item", &other)),
        }
    }

    pub fn into_option_item<T: Entity>(self) -> Result<Option<Item<T>>> {
        match self {
            FieldValue::Null => Ok(None),
            other => other.into_item().map(Some),
        }
    }

    pub fn into_collection<T: Entity>(self) -> Result<Collection<T>> {
        match self {
            FieldValue::Null | FieldValue::Collection(CollectionValue::Empty) => {
                Ok(Collection::new())
            }
            FieldValue::Collection(CollectionValue::Pending(pending)) => {
                pending.check_target::<T>()?;
                Ok(Collection::lazy(pending))
            }
            other => Err(mismatch("collection", &other)),
        }
    }

    pub fn into_enum<T: DbEnum>(self) -> Result<T> {
        let value = match self {
            FieldValue::Enum(value) => value,
            other => return Err(mismatch("enum", &other)),
        };

        T::from_value(&value).ok_or_else(|| {
            Error::mapping(format!(
                "{value} is not a variant of `{}`",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn into_option_enum<T: DbEnum>(self) -> Result<Option<T>> {
        match self {
            FieldValue::Null => Ok(None),
            other => other.into_enum().map(Some),
        }
    }

    pub fn from_enum<T: DbEnum>(value: &T) -> FieldValue {
        FieldValue::Enum(value.to_value())
    }

    pub fn from_option_enum<T: DbEnum>(value: Option<&T>) -> FieldValue {
        value.map(FieldValue::from_enum).unwrap_or_default()
    }
}

impl ItemValue {
    /// Foreign id carried by the value, if known.
    pub fn id(&self) -> Option<&Id> {
        match self {
            ItemValue::Pending(pending) => Some(&pending.id),
            ItemValue::Loaded(id) => id.as_ref(),
            ItemValue::Reference(id) => Some(id),
        }
    }

    pub fn into_item<T: Entity>(self) -> Result<Item<T>> {
        match self {
            ItemValue::Pending(pending) => {
                let PendingItem {
                    hydrator,
                    relation,
                    id,
                } = pending;
                hydrator.lazy_item::<T>(&relation, id).map(Item::Lazy)
            }
            ItemValue::Loaded(Some(id)) | ItemValue::Reference(id) => Ok(Item::Unloaded(id)),
            ItemValue::Loaded(None) => Err(Error::logic("entity has no id")),
        }
    }
}

impl PendingCollection {
    pub(crate) fn check_target<T: Entity>(&self) -> Result<()> {
        check_target::<T>(&self.relation)
    }
}

/// The Rust type a relation field converts into must be the declared target.
pub(crate) fn check_target<T: Entity>(relation: &Relation) -> Result<()> {
    let found = EntityType::of::<T>();

    if relation.target != found {
        return Err(Error::mapping(format!(
            "relation targets `{}` but the field holds `{found}`",
            relation.target
        )));
    }

    Ok(())
}

fn mismatch(expected: &str, found: &FieldValue) -> Error {
    Error::mapping(format!("expected {expected}, found {}", found.kind_name()))
}

macro_rules! impl_try_from {
    ($ty:ty, $name:literal, $( $pat:pat => $e:expr ),+ $(,)?) => {
        impl TryFrom<FieldValue> for $ty {
            type Error = Error;

            fn try_from(value: FieldValue) -> Result<Self> {
                match value {
                    $( $pat => Ok($e), )+
                    other => Err(mismatch($name, &other)),
                }
            }
        }

        impl TryFrom<FieldValue> for Option<$ty> {
            type Error = Error;

            fn try_from(value: FieldValue) -> Result<Self> {
                match value {
                    FieldValue::Null => Ok(None),
                    other => <$ty>::try_from(other).map(Some),
                }
            }
        }
    };
}

impl_try_from!(bool, "bool",
    FieldValue::Bool(v) => v,
    FieldValue::I64(v) => v != 0,
);

impl_try_from!(i64, "integer",
    FieldValue::I64(v) => v,
);

impl TryFrom<FieldValue> for i32 {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        let v = i64::try_from(value)?;
        i32::try_from(v).map_err(|_| Error::mapping(format!("{v} does not fit in i32")))
    }
}

impl TryFrom<FieldValue> for Option<i32> {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(None),
            other => i32::try_from(other).map(Some),
        }
    }
}

impl_try_from!(f64, "float",
    FieldValue::F64(v) => v,
    FieldValue::I64(v) => v as f64,
);

impl_try_from!(String, "string",
    FieldValue::String(v) => v,
);

impl_try_from!(Vec<u8>, "bytes",
    FieldValue::Bytes(v) => v,
    FieldValue::String(v) => v.into_bytes(),
);

impl_try_from!(NaiveDate, "date",
    FieldValue::Date(v) => v,
    FieldValue::DateTime(v) => v.date(),
);

impl_try_from!(NaiveDateTime, "datetime",
    FieldValue::DateTime(v) => v,
    FieldValue::Date(v) => v.and_time(NaiveTime::MIN),
);

impl_try_from!(Id, "id",
    FieldValue::I64(v) => Id::Int(v),
    FieldValue::String(v) => Id::String(v),
    FieldValue::Item(ItemValue::Reference(id)) => id,
);

impl TryFrom<FieldValue> for Value {
    type Error = Error;

    fn try_from(value: FieldValue) -> Result<Self> {
        Ok(match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(v) => Value::Bool(v),
            FieldValue::I64(v) => Value::I64(v),
            FieldValue::F64(v) => Value::F64(v),
            FieldValue::String(v) => Value::String(v),
            FieldValue::Bytes(v) => Value::Bytes(v),
            FieldValue::Enum(v) => v,
            other => return Err(mismatch("scalar", &other)),
        })
    }
}

macro_rules! impl_from {
    ($( $ty:ty => $variant:ident ),+ $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value.into())
                }
            }
        )+
    };
}

impl_from! {
    bool => Bool,
    i64 => I64,
    i32 => I64,
    f64 => F64,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    ItemValue => Item,
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::from_value(value)
    }
}

impl From<Id> for FieldValue {
    fn from(value: Id) -> Self {
        match value {
            Id::Int(v) => FieldValue::I64(v),
            Id::String(v) => FieldValue::String(v),
        }
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl<T: Entity> From<&Item<T>> for FieldValue {
    fn from(value: &Item<T>) -> Self {
        FieldValue::Item(value.to_item_value())
    }
}

impl<T: Entity> From<&Option<Item<T>>> for FieldValue {
    fn from(value: &Option<Item<T>>) -> Self {
        match value {
            Some(item) => item.into(),
            None => FieldValue::Null,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => fmt.write_str("Null"),
            FieldValue::Bool(v) => fmt.debug_tuple("Bool").field(v).finish(),
            FieldValue::I64(v) => fmt.debug_tuple("I64").field(v).finish(),
            FieldValue::F64(v) => fmt.debug_tuple("F64").field(v).finish(),
            FieldValue::String(v) => fmt.debug_tuple("String").field(v).finish(),
            FieldValue::Bytes(v) => fmt.debug_tuple("Bytes").field(v).finish(),
            FieldValue::Date(v) => fmt.debug_tuple("Date").field(v).finish(),
            FieldValue::DateTime(v) => fmt.debug_tuple("DateTime").field(v).finish(),
            FieldValue::Enum(v) => fmt.debug_tuple("Enum").field(v).finish(),
            FieldValue::Item(v) => fmt.debug_tuple("Item").field(v).finish(),
            FieldValue::Collection(v) => fmt.debug_tuple("Collection").field(v).finish(),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        use FieldValue::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Enum(a), Enum(b)) => a == b,
            (Item(a), Item(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl fmt::Debug for ItemValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Pending(pending) => write!(fmt, "Pending({})", pending.id),
            ItemValue::Loaded(Some(id)) => write!(fmt, "Loaded({id})"),
            ItemValue::Loaded(None) => fmt.write_str("Loaded(<no id>)"),
            ItemValue::Reference(id) => write!(fmt, "Reference({id})"),
        }
    }
}

impl fmt::Debug for CollectionValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionValue::Empty => fmt.write_str("Empty"),
            CollectionValue::Pending(pending) => write!(fmt, "Pending(owner={})", pending.owner),
        }
    }
}
