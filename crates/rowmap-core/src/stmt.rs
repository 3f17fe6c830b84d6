//! Database-shaped values exchanged with a [`Connection`](crate::Connection).

mod id;
pub use id::Id;

mod row;
pub use row::Row;

mod value;
pub use value::{Number, Value};
