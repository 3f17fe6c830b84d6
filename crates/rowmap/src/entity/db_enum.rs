use rowmap_core::stmt::Value;

/// A Rust enum stored in an `enum` column.
pub trait DbEnum: Sized + 'static {
    /// Database value of every variant.
    fn variants() -> Vec<Value>;

    fn to_value(&self) -> Value;

    /// Variant stored as `value`, if any.
    fn from_value(value: &Value) -> Option<Self>;
}
