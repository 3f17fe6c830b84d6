//! Deferred loading of related entities.

mod collection;
pub use collection::Collection;

mod item;
pub use item::Item;

mod lazy;
pub use lazy::LazyItem;
