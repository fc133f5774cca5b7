//! Fluent metadata, values, and spaces.

pub mod adapter;
pub mod columns;
pub mod descriptor;
pub mod map;
pub mod space;

pub use adapter::FluentSpaceAdapter;
pub use columns::ColumnIndex;
pub use descriptor::{FluentDescriptor, FluentKind};
pub use map::FluentMap;
pub use space::{ArraySpace, DictSpace};
