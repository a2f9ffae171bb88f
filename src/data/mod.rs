pub mod reader;

pub use reader::{OffsetView, Record, resolve_relptr};
