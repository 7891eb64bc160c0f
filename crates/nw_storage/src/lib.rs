pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub mod prelude {
    pub use super::{MemoryStore, SqliteStore};
    pub use nw_core::{Result, WatchStore};
}
