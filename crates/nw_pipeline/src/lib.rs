pub mod dedup;
pub mod discovery;
pub mod driver;
pub mod summarize;
pub mod watchlist;

pub use driver::{Pipeline, TopicReport};

pub mod prelude {
    pub use super::{Pipeline, TopicReport};
    pub use nw_core::{Result, Topic};
}
