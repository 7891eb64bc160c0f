pub mod extract;
pub mod gdelt;

pub use extract::PageExtractor;
pub use gdelt::GdeltClient;

pub mod prelude {
    pub use super::{GdeltClient, PageExtractor};
    pub use nw_core::{Candidate, Error, Result};
}
