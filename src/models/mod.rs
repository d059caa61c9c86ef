pub mod generation;
pub mod record;
pub mod reply;

pub use generation::*;
pub use record::*;
pub use reply::*;
