pub mod args;
pub mod campaigns;
pub mod captions;
pub mod config;
pub mod error;
pub mod groups;
pub mod interval;
pub mod logging;
pub mod poster;
pub mod promoter;
pub mod theme;

// Re-export engine types at crate root for convenience
pub use error::PromoError;
pub use promoter::{PassSummary, Promoter};
