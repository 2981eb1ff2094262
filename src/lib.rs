pub mod config;
pub mod discovery;
pub mod error;
pub mod feed;
pub mod store;

pub use discovery::{EntryDiscovery, RunSummary};
pub use error::DiscoveryError;
