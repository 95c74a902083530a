pub mod config;
pub mod datamodel;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod paging;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
