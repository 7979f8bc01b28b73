pub mod component;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod status;

pub use component::*;
pub use config::Config;
pub use error::*;
pub use snapshot::*;
pub use status::*;
