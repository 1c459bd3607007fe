pub mod config;
pub mod directory;
pub mod distance;
pub mod error;
pub mod fetch;
pub mod geocoding;
pub mod logging;
pub mod payload;
pub mod utils;

#[cfg(test)]
mod test_server;

pub use _model::{Address, Location, Store};
pub use directory::{Directory, Snapshot};
pub use distance::DistanceModel;
