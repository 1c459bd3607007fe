mod address;
mod location;
mod store;

pub use address::Address;
pub use location::{Location, LocationError};
pub use store::{Store, StoreError};
