use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Address, Location};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("store name is empty")]
    EmptyName,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Store {
    name: String,
    #[serde(flatten)]
    location: Location,
    #[serde(default)]
    address: Address,
}

impl Store {
    pub fn new(name: impl Into<String>, location: Location) -> Result<Self, StoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        Ok(Self {
            name,
            location,
            address: Address::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Replaces the address. The location stays fixed for the life of the store.
    pub fn set_address(&mut self, address: Address) {
        self.address = address;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store() {
        let location = Location::new(52.5, 13.4).unwrap();
        let store = Store::new("Alpha", location).unwrap();
        assert_eq!(store.name(), "Alpha");
        assert_eq!(store.location(), location);
        assert!(store.address().is_empty());

        assert_eq!(Store::new("", location), Err(StoreError::EmptyName));
    }

    #[test]
    fn serialize() {
        let store = Store::new("Alpha", Location::new(52.5, 13.4).unwrap()).unwrap();
        assert_eq!(
            serde_json::to_string(&store).unwrap(),
            r#"{"name":"Alpha","lat":52.5,"lon":13.4,"address":{"street":"","postalCode":"","city":"","country":""}}"#
        );
    }
}
