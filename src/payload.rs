//! Decoding of the store list served at `/stores`:
//!
//! ```json
//! {"storeList": {"Alpha": {"lat": "52.50", "lon": "13.40"}, ...}}
//! ```
//!
//! Coordinates arrive as decimal strings. Entries are decoded one at a time
//! so a bad entry only costs that entry.

use std::{collections::HashMap, fmt};

use _model::{Location, Store};
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use serde_json::Value;
use tracing::warn;

use crate::error::{EntryError, ParseError};

#[derive(Deserialize)]
struct StoreListResponse {
    #[serde(rename = "storeList")]
    store_list: RawStoreList,
}

/// Store list entries in payload order. Repeated names are kept here and
/// only collapsed by [`RawStoreList::dedup`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawStoreList(pub Vec<(String, Value)>);

impl RawStoreList {
    pub fn from_json(body: &str) -> Result<Self, ParseError> {
        let response: StoreListResponse = serde_json::from_str(body)?;
        Ok(response.store_list)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collapses repeated names. The last entry for a name wins and takes
    /// the position where that name first appeared.
    pub fn dedup(self) -> Vec<(String, Value)> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut output: Vec<(String, Value)> = Vec::with_capacity(self.0.len());
        for (name, value) in self.0 {
            if let Some(&i) = positions.get(&name) {
                warn!(store = %name, "duplicate store name, keeping the last entry");
                output[i].1 = value;
            } else {
                positions.insert(name.clone(), output.len());
                output.push((name, value));
            }
        }
        output
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawStoreList {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for RawStoreList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawStoreListVisitor)
    }
}

struct RawStoreListVisitor;

impl<'de> Visitor<'de> for RawStoreListVisitor {
    type Value = RawStoreList;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map of store names to coordinates")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, value)) = map.next_entry::<String, Value>()? {
            entries.push((name, value));
        }
        Ok(RawStoreList(entries))
    }
}

#[derive(Deserialize)]
struct RawEntry {
    lat: String,
    lon: String,
}

pub fn parse_entry(name: String, value: Value) -> Result<Store, EntryError> {
    let raw: RawEntry = serde_json::from_value(value).map_err(EntryError::Shape)?;
    let lat: f64 = raw.lat.parse().map_err(|_| EntryError::Latitude(raw.lat))?;
    let lon: f64 = raw.lon.parse().map_err(|_| EntryError::Longitude(raw.lon))?;
    Ok(Store::new(name, Location::new(lat, lon)?)?)
}
