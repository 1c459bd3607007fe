use std::{sync::Arc, time::Duration};

use _model::{Location, Store};
use arc_swap::ArcSwap;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{
    distance::DistanceModel,
    error::{FetchError, GeocodeError, ParseError},
    fetch::StoreSource,
    geocoding::{AddressUpdate, GeocodeWorker, Geocoder},
    payload::{parse_entry, RawStoreList},
};

/// An immutable set of stores, in payload order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    stores: Vec<Store>,
}

impl Snapshot {
    /// Builds a snapshot from raw entries, skipping (and logging) any entry
    /// that doesn't parse. Never fails as a whole.
    pub fn from_entries(list: RawStoreList) -> Self {
        Self::build(list).0
    }

    /// Also returns how many distinct names were dropped as malformed.
    /// Collapsed duplicates don't count.
    fn build(list: RawStoreList) -> (Self, usize) {
        let mut stores = Vec::new();
        let mut skipped = 0;
        for (name, value) in list.dedup() {
            match parse_entry(name.clone(), value) {
                Ok(store) => stores.push(store),
                Err(e) => {
                    warn!(store = %name, error = %e, "skipping store entry");
                    skipped += 1;
                }
            }
        }
        (Self { stores }, skipped)
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Store> {
        self.stores.iter().find(|x| x.name() == name)
    }

    /// Nearest first; ties keep snapshot order. Without an observer the
    /// snapshot order is returned as is.
    pub fn ranked_by_distance(
        &self,
        observer: Option<Location>,
        model: DistanceModel,
    ) -> Vec<&Store> {
        let Some(observer) = observer else {
            return self.stores.iter().collect();
        };

        // sorted_by is stable
        self.stores
            .iter()
            .map(|x| (model.distance(observer, x.location()), x))
            .sorted_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, x)| x)
            .collect()
    }

    /// Copy of this snapshot with the update applied, or `None` if no store
    /// here matches both the name and the looked-up location.
    fn with_address(&self, update: &AddressUpdate) -> Option<Snapshot> {
        let i = self
            .stores
            .iter()
            .position(|x| x.name() == update.name && x.location() == update.location)?;
        let mut next = self.clone();
        next.stores[i].set_address(update.address.clone());
        Some(next)
    }
}

/// Holds the current [`Snapshot`] and answers distance queries against it.
///
/// Readers always see a complete snapshot: ingest builds a new one off to
/// the side and swaps it in with a single pointer store. If two ingests
/// race, the last one to finish wins.
pub struct Directory {
    current: Arc<ArcSwap<Snapshot>>,
    model: DistanceModel,
    geocoding: Option<GeocodeWorker>,
}

impl Directory {
    pub fn new(model: DistanceModel) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(Snapshot::default())),
            model,
            geocoding: None,
        }
    }

    /// Resolve the address of every store ingested from now on, in the
    /// background. Results for stores that have since been replaced are
    /// dropped.
    pub fn with_geocoder<G>(mut self, geocoder: G, interval: Duration) -> Self
    where
        G: Geocoder + Send + 'static,
    {
        let cell = Arc::downgrade(&self.current);
        self.geocoding = Some(GeocodeWorker::spawn(geocoder, interval, move |update| {
            if let Some(cell) = cell.upgrade() {
                apply_address(&cell, &update);
            }
        }));
        self
    }

    pub fn model(&self) -> DistanceModel {
        self.model
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replaces the current snapshot with one built from `list`.
    pub fn ingest(&self, list: RawStoreList) -> Arc<Snapshot> {
        let (snapshot, skipped) = Snapshot::build(list);
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        info!(stores = snapshot.len(), skipped, "store directory replaced");

        if let Some(worker) = &self.geocoding {
            for store in snapshot.stores() {
                worker.submit(store.name(), store.location());
            }
        }
        snapshot
    }

    /// Decodes a raw `{"storeList": ...}` body and ingests it. On a parse
    /// error the current snapshot is left alone.
    pub fn ingest_json(&self, body: &str) -> Result<Arc<Snapshot>, ParseError> {
        let list = RawStoreList::from_json(body)?;
        Ok(self.ingest(list))
    }

    /// Fetches and ingests. Any failure leaves the current snapshot in place.
    pub fn refresh(&self, source: &dyn StoreSource) -> Result<Arc<Snapshot>, FetchError> {
        let result = source
            .fetch()
            .and_then(|body| Ok(self.ingest_json(&body)?));
        if let Err(e) = &result {
            warn!(error = %e, "store refresh failed, keeping previous stores");
        }
        result
    }

    pub fn ranked_by_distance(&self, observer: Option<Location>) -> Vec<Store> {
        let snapshot = self.current.load();
        snapshot
            .ranked_by_distance(observer, self.model)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Metres between the store and the observer.
    pub fn distance_to(&self, store: &Store, observer: Location) -> f64 {
        self.model.distance(store.location(), observer)
    }

    pub fn nearest(&self, observer: Location) -> Option<Store> {
        let snapshot = self.current.load();
        snapshot
            .ranked_by_distance(Some(observer), self.model)
            .first()
            .map(|x| (*x).clone())
    }

    pub fn get(&self, name: &str) -> Option<Store> {
        self.current.load().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Applies a geocoding result. Returns whether a store matched.
    pub fn apply_address(&self, update: &AddressUpdate) -> bool {
        apply_address(&self.current, update)
    }

    /// Looks up the address of one store right away, without the background
    /// worker. Returns the store as it is after the update, or `None` if no
    /// store has that name.
    pub fn resolve_address(
        &self,
        name: &str,
        geocoder: &dyn Geocoder,
    ) -> Result<Option<Store>, GeocodeError> {
        let Some(mut store) = self.get(name) else {
            return Ok(None);
        };
        let address = geocoder.reverse(store.location())?;
        let update = AddressUpdate {
            name: store.name().to_string(),
            location: store.location(),
            address,
        };
        if !self.apply_address(&update) {
            debug!(store = name, "store changed during lookup, address not stored");
        }
        store.set_address(update.address);
        Ok(Some(store))
    }

    /// Address lookups queued or in flight.
    pub fn pending_lookups(&self) -> usize {
        self.geocoding.as_ref().map_or(0, |x| x.pending())
    }
}

fn apply_address(cell: &ArcSwap<Snapshot>, update: &AddressUpdate) -> bool {
    let mut applied = false;
    cell.rcu(|current| match current.with_address(update) {
        Some(next) => {
            applied = true;
            Arc::new(next)
        }
        None => {
            applied = false;
            Arc::clone(current)
        }
    });
    applied
}
