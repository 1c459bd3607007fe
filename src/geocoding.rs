use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc::{self, Sender},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use _model::{Address, Location};
use serde::Deserialize;
use tracing::{debug, warn};
use ureq::Agent;

use crate::error::GeocodeError;

/// Reverse geocoding: coordinates to a postal address.
pub trait Geocoder {
    fn reverse(&self, location: Location) -> Result<Address, GeocodeError>;
}

/// Result of a lookup, addressed to a store by name and the location that
/// was looked up rather than by reference. If the store is gone by the
/// time this arrives, it is dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct AddressUpdate {
    pub name: String,
    pub location: Location,
    pub address: Address,
}

#[derive(Debug)]
struct Lookup {
    name: String,
    location: Location,
}

/// Runs lookups one at a time on a background thread, at most one request
/// per `interval`, and hands every successful result to `deliver`.
///
/// Dropping the worker stops the thread after the lookup in flight; jobs
/// still queued are discarded without a request.
pub struct GeocodeWorker {
    jobs: Sender<Lookup>,
    pending: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl GeocodeWorker {
    pub fn spawn<G, F>(geocoder: G, interval: Duration, deliver: F) -> Self
    where
        G: Geocoder + Send + 'static,
        F: Fn(AddressUpdate) + Send + 'static,
    {
        let (jobs, queue) = mpsc::channel::<Lookup>();
        let pending = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pending);
        let closed = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&closed);

        thread::spawn(move || {
            let mut last: Option<Instant> = None;
            for lookup in queue {
                if let Some(x) = last {
                    let elapsed = x.elapsed();
                    if elapsed < interval {
                        thread::sleep(interval - elapsed);
                    }
                }
                if stop.load(Ordering::SeqCst) {
                    debug!("geocoding worker closed, dropping queued lookups");
                    break;
                }
                last = Some(Instant::now());

                match geocoder.reverse(lookup.location) {
                    Ok(address) => {
                        debug!(store = %lookup.name, %address, "address resolved");
                        deliver(AddressUpdate {
                            name: lookup.name,
                            location: lookup.location,
                            address,
                        });
                    }
                    Err(e) => debug!(store = %lookup.name, error = %e, "address lookup failed"),
                }
                counter.fetch_sub(1, Ordering::SeqCst);
            }
        });

        Self {
            jobs,
            pending,
            closed,
        }
    }

    pub fn submit(&self, name: &str, location: Location) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let lookup = Lookup {
            name: name.to_string(),
            location,
        };
        if self.jobs.send(lookup).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(store = name, "geocoding worker has stopped");
        }
    }

    /// Lookups queued or in flight.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl Drop for GeocodeWorker {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub struct Nominatim {
    agent: Agent,
    base: String,
    email: Option<String>,
}

impl Nominatim {
    pub fn new(agent: Agent, base: impl Into<String>) -> Self {
        Self {
            agent,
            base: base.into(),
            email: None,
        }
    }

    /// Contact address sent with every request, as the usage policy asks.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Geocoder for Nominatim {
    fn reverse(&self, location: Location) -> Result<Address, GeocodeError> {
        let mut request = self
            .agent
            .get(&format!("{}/reverse", self.base.trim_end_matches('/')))
            .query("format", "jsonv2")
            .query("lat", &location.lat().to_string())
            .query("lon", &location.lon().to_string());
        if let Some(email) = &self.email {
            request = request.query("email", email);
        }

        let response: ReverseResponse = request.call().map_err(Box::new)?.into_json()?;
        response.into_address()
    }
}

#[derive(Deserialize)]
struct ReverseResponse {
    error: Option<String>,
    address: Option<BTreeMap<String, String>>,
}

impl ReverseResponse {
    fn into_address(self) -> Result<Address, GeocodeError> {
        if let Some(e) = self.error {
            return Err(GeocodeError::NotFound(e));
        }
        let Some(raw) = self.address else {
            return Err(GeocodeError::NotFound("response has no address".to_string()));
        };

        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| raw.get(*k))
                .cloned()
                .unwrap_or_default()
        };
        Ok(Address {
            street: first(&["road", "pedestrian", "footway", "square"]),
            postal_code: first(&["postcode"]),
            city: first(&["city", "town", "village", "municipality"]),
            country: first(&["country"]),
        })
    }
}
