use _model::Location;
use clap::ValueEnum;
use geo::{GeodesicDistance, HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// Earth model used for surface distances. A directory picks one at
/// construction and uses it for every ranking, so orderings are reproducible.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceModel {
    /// WGS-84 ellipsoid (Karney's algorithm)
    #[default]
    Geodesic,
    /// sphere with the mean earth radius
    Haversine,
}

impl DistanceModel {
    /// Surface distance in metres.
    pub fn distance(&self, a: Location, b: Location) -> f64 {
        let (a, b) = (point(a), point(b));
        match self {
            Self::Geodesic => a.geodesic_distance(&b),
            Self::Haversine => a.haversine_distance(&b),
        }
    }
}

// geo wants x = longitude, y = latitude
fn point(x: Location) -> Point {
    Point::new(x.lon(), x.lat())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    #[test]
    fn zero_distance() {
        let x = loc(52.5167, 13.3833);
        assert_eq!(DistanceModel::Geodesic.distance(x, x), 0.0);
        assert_eq!(DistanceModel::Haversine.distance(x, x), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        // ~111.2km on the sphere, ~110.6km at the equator on WGS-84
        let a = loc(0.0, 0.0);
        let b = loc(1.0, 0.0);
        let haversine = DistanceModel::Haversine.distance(a, b);
        let geodesic = DistanceModel::Geodesic.distance(a, b);
        assert!((haversine - 111_195.0).abs() < 10.0, "{haversine}");
        assert!((geodesic - 110_574.0).abs() < 10.0, "{geodesic}");
    }

    #[test]
    fn berlin_to_paris() {
        // reference values from an independent Vincenty calculation
        let berlin = loc(52.5200, 13.4050);
        let paris = loc(48.8566, 2.3522);
        let d = DistanceModel::Geodesic.distance(berlin, paris);
        assert!((d - 879_699.3).abs() < 1.0, "{d}");
        let d = DistanceModel::Geodesic.distance(paris, berlin);
        assert!((d - 879_699.3).abs() < 1.0, "{d}");

        let d = DistanceModel::Haversine.distance(berlin, paris);
        assert!((d - 877_464.5).abs() < 1.0, "{d}");
    }
}
