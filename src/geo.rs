//! Great-circle distance and centroid helpers.
//!
//! Coordinates are WGS84 degrees. NaN or out-of-range inputs are not
//! checked; events are validated by the loader before they reach us.

use crate::model::{Centroid, Event};

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance between the epicentres of two events.
pub fn event_distance_km(a: &Event, b: &Event) -> f64 {
    distance_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Planar mean of event coordinates. Fine at the few-tens-of-km scale of a
/// swarm or episode; returns (0, 0) for an empty slice.
pub fn centroid<'a, I>(events: I) -> Centroid
where
    I: IntoIterator<Item = &'a Event>,
{
    let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
    for event in events {
        lat += event.latitude;
        lon += event.longitude;
        n += 1;
    }
    if n == 0 {
        return Centroid { latitude: 0.0, longitude: 0.0 };
    }
    Centroid {
        latitude: lat / n as f64,
        longitude: lon / n as f64,
    }
}
