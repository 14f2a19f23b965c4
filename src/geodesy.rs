//! Spherical-earth geodesy used by the step projector and the calibrator.
//!
//! Both functions treat the earth as a sphere of radius [`EARTH_RADIUS_M`];
//! inputs and outputs are in degrees, bearings in radians clockwise from north.

use crate::types::{Coordinate, DeadReckonedPosition};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Project `origin` forward by `distance_m` along `bearing_rad` (direct geodesic problem).
///
/// `distance_m` must be non-negative. The bearing is not normalised; the trig
/// functions take it modulo 2π.
pub fn project(
    origin: Coordinate,
    distance_m: f64,
    bearing_rad: f64,
    timestamp_ms: i64,
) -> DeadReckonedPosition {
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing_rad.cos()).asin();
    let lon2 = lon1
        + (bearing_rad.sin() * delta.sin() * lat1.cos())
            .atan2(delta.cos() - lat1.sin() * lat2.sin());

    DeadReckonedPosition {
        coordinate: Coordinate::new(lat2.to_degrees(), lon2.to_degrees()),
        timestamp_ms,
    }
}

/// Haversine distance in meters between two coordinates.
pub fn great_circle_distance(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}
