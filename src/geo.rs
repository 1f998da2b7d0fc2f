use serde::{Deserialize, Serialize};

pub(crate) const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Visible map region. `(bottom_lat, left_lng)` is the lower left corner, the
/// upper right one is mirrored across `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Viewport {
    pub center: GeoPoint,
    pub left_lng: f64,
    pub bottom_lat: f64,
}

/// Rectangle centered on `center`, sized in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundingBox {
    pub center: GeoPoint,
    pub width_meters: f64,
    pub height_meters: f64,
}

/// Haversine distance in meters between two points given in degrees.
///
/// Coordinates outside the valid lat/lng ranges are not rejected and give an
/// unspecified result.
pub(crate) fn distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let d_phi = (p2.lat - p1.lat).to_radians();
    let d_lambda = (p2.lng - p1.lng).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

impl Viewport {
    pub fn new(center: GeoPoint, left_lng: f64, bottom_lat: f64) -> Self {
        Self {
            center,
            left_lng,
            bottom_lat,
        }
    }

    /// Top right corner, reflected from the given corner across the center.
    pub fn opposite_corner(&self) -> GeoPoint {
        GeoPoint {
            lat: self.center.lat + (self.center.lat - self.bottom_lat).abs(),
            lng: self.center.lng + (self.center.lng - self.left_lng).abs(),
        }
    }

    /// Width is measured along the center's latitude and height along the
    /// center's longitude. The box gets distorted near the poles and for very
    /// large viewports, and no correction is applied.
    pub fn to_box(&self) -> BoundingBox {
        let c = self.center;
        let top_right = self.opposite_corner();
        let width_meters = distance(GeoPoint::new(c.lat, self.left_lng), GeoPoint::new(c.lat, top_right.lng));
        let height_meters = distance(GeoPoint::new(top_right.lat, c.lng), GeoPoint::new(self.bottom_lat, c.lng));
        BoundingBox {
            center: c,
            width_meters,
            height_meters,
        }
    }
}
