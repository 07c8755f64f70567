use map_3d::{deg2rad, ecef2geodetic, geodetic2ecef, rad2deg, Ellipsoid};
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Receiver position, stored as ECEF WGS84 coordinates in meters
#[derive(Default, Copy, Debug, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundPosition(f64, f64, f64);

impl From<(f64, f64, f64)> for GroundPosition {
    fn from(xyz: (f64, f64, f64)) -> Self {
        Self(xyz.0, xyz.1, xyz.2)
    }
}

impl From<GroundPosition> for (f64, f64, f64) {
    fn from(val: GroundPosition) -> Self {
        (val.0, val.1, val.2)
    }
}

impl From<GroundPosition> for Vector3<f64> {
    fn from(val: GroundPosition) -> Self {
        Vector3::new(val.0, val.1, val.2)
    }
}

impl GroundPosition {
    /// Builds Self from ECEF WGS84 coordinates
    pub fn from_ecef_wgs84(pos: (f64, f64, f64)) -> Self {
        Self(pos.0, pos.1, pos.2)
    }
    /// Builds Self from Geodetic coordinates: latitude and longitude
    /// in ddeg, height above the ellipsoid in meters.
    pub fn from_geodetic(pos: (f64, f64, f64)) -> Self {
        let (lat, lon, h) = pos;
        let (x, y, z) = geodetic2ecef(deg2rad(lat), deg2rad(lon), h, Ellipsoid::WGS84);
        Self(x, y, z)
    }
    /// Converts Self to ECEF WGS84
    pub fn to_ecef_wgs84(&self) -> (f64, f64, f64) {
        (self.0, self.1, self.2)
    }
    /// Converts Self to geodetic coordinates: latitude and longitude in ddeg
    /// (longitude within [-180, 180]), height above the ellipsoid in meters.
    pub fn to_geodetic(&self) -> (f64, f64, f64) {
        let (lat, lon, h) = ecef2geodetic(self.0, self.1, self.2, Ellipsoid::WGS84);
        (rad2deg(lat), rad2deg(lon), h)
    }
    /// Returns position altitude
    pub fn altitude(&self) -> f64 {
        self.to_geodetic().2
    }
    /// Returns true if all coordinates are zero, which is how
    /// RINEX headers express an unknown position.
    pub fn is_null(&self) -> bool {
        self.0 == 0.0 && self.1 == 0.0 && self.2 == 0.0
    }
    /// Local vertical unit vector, in ECEF frame
    pub fn up_vector(&self) -> Vector3<f64> {
        let (lat, lon, _) = self.to_geodetic();
        let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
        let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }
    /// Elevation angle in degrees of given ECEF point (meters) seen from Self.
    pub fn elevation_of(&self, target: Vector3<f64>) -> f64 {
        self.elevation_with_up(&self.up_vector(), target)
    }
    /// [Self::elevation_of] with a precomputed local vertical
    pub(crate) fn elevation_with_up(&self, up: &Vector3<f64>, target: Vector3<f64>) -> f64 {
        let los = target - Vector3::<f64>::from(*self);
        let cos_zenith = (up.dot(&los) / los.norm()).clamp(-1.0, 1.0);
        90.0 - cos_zenith.acos().to_degrees()
    }
}

impl std::fmt::Display for GroundPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "WGS84 ({}m {}m {}m)", self.0, self.1, self.2)
    }
}

/*
 * RINEX compatible formatting
 */
impl std::fmt::UpperHex for GroundPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:14.4}{:14.4}{:14.4}", self.0, self.1, self.2)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn geodetic_round_trip() {
        for (lat, lon, h) in [
            (45.0, 7.5, 350.0),
            (-33.9, 151.2, 40.0),
            (64.8, -147.7, 135.0),
            (42.6, -71.5, 0.0),
        ] {
            let pos = GroundPosition::from_geodetic((lat, lon, h));
            let (lat_r, lon_r, h_r) = pos.to_geodetic();
            assert!((lat_r - lat).abs() < 1.0E-6, "latitude {} {}", lat, lat_r);
            assert!((lon_r - lon).abs() < 1.0E-6, "longitude {} {}", lon, lon_r);
            assert!((h_r - h).abs() < 1.0E-4, "height {} {}", h, h_r);
        }
    }
    #[test]
    fn geodetic_reference() {
        // ellipsoid surface, on the equator and at the pole
        let pos = GroundPosition::from_geodetic((0.0, 0.0, 0.0));
        let (x, y, z) = pos.to_ecef_wgs84();
        assert!((x - 6378137.0).abs() < 1.0E-6);
        assert!(y.abs() < 1.0E-6 && z.abs() < 1.0E-6);

        let pos = GroundPosition::from_geodetic((90.0, 0.0, 100.0));
        let (_, _, z) = pos.to_ecef_wgs84();
        assert!((z - 6356852.314245).abs() < 1.0E-3);

        // height is expressed in meters
        let pos = GroundPosition::from_geodetic((0.0, 90.0, 1000.0));
        let (x, y, z) = pos.to_ecef_wgs84();
        assert!(x.abs() < 1.0E-6 && z.abs() < 1.0E-6);
        assert!((y - 6379137.0).abs() < 1.0E-6);

        let (lat, lon, h) = GroundPosition::from_ecef_wgs84((0.0, -6379137.0, 0.0)).to_geodetic();
        assert!(lat.abs() < 1.0E-9);
        assert!((lon + 90.0).abs() < 1.0E-9);
        assert!((h - 1000.0).abs() < 1.0E-4);
    }
    #[test]
    fn zenith_and_horizon() {
        let pos = GroundPosition::from_geodetic((30.0, 20.0, 0.0));
        let up = pos.up_vector();
        let zenith = Vector3::<f64>::from(pos) + up * 2.0E7;
        assert!((pos.elevation_of(zenith) - 90.0).abs() < 1.0E-5);
        let east = Vector3::new(-20.0f64.to_radians().sin(), 20.0f64.to_radians().cos(), 0.0);
        let horizon = Vector3::<f64>::from(pos) + east * 1.0E6;
        assert!(pos.elevation_of(horizon).abs() < 1.0E-9);
    }
    #[test]
    fn null_position() {
        assert!(GroundPosition::default().is_null());
        assert!(!GroundPosition::from_geodetic((0.0, 0.0, 0.0)).is_null());
    }
    #[test]
    fn equatorial_elevations() {
        let rx = GroundPosition::from_geodetic((0.0, 0.0, 0.0));
        let r = 6378137.0;
        assert!((rx.elevation_of(Vector3::new(26_560_000.0, 0.0, 0.0)) - 90.0).abs() < 1.0E-9);
        assert!((rx.elevation_of(Vector3::new(r + 1000.0, 0.0, 1000.0)) - 45.0).abs() < 1.0E-9);
        assert!((rx.elevation_of(Vector3::new(r + 1000.0, 1000.0 * 3.0_f64.sqrt(), 0.0)) - 30.0).abs() < 1.0E-9);
        assert!(rx.elevation_of(Vector3::new(r, 20_000_000.0, 0.0)).abs() < 1.0E-9);
        assert!((rx.elevation_of(Vector3::new(0.0, 0.0, 0.0)) + 90.0).abs() < 1.0E-9);
    }
}
