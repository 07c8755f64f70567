//! Physical constants used in orbit propagation and TEC calculations

/// Earth gravitational constant [m³.s⁻²]
pub(crate) struct GM;

impl GM {
    pub const GPS: f64 = 3.9860050E14;
}

/// Earth rotation rate [rad.s⁻¹]
pub(crate) struct Omega;

impl Omega {
    pub const GPS: f64 = 7.2921151467E-5;
}

/// - 2 * sqrt(gm) / c / c
pub(crate) struct DtrF;

impl DtrF {
    pub const GPS: f64 = -4.442807633E-10;
}

/// Carrier and TEC conversion factors
pub(crate) struct Carrier;

impl Carrier {
    /// GPS fundamental frequency [Hz]
    pub const F0: f64 = 10.23E6;
    /// Speed of light used by carrier wavelengths [m.s⁻¹]
    pub const C: f64 = 3.0E8;
    /// L1 wavelength [m]
    pub const L1_WAVELENGTH: f64 = Self::C / (154.0 * Self::F0);
    /// L2 wavelength [m]
    pub const L2_WAVELENGTH: f64 = Self::C / (120.0 * Self::F0);
    /// f2² / (f1² - f2²) scaling, applied to geometry free combinations
    pub const F2_F1_FACTOR: f64 = 1.545727;
    /// meters of L1 delay to TECu
    pub const METERS_TO_TEC: f64 = 6.158;
    /// nanoseconds of differential code bias to TECu
    pub const NANOS_TO_TEC: f64 = -0.463 * Self::METERS_TO_TEC;
}

/// Highest GPS PRN we process
pub(crate) const MAX_PRN: u8 = 32;
