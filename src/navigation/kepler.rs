//! Keplerian orbit propagation of GPS broadcast ephemerides
use nalgebra::{Rotation3, Vector3};

use crate::{
    constants::{DtrF, Omega, GM},
    epoch::time_of_week,
    navigation::Ephemeris,
    prelude::{Epoch, SV},
};

/// Half a GPS week, in seconds
const HALF_WEEK: f64 = 302400.0;

/// Number of bracket refinements
const KEPLER_ROUNDS: usize = 5;

/// Number of samples per refinement
const KEPLER_SAMPLES: usize = 5;

/// Solves Kepler's equation M = E - e sin(E) for the eccentric anomaly E,
/// by successive refinement of a bracket around M. The bracket initially spans
/// M ± 1.01 e. Each round samples 5 points spaced by a tenth of the bracket
/// from its lower end and narrows the bracket to ± a tenth of its width
/// around the best sample. This is a coarse solver: results are reproducible
/// but only approximate.
pub fn solve_kepler(m: f64, e: f64) -> f64 {
    let mut start = m - 1.01 * e;
    let mut end = m + 1.01 * e;
    let mut best = 0.0_f64;

    for _ in 0..KEPLER_ROUNDS {
        let mut min_err = f32::MAX as f64;
        best = 0.0;
        for j in 0..KEPLER_SAMPLES {
            let guess = start + j as f64 * (end - start) / 10.0;
            let err = (m - guess + e * guess.sin()).abs();
            if err < min_err {
                min_err = err;
                best = guess;
            }
        }
        let range = end - start;
        start = best - range / 10.0;
        end = best + range / 10.0;
    }

    best
}

/// Orbital state of one satellite at a given instant
#[derive(Debug, Clone, Copy)]
pub(crate) struct Helper {
    /// True anomaly (rad)
    pub v_k: f64,
    /// Argument of perigee (corrected)
    pub omega_k: f64,
    /// Radius (corrected)
    pub r_k: f64,
    /// Orbital inclination (corrected)
    pub i_k: f64,
    /// Right ascension of the ascending node, in Earth fixed frame
    pub big_omega_k: f64,
}

impl Helper {
    /// Orbital plane to ECEF [Rotation3]
    fn orbit_to_ecef_rotation_matrix(&self) -> Rotation3<f64> {
        // Positive angles mean counterclockwise rotation
        let rotation_z_node = Rotation3::from_axis_angle(&Vector3::z_axis(), self.big_omega_k);
        let rotation_x = Rotation3::from_axis_angle(&Vector3::x_axis(), self.i_k);
        let rotation_z_perigee = Rotation3::from_axis_angle(&Vector3::z_axis(), self.omega_k);
        rotation_z_node * rotation_x * rotation_z_perigee
    }

    /// ECEF position in meters
    pub fn ecef_position(&self) -> Vector3<f64> {
        let (sin_v_k, cos_v_k) = self.v_k.sin_cos();
        let orbit_xyz = Vector3::new(self.r_k * cos_v_k, self.r_k * sin_v_k, 0.0);
        self.orbit_to_ecef_rotation_matrix() * orbit_xyz
    }
}

impl Ephemeris {
    /// Corrected mean motion (rad.s⁻¹)
    fn mean_motion(&self) -> f64 {
        (GM::GPS / self.a.powi(3)).sqrt() + self.dn
    }

    /// Time elapsed since time of ephemeris, in seconds,
    /// accounting for the week crossover.
    pub fn t_k(&self, t: Epoch) -> f64 {
        let mut t_k = time_of_week(t) - self.toe;
        if t_k > HALF_WEEK {
            t_k -= 2.0 * HALF_WEEK;
        } else if t_k < -HALF_WEEK {
            t_k += 2.0 * HALF_WEEK;
        }
        t_k
    }

    /// Eccentric anomaly at given instant (rad)
    pub fn eccentric_anomaly(&self, t: Epoch) -> f64 {
        let t_k = self.t_k(t);
        let m_k = self.m0 + self.mean_motion() * t_k;
        solve_kepler(m_k, self.e)
    }

    pub(crate) fn helper(&self, t: Epoch) -> Helper {
        let t_k = self.t_k(t);
        let m_k = self.m0 + self.mean_motion() * t_k;
        let e_k = solve_kepler(m_k, self.e);

        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let v_k = ((1.0 - self.e.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - self.e);

        let phi_k = v_k + self.omega;
        let (sin_2phi, cos_2phi) = (2.0 * phi_k).sin_cos();

        let omega_k = self.omega + self.cus * sin_2phi + self.cuc * cos_2phi;
        let r_k = self.a * (1.0 - self.e * cos_e_k) + self.crs * sin_2phi + self.crc * cos_2phi;
        let i_k = self.i0 + self.idot * t_k + self.cis * sin_2phi + self.cic * cos_2phi;

        let big_omega_k =
            self.omega0 + (self.omega_dot - Omega::GPS) * t_k - Omega::GPS * self.toe;

        Helper {
            v_k,
            omega_k,
            r_k,
            i_k,
            big_omega_k,
        }
    }

    /// Satellite ECEF position (m) at given instant
    pub fn ecef_position(&self, t: Epoch) -> Vector3<f64> {
        self.helper(t).ecef_position()
    }

    /// Relativistic clock correction (s) at given instant: F e sqrt(a) sin(E).
    pub fn relativistic_delay(&self, t: Epoch) -> f64 {
        let e_k = self.eccentric_anomaly(t);
        DtrF::GPS * self.e * self.a.sqrt() * e_k.sin()
    }
}

/// Returns the [Ephemeris] of this satellite published closest to t.
/// Ephemerides must be sorted (see [Ephemeris] ordering): the scan stops
/// once it leaves the block of this satellite, or as soon as the time
/// difference stops decreasing.
pub fn nearest_ephemeris(ephemerides: &[Ephemeris], sv: SV, t: Epoch) -> Option<&Ephemeris> {
    let mut nearest = Option::<&Ephemeris>::None;
    let mut min_dt = f64::MAX;

    for eph in ephemerides {
        if eph.sv != sv {
            if nearest.is_some() {
                break;
            }
            continue;
        }
        let dt = (t - eph.epoch).to_seconds().abs();
        if dt < min_dt {
            min_dt = dt;
            nearest = Some(eph);
        } else {
            break;
        }
    }

    nearest
}
