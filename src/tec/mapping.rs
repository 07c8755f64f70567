//! Thin shell ionospheric mapping and slant to vertical conversion
use std::panic::{catch_unwind, AssertUnwindSafe};

#[cfg(feature = "log")]
use log::{debug, error, warn};

use rayon::prelude::*;

use crate::{
    cfg::Config,
    navigation::{nearest_ephemeris, Ephemeris},
    observation::{Observation, VerticalTec},
    prelude::GroundPosition,
};

/// Returns the inverse of the single layer mapping function,
/// that is the vertical to slant TEC ratio, at given elevation (degrees).
/// `shell_factor` is the Re / (Re + H) ratio of the thin shell.
pub fn inverse_mapping_function(elevation_deg: f64, shell_factor: f64) -> f64 {
    let cos_el = elevation_deg.to_radians().cos();
    (1.0 - (shell_factor * cos_el).powi(2)).sqrt()
}

/// Single layer mapping function: slant to vertical TEC ratio
/// at given elevation (degrees).
pub fn mapping_function(elevation_deg: f64, shell_factor: f64) -> f64 {
    1.0 / inverse_mapping_function(elevation_deg, shell_factor)
}

/// Result of one conversion batch
#[derive(Debug, Clone, Copy, PartialEq)]
enum BatchFault {
    /// Observation was not leveled
    NotLeveled,
    /// Computation panicked
    Panicked,
}

/// Converts one batch. Results are committed only when the whole batch succeeds.
fn convert_batch(
    batch: &[Observation],
    ephemerides: &[Ephemeris],
    receiver: &GroundPosition,
    up: &nalgebra::Vector3<f64>,
    shell_factor: f64,
) -> Result<Vec<(Option<f64>, Option<VerticalTec>)>, BatchFault> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut results = Vec::with_capacity(batch.len());
        for obs in batch.iter() {
            let slant = match obs.slant_tec {
                Some(slant) => slant,
                None => return Err(BatchFault::NotLeveled),
            };
            match nearest_ephemeris(ephemerides, obs.sv, obs.epoch) {
                Some(eph) => {
                    let elevation = receiver.elevation_with_up(up, eph.ecef_position(obs.epoch));
                    let vertical = slant * inverse_mapping_function(elevation, shell_factor);
                    results.push((Some(elevation), Some(VerticalTec::Value(vertical))));
                },
                None => results.push((None, None)),
            }
        }
        Ok(results)
    }));
    match outcome {
        Ok(results) => results,
        Err(_) => Err(BatchFault::Panicked),
    }
}

/// Computes elevation and vertical TEC of each observation, in batches
/// of [Config::batch_size] processed by up to [Config::workers] threads.
/// Observations with no ephemeris for their satellite keep unknown elevation and vertical TEC.
/// When a batch fails, all of its observations are marked [VerticalTec::Invalid].
/// Returns false if the thread pool could not be deployed.
pub fn convert_slant_to_vertical(
    observations: &mut [Observation],
    ephemerides: &[Ephemeris],
    receiver: &GroundPosition,
    cfg: &Config,
) -> bool {
    let mut sorted = ephemerides.to_vec();
    sorted.sort();

    let up = receiver.up_vector();
    let shell_factor = cfg.shell_factor;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.workers.max(1))
        .build()
    {
        Ok(pool) => pool,
        #[cfg(feature = "log")]
        Err(e) => {
            error!("failed to build thread pool: {}", e);
            return false;
        },
        #[cfg(not(feature = "log"))]
        Err(_) => return false,
    };

    let invalidate = |batch: &mut [Observation]| {
        for obs in batch.iter_mut() {
            obs.vertical_tec = Some(VerticalTec::Invalid);
        }
        1
    };

    let conversion = || {
        observations
            .par_chunks_mut(cfg.batch_size.max(1))
            .map(|batch| {
                match convert_batch(batch, &sorted, receiver, &up, shell_factor) {
                    Ok(results) => {
                        for (obs, (elevation, vertical)) in batch.iter_mut().zip(results) {
                            obs.elevation = elevation;
                            obs.vertical_tec = vertical;
                        }
                        0
                    },
                    #[cfg(feature = "log")]
                    Err(fault) => {
                        warn!("{}({}): batch invalidated ({:?})", batch[0].epoch, batch[0].sv, fault);
                        invalidate(batch)
                    },
                    #[cfg(not(feature = "log"))]
                    Err(_) => invalidate(batch),
                }
            })
            .sum::<usize>()
    };

    #[cfg(feature = "log")]
    {
        let poisoned = pool.install(conversion);
        debug!(
            "vertical conversion: {} observations, {} invalid batches",
            observations.len(),
            poisoned
        );
    }
    #[cfg(not(feature = "log"))]
    pool.install(conversion);

    true
}
