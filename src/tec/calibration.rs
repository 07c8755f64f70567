//! Satellite and receiver bias removal
use itertools::Itertools;

use crate::{bias::BiasMap, cfg::ReceiverBiasOpts, observation::Observation};

/// Removes the satellite differential code bias from every slant TEC
pub fn remove_satellite_biases(observations: &mut [Observation], biases: &BiasMap) {
    for obs in observations.iter_mut() {
        if let Some(slant) = obs.slant_tec.as_mut() {
            *slant -= biases.get(obs.sv.prn);
        }
    }
}

/// Estimates the receiver bias, assuming the lowest slant TEC
/// of the whole session is close to zero.
/// The lowest value is discarded as an outlier when it lies too far
/// from the low percentile value, which is then used instead.
/// Returns None when no observation is leveled.
pub fn estimate_receiver_bias(observations: &[Observation], opts: &ReceiverBiasOpts) -> Option<f64> {
    let values = observations
        .iter()
        .filter_map(|obs| obs.slant_tec)
        .sorted_by(|a, b| a.total_cmp(b))
        .collect::<Vec<_>>();

    if values.is_empty() {
        return None;
    }

    let lowest = values[0];
    let rank = ((values.len() - 1) as f64 * opts.percentile.clamp(0.0, 1.0)) as usize;
    let percentile = values[rank];

    if percentile - lowest > opts.outlier_threshold {
        Some(percentile)
    } else {
        Some(lowest)
    }
}

/// Removes given receiver bias from every slant TEC
pub fn remove_receiver_bias(observations: &mut [Observation], bias: f64) {
    for obs in observations.iter_mut() {
        if let Some(slant) = obs.slant_tec.as_mut() {
            *slant -= bias;
        }
    }
}
