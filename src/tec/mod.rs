//! Total Electron Content estimation
#[cfg(feature = "log")]
use log::{debug, error, info, warn};

use crate::{
    bias::BiasMap,
    cfg::Config,
    navigation::Ephemeris,
    observation::Observation,
    prelude::GroundPosition,
};

mod calibration;
mod leveling;
mod mapping;

pub use calibration::{estimate_receiver_bias, remove_receiver_bias, remove_satellite_biases};
pub use leveling::{level_phase, sort_observations};
pub use mapping::{convert_slant_to_vertical, inverse_mapping_function, mapping_function};

/// Outcome of a [TecPipeline] run
#[derive(Debug, Clone, PartialEq)]
pub struct TecSolution {
    /// Leveled and calibrated observations, sorted by satellite then time
    pub observations: Vec<Observation>,
    /// Receiver bias that was removed (TECu)
    pub receiver_bias: f64,
    /// Thin shell factor used by the mapping function
    pub shell_factor: f64,
}

impl TecSolution {
    /// Replaces the receiver bias: every slant TEC is shifted by the
    /// difference with the previous one, then mapped to the vertical
    /// again where the elevation is known.
    pub fn adjust_receiver_bias(&mut self, receiver_bias: f64) {
        let delta = self.receiver_bias - receiver_bias;
        for obs in self.observations.iter_mut() {
            if let Some(slant) = obs.slant_tec.as_mut() {
                *slant += delta;
            }
            obs.apply_mapping_function(self.shell_factor);
        }
        self.receiver_bias = receiver_bias;
    }

    /// Drops the observations whose displayed TEC, that is the vertical TEC
    /// when available or the slant TEC otherwise, falls outside [min, max].
    pub fn retain_within(&mut self, min: f64, max: f64) {
        self.observations.retain(|obs| {
            obs.displayed_tec()
                .map(|tec| tec >= min && tec <= max)
                .unwrap_or(false)
        });
    }
}

/// [TecPipeline] runs the TEC estimation stages, in order:
///  - sorting
///  - phase leveling
///  - satellite bias removal
///  - receiver bias estimation and removal
///  - elevation and vertical TEC, when ephemerides are provided
#[derive(Debug, Clone)]
pub struct TecPipeline<'a> {
    cfg: Config,
    ephemerides: Option<&'a [Ephemeris]>,
    biases: &'a BiasMap,
    receiver: GroundPosition,
}

impl<'a> TecPipeline<'a> {
    /// Builds a new [TecPipeline] with default [Config] and no ephemerides
    pub fn new(biases: &'a BiasMap, receiver: GroundPosition) -> Self {
        Self {
            cfg: Config::default(),
            ephemerides: None,
            biases,
            receiver,
        }
    }

    /// Copies and returns [TecPipeline] with desired [Config]
    pub fn with_config(&self, cfg: Config) -> Self {
        let mut s = self.clone();
        s.cfg = cfg;
        s
    }

    /// Copies and returns [TecPipeline] that will also compute elevations and
    /// vertical TEC, using these ephemerides
    pub fn with_ephemerides(&self, ephemerides: &'a [Ephemeris]) -> Self {
        let mut s = self.clone();
        s.ephemerides = Some(ephemerides);
        s
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Processes these observations in place.
    /// Returns the receiver bias on success.
    pub(crate) fn process(&self, observations: &mut Vec<Observation>) -> Option<f64> {
        sort_observations(observations);

        level_phase(observations, &self.cfg.leveling);

        if observations.is_empty() {
            #[cfg(feature = "log")]
            error!("no observation could be leveled");
            return None;
        }

        remove_satellite_biases(observations, self.biases);

        let receiver_bias = estimate_receiver_bias(observations, &self.cfg.receiver_bias)?;
        remove_receiver_bias(observations, receiver_bias);

        #[cfg(feature = "log")]
        info!(
            "{} leveled observations - receiver bias {:.3} TECu",
            observations.len(),
            receiver_bias
        );

        match self.ephemerides {
            Some(ephemerides) if !ephemerides.is_empty() => {
                if self.receiver.is_null() {
                    #[cfg(feature = "log")]
                    warn!("unknown receiver position: vertical TEC not computed");
                } else if !convert_slant_to_vertical(
                    observations,
                    ephemerides,
                    &self.receiver,
                    &self.cfg,
                ) {
                    return None;
                }
            },
            _ => {
                #[cfg(feature = "log")]
                debug!("no ephemerides: vertical TEC not computed");
            },
        }

        Some(receiver_bias)
    }

    /// Runs the pipeline. Returns None when no observation survived
    /// the leveling, or when the worker pool could not be deployed.
    pub fn run(&self, mut observations: Vec<Observation>) -> Option<TecSolution> {
        let receiver_bias = self.process(&mut observations)?;
        Some(TecSolution {
            observations,
            receiver_bias,
            shell_factor: self.cfg.shell_factor,
        })
    }
}

/// Computes the slant TEC, and the elevation and vertical TEC when ephemerides
/// are provided, of these observations, in place, with default [Config]
/// and up to `workers` threads. Returns the receiver bias that was removed,
/// None on failure.
pub fn compute_tec_with_bias(
    observations: &mut Vec<Observation>,
    ephemerides: Option<&[Ephemeris]>,
    biases: &BiasMap,
    receiver: &GroundPosition,
    workers: usize,
) -> Option<f64> {
    let cfg = Config::default().with_workers(workers);
    let pipeline = TecPipeline::new(biases, *receiver).with_config(cfg);
    let pipeline = match ephemerides {
        Some(ephemerides) => pipeline.with_ephemerides(ephemerides),
        None => pipeline,
    };
    pipeline.process(observations)
}

/// Computes the slant TEC, and the elevation and vertical TEC when ephemerides
/// are provided, of these observations, in place. Returns true on success.
pub fn compute_tec(
    observations: &mut Vec<Observation>,
    ephemerides: Option<&[Ephemeris]>,
    biases: &BiasMap,
    receiver: &GroundPosition,
    workers: usize,
) -> bool {
    compute_tec_with_bias(observations, ephemerides, biases, receiver, workers).is_some()
}
