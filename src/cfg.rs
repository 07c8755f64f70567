//! TEC pipeline configuration
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn default_gap_factor() -> f64 {
    3.0
}

fn default_cycle_slip_threshold() -> f64 {
    1.0
}

fn default_spread_floor() -> f64 {
    20.0
}

fn default_small_segment_len() -> usize {
    6
}

fn default_outlier_threshold() -> f64 {
    1.0
}

fn default_outlier_percentile() -> f64 {
    0.01
}

fn default_shell_factor() -> f64 {
    0.95
}

fn default_batch_size() -> usize {
    4
}

fn default_workers() -> usize {
    1
}

/// Phase leveling options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelingOpts {
    /// A time gap larger than gap_factor times the median
    /// sampling period starts a new arc
    #[cfg_attr(feature = "serde", serde(default = "default_gap_factor"))]
    pub gap_factor: f64,
    /// A phase TEC jump larger than this value (TECu)
    /// between two consecutive points starts a new arc
    #[cfg_attr(feature = "serde", serde(default = "default_cycle_slip_threshold"))]
    pub cycle_slip_threshold: f64,
    /// Lowest interquartile spread (TECu) accepted on short arcs
    #[cfg_attr(feature = "serde", serde(default = "default_spread_floor"))]
    pub spread_floor: f64,
    /// Arcs shorter than this are considered short
    #[cfg_attr(feature = "serde", serde(default = "default_small_segment_len"))]
    pub small_segment_len: usize,
}

impl Default for LevelingOpts {
    fn default() -> Self {
        Self {
            gap_factor: default_gap_factor(),
            cycle_slip_threshold: default_cycle_slip_threshold(),
            spread_floor: default_spread_floor(),
            small_segment_len: default_small_segment_len(),
        }
    }
}

/// Receiver bias estimation options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverBiasOpts {
    /// Lowest slant TEC is considered an outlier when it lies
    /// further than this (TECu) from the low percentile value
    #[cfg_attr(feature = "serde", serde(default = "default_outlier_threshold"))]
    pub outlier_threshold: f64,
    /// Low percentile rank, within [0, 1]
    #[cfg_attr(feature = "serde", serde(default = "default_outlier_percentile"))]
    pub percentile: f64,
}

impl Default for ReceiverBiasOpts {
    fn default() -> Self {
        Self {
            outlier_threshold: default_outlier_threshold(),
            percentile: default_outlier_percentile(),
        }
    }
}

/// [Config] to the TEC pipeline. [Config::default] matches
/// the standard processing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Phase leveling
    #[cfg_attr(feature = "serde", serde(default))]
    pub leveling: LevelingOpts,
    /// Receiver bias estimation
    #[cfg_attr(feature = "serde", serde(default))]
    pub receiver_bias: ReceiverBiasOpts,
    /// Thin shell mapping factor, that is Re / (Re + H)
    /// of the ionospheric pierce point shell
    #[cfg_attr(feature = "serde", serde(default = "default_shell_factor"))]
    pub shell_factor: f64,
    /// Number of observations processed per vertical conversion batch
    #[cfg_attr(feature = "serde", serde(default = "default_batch_size"))]
    pub batch_size: usize,
    /// Number of worker threads
    #[cfg_attr(feature = "serde", serde(default = "default_workers"))]
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leveling: LevelingOpts::default(),
            receiver_bias: ReceiverBiasOpts::default(),
            shell_factor: default_shell_factor(),
            batch_size: default_batch_size(),
            workers: default_workers(),
        }
    }
}

impl Config {
    /// Copies and returns [Config] with desired number of worker threads.
    pub fn with_workers(&self, workers: usize) -> Self {
        let mut s = *self;
        s.workers = workers.max(1);
        s
    }
    /// Copies and returns [Config] with desired batch size.
    pub fn with_batch_size(&self, size: usize) -> Self {
        let mut s = *self;
        s.batch_size = size.max(1);
        s
    }
    /// Copies and returns [Config] with desired shell factor.
    pub fn with_shell_factor(&self, factor: f64) -> Self {
        let mut s = *self;
        s.shell_factor = factor;
        s
    }
    /// Copies and returns [Config] with desired [LevelingOpts].
    pub fn with_leveling(&self, opts: LevelingOpts) -> Self {
        let mut s = *self;
        s.leveling = opts;
        s
    }
    /// Copies and returns [Config] with desired [ReceiverBiasOpts].
    pub fn with_receiver_bias(&self, opts: ReceiverBiasOpts) -> Self {
        let mut s = *self;
        s.receiver_bias = opts;
        s
    }
}
