//! Observation RINEX: dual frequency GPS phase and code measurements
use std::io::BufRead;
use std::path::Path;

#[cfg(feature = "log")]
use log::{debug, error, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use itertools::Itertools;
use rayon::prelude::*;

use crate::{
    constants::Carrier,
    ground_position::GroundPosition,
    header::is_header_end,
    prelude::{Epoch, Error, ParsingError, SV},
    reader::{lossy_lines, BufferedReader},
    tec::inverse_mapping_function,
};

mod header;
mod parsing;

use header::Header;

/// Vertical TEC of one [Observation]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VerticalTec {
    /// Vertical TEC (TECu)
    Value(f64),
    /// Conversion failed for the batch this observation belonged to
    Invalid,
}

impl VerticalTec {
    /// Returns the vertical TEC value, if valid
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Invalid => None,
        }
    }
}

/// One dual frequency [Observation] of one satellite at one epoch.
/// Parsing populates the raw quantities, the TEC pipeline populates
/// the others as it progresses.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Sampling instant, in GPST
    pub epoch: Epoch,
    /// Satellite
    pub sv: SV,
    /// Code (pseudo range) TEC: absolute but noisy (TECu)
    pub differential_range: f64,
    /// Phase TEC: precise but ambiguous (TECu)
    pub phase: f64,
    /// Satellite elevation (degrees)
    pub elevation: Option<f64>,
    /// Leveled slant TEC (TECu)
    pub slant_tec: Option<f64>,
    /// Leveling error estimate (TECu)
    pub tec_error: Option<f64>,
    /// Vertical TEC (TECu)
    pub vertical_tec: Option<VerticalTec>,
}

impl Eq for Observation {}

impl PartialOrd for Observation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Observations sort by satellite, then time
impl Ord for Observation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.sv, self.epoch).cmp(&(other.sv, other.epoch))
    }
}

impl Observation {
    /// Builds a new [Observation] from TEC quantities
    pub fn new(sv: SV, epoch: Epoch, differential_range: f64, phase: f64) -> Self {
        Self {
            epoch,
            sv,
            differential_range,
            phase,
            elevation: None,
            slant_tec: None,
            tec_error: None,
            vertical_tec: None,
        }
    }

    /// Builds a new [Observation] from raw measurements: L1 and L2 phase (cycles)
    /// and the pseudo ranges (m) on the second and first frequency.
    pub fn from_measurements(
        sv: SV,
        epoch: Epoch,
        l1: f64,
        l2: f64,
        range2: f64,
        range1: f64,
    ) -> Self {
        let differential_range =
            (range2 - range1) * Carrier::METERS_TO_TEC * Carrier::F2_F1_FACTOR;
        let phase = (l1 * Carrier::L1_WAVELENGTH - l2 * Carrier::L2_WAVELENGTH)
            * Carrier::F2_F1_FACTOR
            * Carrier::METERS_TO_TEC;
        Self::new(sv, epoch, differential_range, phase)
    }

    /// Returns true once phase leveling produced a slant TEC
    pub fn is_leveled(&self) -> bool {
        self.slant_tec.is_some()
    }

    /// Returns the vertical TEC, if it was successfully computed
    pub fn vertical_tec_value(&self) -> Option<f64> {
        self.vertical_tec.and_then(|v| v.value())
    }

    /// Returns the value to display: vertical TEC when available,
    /// slant TEC otherwise.
    pub fn displayed_tec(&self) -> Option<f64> {
        self.vertical_tec_value().or(self.slant_tec)
    }

    /// (Re)computes the vertical TEC from the slant TEC and elevation,
    /// for given thin shell factor. Does nothing if either is unknown.
    pub fn apply_mapping_function(&mut self, shell_factor: f64) {
        if let (Some(slant), Some(elevation)) = (self.slant_tec, self.elevation) {
            self.vertical_tec = Some(VerticalTec::Value(
                slant * inverse_mapping_function(elevation, shell_factor),
            ));
        }
    }
}

/// Content of one Observation file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    /// Receiver position, when the header provides one
    pub receiver_position: Option<GroundPosition>,
    /// Observations, in order of appearance
    pub observations: Vec<Observation>,
}

impl ObservationSet {
    /// Parses an Observation file, keeping one epoch out of `density`.
    /// Only RINEX V2 is supported. Gzip compressed files are supported
    /// when built with the `flate2` feature.
    pub fn from_file<P: AsRef<Path>>(path: P, density: usize) -> Result<Self, Error> {
        let reader = BufferedReader::new(path)?;
        Self::from_reader(reader, density)
    }

    /// [Self::from_file] from any [BufRead]able content.
    pub fn from_reader<R: BufRead>(reader: R, density: usize) -> Result<Self, Error> {
        let mut lines = lossy_lines(reader);
        let mut header = Header::default();
        let mut header_end = false;

        for line in lines.by_ref() {
            let line = line?;
            if is_header_end(&line) {
                header_end = true;
                break;
            }
            header.parse_line(&line)?;
        }

        if !header_end {
            return Err(Error::ParsingError(ParsingError::MissingHeaderTerminator));
        }

        let channels = header.channels()?;

        let body = lines.collect::<Result<Vec<_>, _>>()?;
        let observations =
            parsing::parse_body(&mut body.into_iter(), &channels, density.max(1));

        #[cfg(feature = "log")]
        debug!(
            "parsed {} observations ({} observables, density {})",
            observations.len(),
            channels.num_observables,
            density.max(1)
        );

        Ok(Self {
            receiver_position: header.position,
            observations,
        })
    }

    /// Returns the satellites observed in this set, sorted by PRN
    pub fn satellites(&self) -> Vec<SV> {
        self.observations
            .iter()
            .map(|obs| obs.sv)
            .unique()
            .sorted()
            .collect()
    }

    /// Returns the sampling instants of this set, in chronological order
    pub fn epochs(&self) -> Vec<Epoch> {
        self.observations
            .iter()
            .map(|obs| obs.epoch)
            .unique()
            .sorted()
            .collect()
    }

    /// Appends other [ObservationSet]. Our receiver position prevails.
    pub fn merge_mut(&mut self, rhs: Self) {
        if self.receiver_position.is_none() {
            self.receiver_position = rhs.receiver_position;
        }
        self.observations.extend(rhs.observations);
    }
}

/// Parses an Observation file, keeping one epoch out of `density`.
/// Returns None when the file cannot be read or lacks required observables.
pub fn parse_observations<P: AsRef<Path>>(path: P, density: usize) -> Option<ObservationSet> {
    match ObservationSet::from_file(path, density) {
        Ok(set) => Some(set),
        #[cfg(feature = "log")]
        Err(e) => {
            error!("observation file parsing: {}", e);
            None
        },
        #[cfg(not(feature = "log"))]
        Err(_) => None,
    }
}

/// Parses several Observation files using up to `workers` threads,
/// and concatenates their content in the order of the provided paths.
/// The receiver position is that of the first file providing one.
/// Files that fail to parse are skipped. Returns None if all of them fail.
pub fn parse_observation_files<P: AsRef<Path> + Sync>(
    paths: &[P],
    density: usize,
    workers: usize,
) -> Option<ObservationSet> {
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
    {
        Ok(pool) => pool,
        #[cfg(feature = "log")]
        Err(e) => {
            error!("failed to build thread pool: {}", e);
            return None;
        },
        #[cfg(not(feature = "log"))]
        Err(_) => return None,
    };

    let sets = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let set = parse_observations(path, density);
                if set.is_none() {
                    #[cfg(feature = "log")]
                    warn!("skipped \"{}\"", path.as_ref().display());
                }
                set
            })
            .collect::<Vec<_>>()
    });

    sets.into_iter()
        .flatten()
        .reduce(|mut acc, set| {
            acc.merge_mut(set);
            acc
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::{Constellation, TimeScale};
    #[test]
    fn raw_combinations() {
        let sv = SV::new(Constellation::GPS, 1);
        let t = Epoch::from_gregorian(2021, 1, 1, 0, 0, 0, 0, TimeScale::GPST);
        let obs = Observation::from_measurements(sv, t, 100.0, 50.0, 20_000_010.0, 20_000_000.0);
        assert!((obs.differential_range - 10.0 * 6.158 * 1.545727).abs() < 1.0E-6);
        let l1 = 3.0E8 / (154.0 * 10.23E6);
        let l2 = 3.0E8 / (120.0 * 10.23E6);
        let phase = (100.0 * l1 - 50.0 * l2) * 1.545727 * 6.158;
        assert!((obs.phase - phase).abs() < 1.0E-9);
        assert!(!obs.is_leveled());
        assert!(obs.displayed_tec().is_none());
    }
    #[test]
    fn mapping_function_application() {
        let sv = SV::new(Constellation::GPS, 1);
        let t = Epoch::from_gregorian(2021, 1, 1, 0, 0, 0, 0, TimeScale::GPST);
        let mut obs = Observation::new(sv, t, 0.0, 0.0);
        obs.apply_mapping_function(0.95);
        assert!(obs.vertical_tec.is_none());
        obs.slant_tec = Some(10.0);
        assert_eq!(obs.displayed_tec(), Some(10.0));
        obs.elevation = Some(90.0);
        obs.apply_mapping_function(0.95);
        assert!((obs.vertical_tec_value().unwrap() - 10.0).abs() < 1.0E-12);
        obs.elevation = Some(30.0);
        obs.apply_mapping_function(0.95);
        let expected = 10.0 * (1.0 - (0.95 * 30.0_f64.to_radians().cos()).powi(2)).sqrt();
        assert!((obs.displayed_tec().unwrap() - expected).abs() < 1.0E-12);
        obs.vertical_tec = Some(VerticalTec::Invalid);
        assert_eq!(obs.displayed_tec(), Some(10.0));
    }
    #[test]
    fn ordering() {
        let t0 = Epoch::from_gregorian(2021, 1, 1, 0, 0, 0, 0, TimeScale::GPST);
        let t1 = Epoch::from_gregorian(2021, 1, 1, 0, 0, 30, 0, TimeScale::GPST);
        let g01 = SV::new(Constellation::GPS, 1);
        let g02 = SV::new(Constellation::GPS, 2);
        let mut obs = vec![
            Observation::new(g02, t0, 0.0, 0.0),
            Observation::new(g01, t1, 0.0, 0.0),
            Observation::new(g01, t0, 0.0, 0.0),
        ];
        obs.sort();
        assert_eq!((obs[0].sv, obs[0].epoch), (g01, t0));
        assert_eq!((obs[1].sv, obs[1].epoch), (g01, t1));
        assert_eq!((obs[2].sv, obs[2].epoch), (g02, t0));
    }
}
