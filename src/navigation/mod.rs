//! Navigation RINEX: GPS broadcast ephemerides
use std::io::BufRead;
use std::path::Path;

#[cfg(feature = "log")]
use log::{debug, error, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    header::{is_header_end, parse_version},
    prelude::{Epoch, Error, ParsingError, SV},
    reader::{lossy_lines, BufferedReader},
};

mod kepler;
mod parsing;

pub use kepler::{nearest_ephemeris, solve_kepler};

/// GPS broadcast [Ephemeris], as decoded from one Navigation record.
/// Immutable once parsed. [Ephemeris] are ordered by satellite then time,
/// which is the order expected by [nearest_ephemeris].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ephemeris {
    /// Satellite
    pub sv: SV,
    /// Broadcast epoch (time of clock), in GPST
    pub epoch: Epoch,
    /// Time of ephemeris, in seconds of GPS week
    pub toe: f64,
    /// Semi major axis (m), that is the square of the broadcast sqrt(a)
    pub a: f64,
    /// Eccentricity
    pub e: f64,
    /// Inclination at reference time (rad)
    pub i0: f64,
    /// Rate of inclination angle (rad.s⁻¹)
    pub idot: f64,
    /// Longitude of ascending node at weekly epoch (rad)
    pub omega0: f64,
    /// Rate of right ascension (rad.s⁻¹)
    pub omega_dot: f64,
    /// Argument of perigee (rad)
    pub omega: f64,
    /// Mean anomaly at reference time (rad)
    pub m0: f64,
    /// Mean motion correction (rad.s⁻¹)
    pub dn: f64,
    /// Argument of latitude harmonic corrections (rad)
    pub cuc: f64,
    pub cus: f64,
    /// Orbit radius harmonic corrections (m)
    pub crc: f64,
    pub crs: f64,
    /// Inclination harmonic corrections (rad)
    pub cic: f64,
    pub cis: f64,
}

impl Eq for Ephemeris {}

impl PartialOrd for Ephemeris {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ephemeris {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.sv, self.epoch).cmp(&(other.sv, other.epoch))
    }
}

impl Ephemeris {
    /// Parses all GPS [Ephemeris] contained in a Navigation file.
    /// Supports RINEX V2 and V3 and gzip compressed files when built with
    /// the `flate2` feature. Malformed records are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, Error> {
        let reader = BufferedReader::new(path)?;
        Self::from_reader(reader)
    }

    /// [Self::from_file] from any [BufRead]able content.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, Error> {
        let mut revision = 2;
        let mut header_end = false;
        let mut body = Vec::<String>::new();

        for line in lossy_lines(reader) {
            let line = line?;
            if !header_end {
                if let Some(major) = parse_version(&line) {
                    revision = major;
                }
                header_end = is_header_end(&line);
                continue;
            }
            if !line.trim().is_empty() {
                body.push(line);
            }
        }

        if !header_end {
            return Err(Error::ParsingError(ParsingError::MissingHeaderTerminator));
        }

        let mut ephemerides = Vec::with_capacity(body.len() / 8);
        let mut offset = 0;

        while offset < body.len() {
            let size = parsing::record_size(&body[offset], revision).min(body.len() - offset);
            let record = &body[offset..offset + size];
            offset += size;

            match parsing::parse_record(record, revision) {
                Ok(Some(eph)) => ephemerides.push(eph),
                Ok(None) => {}, // other constellation
                #[cfg(feature = "log")]
                Err(e) => warn!("skipped navigation record \"{}\": {}", record[0].trim(), e),
                #[cfg(not(feature = "log"))]
                Err(_) => {},
            }
        }

        #[cfg(feature = "log")]
        debug!("parsed {} ephemerides (V{})", ephemerides.len(), revision);

        Ok(ephemerides)
    }
}

/// Parses all GPS [Ephemeris] in given Navigation file.
/// Failures are not fatal: an unreadable or invalid file
/// simply results in no ephemeris.
pub fn parse_navigation<P: AsRef<Path>>(path: P) -> Vec<Ephemeris> {
    match Ephemeris::from_file(path) {
        Ok(ephemerides) => ephemerides,
        #[cfg(feature = "log")]
        Err(e) => {
            error!("navigation file parsing: {}", e);
            Vec::new()
        },
        #[cfg(not(feature = "log"))]
        Err(_) => Vec::new(),
    }
}
