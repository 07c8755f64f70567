//! Satellite differential code biases, as distributed in IONEX files
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

#[cfg(feature = "log")]
use log::{debug, error, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Carrier, MAX_PRN},
    prelude::Error,
    reader::{lossy_lines, BufferedReader},
};

/// Marks the beginning of the bias block
const DCB_MARKER: &str = "DIFFERENTIAL CODE BIASES";

const COMMENT_MARKER: &str = "COMMENT";

/// One line of the bias block
#[derive(Debug, Clone, Copy, PartialEq)]
enum BiasLine {
    /// GPS satellite bias (ns)
    Bias(u8, f64),
    /// Valid line that we do not use (other constellation, comment)
    Ignored,
    /// Anything else terminates the block
    EndOfBlock,
}

fn parse_bias_line(line: &str) -> BiasLine {
    if line.contains(COMMENT_MARKER) {
        return BiasLine::Ignored;
    }

    let mut items = line.split_ascii_whitespace();
    let (id, bias) = match (items.next(), items.next()) {
        (Some(id), Some(bias)) => (id, bias),
        _ => return BiasLine::EndOfBlock,
    };

    let bias = match bias.parse::<f64>() {
        Ok(bias) => bias,
        Err(_) => return BiasLine::EndOfBlock,
    };

    if let Ok(prn) = id.parse::<u8>() {
        return BiasLine::Bias(prn, bias);
    }

    match id.chars().next() {
        Some('G') => match id.get(1..3).and_then(|prn| prn.parse::<u8>().ok()) {
            Some(prn) => BiasLine::Bias(prn, bias),
            None => BiasLine::EndOfBlock,
        },
        Some(c) if c.is_ascii_uppercase() && id.len() == 3 => {
            // other constellation
            if id[1..].parse::<u8>().is_ok() {
                BiasLine::Ignored
            } else {
                BiasLine::EndOfBlock
            }
        },
        _ => BiasLine::EndOfBlock,
    }
}

/// Satellite differential code biases, in TECu, indexed by PRN.
/// Unknown satellites have no bias.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BiasMap(BTreeMap<u8, f64>);

impl BiasMap {
    /// Builds an empty [BiasMap]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the bias (TECu) of given PRN, replacing any previous value
    pub fn insert(&mut self, prn: u8, bias_tecu: f64) {
        self.0.insert(prn, bias_tecu);
    }

    /// Stores the bias of given PRN, expressed in nanoseconds
    pub fn insert_nanos(&mut self, prn: u8, bias_ns: f64) {
        self.insert(prn, bias_ns * Carrier::NANOS_TO_TEC);
    }

    /// Returns the bias (TECu) of given PRN, 0 when unknown
    pub fn get(&self, prn: u8) -> f64 {
        self.0.get(&prn).copied().unwrap_or(0.0)
    }

    /// Returns true if a bias was provided for given PRN
    pub fn contains(&self, prn: u8) -> bool {
        self.0.contains_key(&prn)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates (PRN, bias) by increasing PRN
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.0.iter().map(|(prn, bias)| (*prn, *bias))
    }

    /// Parses the bias block of an IONEX file.
    /// Gzip compressed files are supported with the `flate2` feature.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let reader = BufferedReader::new(path)?;
        Self::from_reader(reader)
    }

    /// [Self::from_file] from any [BufRead]able content.
    /// The block starts after the marker line and ends on
    /// the first line that is not a satellite bias.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut map = Self::new();
        let mut in_block = false;

        for line in lossy_lines(reader) {
            let line = line?;
            if !in_block {
                in_block = line.contains(DCB_MARKER);
                continue;
            }
            match parse_bias_line(&line) {
                BiasLine::Bias(prn, bias) => {
                    if prn == 0 || prn > MAX_PRN {
                        #[cfg(feature = "log")]
                        warn!("bias: invalid prn {}", prn);
                        continue;
                    }
                    map.insert_nanos(prn, bias);
                },
                BiasLine::Ignored => {},
                BiasLine::EndOfBlock => break,
            }
        }

        #[cfg(feature = "log")]
        debug!("parsed {} satellite biases", map.len());

        Ok(map)
    }
}

impl FromIterator<(u8, f64)> for BiasMap {
    /// Collects (PRN, bias in TECu) pairs
    fn from_iter<T: IntoIterator<Item = (u8, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses satellite biases from given IONEX file.
/// An unreadable file results in an empty map, that is: no bias correction.
pub fn parse_biases<P: AsRef<Path>>(path: P) -> BiasMap {
    match BiasMap::from_file(path) {
        Ok(map) => map,
        #[cfg(feature = "log")]
        Err(e) => {
            error!("bias file parsing: {}", e);
            BiasMap::default()
        },
        #[cfg(not(feature = "log"))]
        Err(_) => BiasMap::default(),
    }
}
