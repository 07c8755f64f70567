//! Observation header parsing
use crate::{
    ground_position::GroundPosition,
    header::{field, parse_version},
    prelude::ParsingError,
};

const APPROX_POSITION_MARKER: &str = "APPROX POSITION XYZ";
const TYPES_OF_OBSERV_MARKER: &str = "# / TYPES OF OBSERV";

/// Observation header fields we need
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Header {
    /// Major revision
    pub revision: u8,
    /// Receiver position, None when not provided (null vector)
    pub position: Option<GroundPosition>,
    /// Declared number of observables
    pub num_observables: usize,
    /// Observable codes, in order of appearance
    pub observables: Vec<String>,
}

/// Position of the observables we need, within one satellite record
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Channels {
    pub num_observables: usize,
    pub l1: usize,
    pub l2: usize,
    pub p1: Option<usize>,
    pub c1: Option<usize>,
    pub p2: Option<usize>,
    pub c2: Option<usize>,
}

impl Header {
    /// Parses one header line
    pub fn parse_line(&mut self, line: &str) -> Result<(), ParsingError> {
        if let Some(revision) = parse_version(line) {
            if revision > 2 {
                return Err(ParsingError::NonSupportedRevision(revision));
            }
            self.revision = revision;
        } else if line.contains(APPROX_POSITION_MARKER) {
            let xyz = field(line, 0, 60)
                .split_ascii_whitespace()
                .filter_map(|item| item.parse::<f64>().ok())
                .collect::<Vec<_>>();
            if xyz.len() == 3 {
                let position = GroundPosition::from_ecef_wgs84((xyz[0], xyz[1], xyz[2]));
                if !position.is_null() {
                    self.position = Some(position);
                }
            }
        } else if line.contains(TYPES_OF_OBSERV_MARKER) {
            let count = field(line, 0, 6);
            if !count.is_empty() {
                self.num_observables = count
                    .parse::<usize>()
                    .map_err(|_| ParsingError::ObservablesCount(count.to_string()))?;
            }
            // continuation lines carry a blank count
            for code in field(line, 6, 60).split_ascii_whitespace() {
                if self.observables.len() < self.num_observables {
                    self.observables.push(code.to_string());
                }
            }
        }
        Ok(())
    }

    fn position_of(&self, code: &str) -> Option<usize> {
        self.observables.iter().position(|obs| obs == code)
    }

    /// Locates the observables we need. Fails when either phase is missing,
    /// or when one frequency has no pseudo range.
    pub fn channels(&self) -> Result<Channels, ParsingError> {
        let l1 = self.position_of("L1").ok_or(ParsingError::MissingPhase)?;
        let l2 = self.position_of("L2").ok_or(ParsingError::MissingPhase)?;

        let (p1, c1) = (self.position_of("P1"), self.position_of("C1"));
        if p1.is_none() && c1.is_none() {
            return Err(ParsingError::MissingFirstRange);
        }

        let (p2, c2) = (self.position_of("P2"), self.position_of("C2"));
        if p2.is_none() && c2.is_none() {
            return Err(ParsingError::MissingSecondRange);
        }

        Ok(Channels {
            num_observables: self.observables.len(),
            l1,
            l2,
            p1,
            c1,
            p2,
            c2,
        })
    }
}
