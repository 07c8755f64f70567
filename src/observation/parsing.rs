//! Observation body parsing (RINEX V2)
#[cfg(feature = "log")]
use log::{error, warn};

use crate::{
    constants::MAX_PRN,
    epoch::parse_in_gpst,
    header::field,
    observation::{header::Channels, Observation},
    prelude::{Constellation, Epoch, ParsingError, SV},
};

/// Epoch description is 26 byte long
const EPOCH_SIZE: usize = 26;
/// Epoch flag: [26..29]
const FLAG_OFFSET: usize = 26;
/// Number of satellites: [29..32]
const NUMSAT_OFFSET: usize = 29;
/// Satellites list starts at this position
const SATELLITES_OFFSET: usize = 32;
/// SVNN standard
const SVNN_SIZE: usize = 3;
/// Maximal number of satellites on a single line
const MAX_SATELLITES_LINE: usize = 12;
/// Maximal number of observables on a single line
const MAX_OBSERVABLES_LINE: usize = 5;
/// Observable value (F14.3)
const OBSERVABLE_F14_WIDTH: usize = 14;
/// Value + LLI + SNR
const OBSERVABLE_WIDTH: usize = 16;

/// Epoch description
#[derive(Debug, Clone, PartialEq)]
struct EpochLine {
    epoch: Result<Epoch, ParsingError>,
    flag: u8,
    numsat: usize,
}

fn parse_epoch_line(line: &str) -> Result<EpochLine, ParsingError> {
    let flag = field(line, FLAG_OFFSET, NUMSAT_OFFSET);
    let flag = if flag.is_empty() {
        0
    } else {
        flag.parse::<u8>()
            .map_err(|_| ParsingError::EpochParsing(line.to_string()))?
    };

    let numsat = field(line, NUMSAT_OFFSET, SATELLITES_OFFSET)
        .parse::<usize>()
        .map_err(|_| ParsingError::NumSatParsing)?;

    Ok(EpochLine {
        epoch: parse_in_gpst(field(line, 0, EPOCH_SIZE)),
        flag,
        numsat,
    })
}

/// Parses one SVNN descriptor. Blank constellation means GPS.
/// Returns None for other constellations.
fn parse_sv(content: &str) -> Result<Option<SV>, ParsingError> {
    let content = content.trim();
    let (gps, prn) = match content.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => (c == 'G', content[1..].trim()),
        Some(_) => (true, content),
        None => return Err(ParsingError::PrnParsing(content.to_string())),
    };
    let prn = prn
        .parse::<u8>()
        .map_err(|_| ParsingError::PrnParsing(content.to_string()))?;
    if !gps {
        return Ok(None);
    }
    if prn == 0 || prn > MAX_PRN {
        return Err(ParsingError::PrnParsing(content.to_string()));
    }
    Ok(Some(SV::new(Constellation::GPS, prn)))
}

/// Parses one F14.3 observable, None when blank or invalid
fn parse_observable(content: &str) -> Option<f64> {
    if content.is_empty() {
        None
    } else {
        content.parse::<f64>().ok()
    }
}

/// Returns the value of given observable, if it is present and not null
fn non_null(values: &[Option<f64>], index: Option<usize>) -> Option<f64> {
    let value = values.get(index?).copied().flatten()?;
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

/// Builds the [Observation] from the observables of one satellite.
/// Returns None when a phase is missing or null (loss of lock) or
/// when no pseudo range pair is available.
pub(crate) fn build_observation(
    sv: SV,
    epoch: Epoch,
    values: &[Option<f64>],
    channels: &Channels,
) -> Option<Observation> {
    let l1 = non_null(values, Some(channels.l1))?;
    let l2 = non_null(values, Some(channels.l2))?;

    let (p1, c1) = (non_null(values, channels.p1), non_null(values, channels.c1));
    let (p2, c2) = (non_null(values, channels.p2), non_null(values, channels.c2));

    let (range2, range1) = match (p2, p1, c1, c2) {
        (Some(p2), Some(p1), _, _) => (p2, p1),
        (Some(p2), _, Some(c1), _) => (p2, c1),
        (_, _, Some(c1), Some(c2)) => (c2, c1),
        _ => return None,
    };

    Some(Observation::from_measurements(
        sv, epoch, l1, l2, range2, range1,
    ))
}

/// Parses the Observation body, keeping one data epoch out of `density`.
/// Lines of skipped epochs are consumed.
pub(crate) fn parse_body<I: Iterator<Item = String>>(
    lines: &mut I,
    channels: &Channels,
    density: usize,
) -> Vec<Observation> {
    let lines_per_sat = channels.num_observables.div_ceil(MAX_OBSERVABLES_LINE).max(1);

    let mut observations = Vec::<Observation>::with_capacity(1024);
    let mut epoch_count = 0_usize;

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        let desc = match parse_epoch_line(&line) {
            Ok(desc) => desc,
            #[cfg(feature = "log")]
            Err(e) => {
                warn!("invalid epoch description \"{}\": {}", line.trim_end(), e);
                continue;
            },
            #[cfg(not(feature = "log"))]
            Err(_) => continue,
        };

        match desc.flag {
            0 | 1 | 6 => {},
            _ => {
                // special events: numsat header lines follow
                for _ in 0..desc.numsat {
                    if lines.next().is_none() {
                        return observations;
                    }
                }
                continue;
            },
        }

        // satellites list, possibly continued
        let mut svnn = Vec::<String>::with_capacity(desc.numsat);
        let mut content = line;
        loop {
            let mut offset = SATELLITES_OFFSET;
            let line_end = SATELLITES_OFFSET + MAX_SATELLITES_LINE * SVNN_SIZE;
            while svnn.len() < desc.numsat && offset < line_end {
                svnn.push(field(&content, offset, offset + SVNN_SIZE).to_string());
                offset += SVNN_SIZE;
            }
            if svnn.len() >= desc.numsat {
                break;
            }
            match lines.next() {
                Some(next) => content = next,
                None => return observations,
            }
        }

        // data epochs are subsampled
        let keep = if desc.flag == 6 {
            false
        } else {
            epoch_count += 1;
            epoch_count % density == 0
        };

        let epoch = match desc.epoch {
            Ok(epoch) => Some(epoch),
            #[cfg(feature = "log")]
            Err(e) => {
                warn!("epoch skipped: {}", e);
                None
            },
            #[cfg(not(feature = "log"))]
            Err(_) => None,
        };

        for sv in svnn.iter() {
            let mut values = Vec::<Option<f64>>::with_capacity(channels.num_observables);
            for _ in 0..lines_per_sat {
                let content = match lines.next() {
                    Some(content) => content,
                    None => {
                        #[cfg(feature = "log")]
                        error!("{}", ParsingError::TruncatedRecord);
                        return observations;
                    },
                };
                if !keep || epoch.is_none() {
                    continue;
                }
                for k in 0..MAX_OBSERVABLES_LINE {
                    if values.len() == channels.num_observables {
                        break;
                    }
                    let start = k * OBSERVABLE_WIDTH;
                    values.push(parse_observable(field(
                        &content,
                        start,
                        start + OBSERVABLE_F14_WIDTH,
                    )));
                }
            }

            let epoch = match epoch {
                Some(epoch) if keep => epoch,
                _ => continue,
            };

            let sv = match parse_sv(sv) {
                Ok(Some(sv)) => sv,
                Ok(None) => continue, // other constellation
                #[cfg(feature = "log")]
                Err(e) => {
                    warn!("{}: {}", epoch, e);
                    continue;
                },
                #[cfg(not(feature = "log"))]
                Err(_) => continue,
            };

            if let Some(obs) = build_observation(sv, epoch, &values, channels) {
                observations.push(obs);
            }
        }
    }

    observations
}
