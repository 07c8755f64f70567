//! Navigation record parsing
use crate::{
    epoch::parse_in_gpst,
    header::field,
    navigation::Ephemeris,
    prelude::{Constellation, ParsingError, SV},
};

/// Orbit words are 19 character long
const WORD_LEN: usize = 19;

/// Minimal number of lines of a record we can work with:
/// epoch line and the first five orbit lines
const MIN_RECORD_LEN: usize = 6;

/// Returns the number of lines of the record starting with this line
pub(crate) fn record_size(first_line: &str, revision: u8) -> usize {
    if revision < 3 {
        return 8;
    }
    match first_line.chars().next() {
        Some('R') | Some('S') => 4,
        _ => 8,
    }
}

/// Parses one orbit word, in fortran notation (1.0D-05)
pub(crate) fn parse_float(content: &str) -> Result<f64, ParsingError> {
    let content = content.trim();
    content
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| ParsingError::FloatParsing(content.to_string()))
}

/// Parses the 4 words of one orbit line
fn orbit_words(line: &str, revision: u8) -> Result<[f64; 4], ParsingError> {
    let offset = if revision < 3 { 3 } else { 4 };
    let mut words = [0.0_f64; 4];
    for (i, word) in words.iter_mut().enumerate() {
        let start = offset + i * WORD_LEN;
        *word = parse_float(field(line, start, start + WORD_LEN))?;
    }
    Ok(words)
}

/// Parses the first word of one orbit line only
fn first_orbit_word(line: &str, revision: u8) -> Result<f64, ParsingError> {
    let offset = if revision < 3 { 3 } else { 4 };
    parse_float(field(line, offset, offset + WORD_LEN))
}

/// Parses one Navigation record. Returns None for other constellations.
pub(crate) fn parse_record(
    lines: &[String],
    revision: u8,
) -> Result<Option<Ephemeris>, ParsingError> {
    let first = lines.first().ok_or(ParsingError::TruncatedRecord)?;

    let (sv, epoch) = if revision < 3 {
        let prn = field(first, 0, 2);
        let prn = prn
            .parse::<u8>()
            .map_err(|_| ParsingError::PrnParsing(prn.to_string()))?;
        let epoch = parse_in_gpst(field(first, 2, 22))?;
        (SV::new(Constellation::GPS, prn), epoch)
    } else {
        let sv = field(first, 0, 3);
        if !sv.starts_with('G') {
            return Ok(None);
        }
        let prn = sv[1..]
            .trim()
            .parse::<u8>()
            .map_err(|_| ParsingError::PrnParsing(sv.to_string()))?;
        let epoch = parse_in_gpst(field(first, 4, 23))?;
        (SV::new(Constellation::GPS, prn), epoch)
    };

    if sv.prn == 0 || sv.prn > crate::constants::MAX_PRN {
        return Err(ParsingError::PrnParsing(sv.to_string()));
    }

    if lines.len() < MIN_RECORD_LEN {
        return Err(ParsingError::TruncatedRecord);
    }

    let [_iode, crs, dn, m0] = orbit_words(&lines[1], revision)?;
    let [cuc, e, cus, sqrt_a] = orbit_words(&lines[2], revision)?;
    let [toe, cic, omega0, cis] = orbit_words(&lines[3], revision)?;
    let [i0, crc, omega, omega_dot] = orbit_words(&lines[4], revision)?;
    let idot = first_orbit_word(&lines[5], revision)?;

    Ok(Some(Ephemeris {
        sv,
        epoch,
        toe,
        a: sqrt_a * sqrt_a,
        e,
        i0,
        idot,
        omega0,
        omega_dot,
        omega,
        m0,
        dn,
        cuc,
        cus,
        crc,
        crs,
        cic,
        cis,
    }))
}
