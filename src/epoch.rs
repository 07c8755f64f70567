use crate::prelude::{Epoch, ParsingError, TimeScale};

/// Parses "YY MM DD HH MM SS.SSSSSSS" (or "YYYY ..") description,
/// as found in Navigation and Observation records, into a GPST [Epoch].
/// Two digit years below 80 belong to the 21st century.
pub(crate) fn parse_in_gpst(content: &str) -> Result<Epoch, ParsingError> {
    let err = || ParsingError::EpochParsing(content.trim().to_string());

    let items = content.split_ascii_whitespace().collect::<Vec<_>>();
    if items.len() != 6 {
        return Err(err());
    }

    let mut y = items[0].parse::<i32>().map_err(|_| err())?;
    if items[0].len() < 3 {
        if y < 80 {
            y += 2000;
        } else {
            y += 1900;
        }
    }

    let m = items[1].parse::<u8>().map_err(|_| err())?;
    let d = items[2].parse::<u8>().map_err(|_| err())?;
    let hh = items[3].parse::<u8>().map_err(|_| err())?;
    let mm = items[4].parse::<u8>().map_err(|_| err())?;

    let secs = items[5].parse::<f64>().map_err(|_| err())?;
    if !(0.0..61.0).contains(&secs) {
        return Err(err());
    }

    let ss = secs.trunc() as u8;
    let nanos = ((secs.fract() * 1.0E9).round() as u32).min(999_999_999);

    Epoch::maybe_from_gregorian(y, m, d, hh, mm, ss, nanos, TimeScale::GPST).map_err(|_| err())
}

/// Returns GPS time of week, in seconds, of given [Epoch]
pub(crate) fn time_of_week(t: Epoch) -> f64 {
    let (_, nanos) = t.to_time_scale(TimeScale::GPST).to_time_of_week();
    nanos as f64 / 1.0E9
}
