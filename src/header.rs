//! Header and fixed column helpers shared by all file formats

pub(crate) const HEADER_END_MARKER: &str = "END OF HEADER";

const VERSION_MARKER: &str = "RINEX VERSION / TYPE";

/// Returns the trimmed content in between given columns,
/// tolerating short lines.
pub(crate) fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("").trim()
}

/// Returns true if this line terminates the header section
pub(crate) fn is_header_end(line: &str) -> bool {
    line.contains(HEADER_END_MARKER)
}

/// Returns the major revision number, if this is the version header line
pub(crate) fn parse_version(line: &str) -> Option<u8> {
    if !line.contains(VERSION_MARKER) {
        return None;
    }
    let version = line.get(0..9).unwrap_or(line).trim();
    let major = version.split('.').next()?;
    major.trim().parse::<u8>().ok()
}
