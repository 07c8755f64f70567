//! Input products and file type identification
use std::io::BufRead;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bias::BiasMap,
    navigation::Ephemeris,
    observation::ObservationSet,
    prelude::{Error, ParsingError},
    reader::BufferedReader,
};

/// Input file types we support
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FileKind {
    /// RINEX Navigation (GPS broadcast ephemerides)
    Navigation,
    /// RINEX Observation
    Observation,
    /// IONEX, of which we only use the differential code biases
    Bias,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Navigation => write!(f, "NAV DATA"),
            Self::Observation => write!(f, "OBSERVATION DATA"),
            Self::Bias => write!(f, "IONOSPHERE MAPS"),
        }
    }
}

impl std::str::FromStr for FileKind {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("nav") || s.eq("NAVIGATION DATA") || s.contains("NAV DATA") {
            Ok(Self::Navigation)
        } else if s.eq_ignore_ascii_case("obs") || s.eq("OBSERVATION DATA") {
            Ok(Self::Observation)
        } else if s.eq_ignore_ascii_case("bias")
            || s.eq_ignore_ascii_case("ionex")
            || s.eq("IONOSPHERE MAPS")
        {
            Ok(Self::Bias)
        } else {
            Err(ParsingError::TypeParsing(s.to_string()))
        }
    }
}

impl FileKind {
    /// Identifies the file type from its name, using either the short
    /// RINEX V2 convention (ssssdddf.yyt, "t" being the type)
    /// or the long V3 convention (..._MN.rnx). Compression suffix is ignored.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;
        let name = name
            .strip_suffix(".gz")
            .or_else(|| name.strip_suffix(".Z"))
            .unwrap_or(name);

        let (stem, extension) = name.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();

        match extension.as_str() {
            "rnx" => {
                if stem.ends_with('O') {
                    Some(Self::Observation)
                } else if stem.ends_with('N') {
                    Some(Self::Navigation)
                } else {
                    None
                }
            },
            "inx" => Some(Self::Bias),
            _ if extension.len() == 3 => match extension.chars().last() {
                Some('o') => Some(Self::Observation),
                Some('n') => Some(Self::Navigation),
                Some('i') => Some(Self::Bias),
                _ => None,
            },
            _ => None,
        }
    }

    /// Identifies the file type from its first header line
    pub fn from_header_line(line: &str) -> Option<Self> {
        if line.contains("IONEX VERSION / TYPE") {
            return Some(Self::Bias);
        }
        if !line.contains("RINEX VERSION / TYPE") {
            return None;
        }
        match line.get(20..21) {
            Some("O") => Some(Self::Observation),
            Some("N") => Some(Self::Navigation),
            _ => None,
        }
    }

    /// Identifies the file type, from its name first, from its content otherwise
    pub fn guess<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        if let Some(kind) = Self::from_path(&path) {
            return Ok(kind);
        }
        let mut reader = BufferedReader::new(&path)?;
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Self::from_header_line(&line).ok_or(Error::ParsingError(ParsingError::TypeParsing(
            path.as_ref().display().to_string(),
        )))
    }
}

/// Parsed input product
#[derive(Debug, Clone, PartialEq)]
pub enum Product {
    Navigation(Vec<Ephemeris>),
    Observation(ObservationSet),
    Bias(BiasMap),
}

impl Product {
    /// Parses given file with the parser of this [FileKind].
    /// `density` only applies to Observation files.
    pub fn from_file<P: AsRef<Path>>(kind: FileKind, path: P, density: usize) -> Result<Self, Error> {
        match kind {
            FileKind::Navigation => Ok(Self::Navigation(Ephemeris::from_file(path)?)),
            FileKind::Observation => Ok(Self::Observation(ObservationSet::from_file(
                path, density,
            )?)),
            FileKind::Bias => Ok(Self::Bias(BiasMap::from_file(path)?)),
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            Self::Navigation(_) => FileKind::Navigation,
            Self::Observation(_) => FileKind::Observation,
            Self::Bias(_) => FileKind::Bias,
        }
    }

    pub fn as_navigation(&self) -> Option<&[Ephemeris]> {
        match self {
            Self::Navigation(ephemerides) => Some(ephemerides),
            _ => None,
        }
    }

    pub fn as_observation(&self) -> Option<&ObservationSet> {
        match self {
            Self::Observation(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_bias(&self) -> Option<&BiasMap> {
        match self {
            Self::Bias(map) => Some(map),
            _ => None,
        }
    }
}
