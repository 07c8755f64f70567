use thiserror::Error;

/// Errors that may rise in Parsing process
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    /// File does not contain the END OF HEADER marker
    #[error("missing end of header marker")]
    MissingHeaderTerminator,
    /// Only RINEX V2 Observations are supported
    #[error("non supported revision {0}")]
    NonSupportedRevision(u8),
    /// Invalid number of observables in the header
    #[error("invalid number of observables \"{0}\"")]
    ObservablesCount(String),
    /// L1 or L2 phase observable not declared
    #[error("missing L1 or L2 phase observable")]
    MissingPhase,
    /// No pseudo range on the first frequency
    #[error("missing P1 or C1 pseudo range")]
    MissingFirstRange,
    /// No pseudo range on the second frequency
    #[error("missing P2 or C2 pseudo range")]
    MissingSecondRange,
    /// Error when parsing Date/Time in general
    #[error("invalid epoch \"{0}\"")]
    EpochParsing(String),
    /// Invalid number of satellites in epoch description
    #[error("invalid number of satellites")]
    NumSatParsing,
    /// Invalid or non GPS satellite identifier
    #[error("invalid satellite \"{0}\"")]
    PrnParsing(String),
    /// Invalid floating point field
    #[error("invalid float field \"{0}\"")]
    FloatParsing(String),
    /// File ended in the middle of a record
    #[error("truncated record")]
    TruncatedRecord,
    /// Unknown file type
    #[error("unknown file type \"{0}\"")]
    TypeParsing(String),
    /// Compressed file but crate built without gzip support
    #[error("gzip compressed data requires the flate2 feature")]
    GzipNotSupported,
}

/// Errors that may rise when interacting with files
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error")]
    IoError(#[from] std::io::Error),
    #[error("parsing error")]
    ParsingError(#[from] ParsingError),
}
