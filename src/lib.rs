#![doc(html_logo_url = "https://raw.githubusercontent.com/georust/meta/master/logo/logo.png")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::type_complexity)]

/*
 * GNSS-TEC is part of the Geo-Rust framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * (cf. https://github.com/georust/rinex/graphs/contributors)
 * This framework is shipped under both Apache-2.0 and MIT License.
 *
 * Documentation: https://github.com/georust/rinex
 */

//! Ionospheric Total Electron Content (TEC) estimation
//! from dual frequency GPS observations.
//!
//! The crate parses RINEX Navigation and Observation files
//! and IONEX differential code biases, then levels the carrier
//! phase TEC on the code TEC, removes the satellite and receiver
//! biases and maps the slant TEC to the vertical.
//!
//! ```no_run
//! use gnss_tec::prelude::*;
//!
//! let ephemerides = parse_navigation("brdc0010.21n");
//! let biases = parse_biases("codg0010.21i");
//! let set = parse_observations("mahl0010.21o", 1).unwrap();
//!
//! let mut observations = set.observations;
//! let receiver = set.receiver_position.unwrap();
//! let ok = compute_tec(&mut observations, Some(ephemerides.as_slice()), &biases, &receiver, 4);
//! assert!(ok);
//! ```

extern crate gnss_rs as gnss;

pub mod bias;
pub mod cfg;
pub mod navigation;
pub mod observation;
pub mod product;
pub mod tec;

mod constants;
mod epoch;
mod error;
mod ground_position;
mod header;
mod reader;

#[cfg(test)]
mod tests;

/// Package to include all basic structures
pub mod prelude {
    pub use crate::bias::{parse_biases, BiasMap};
    pub use crate::cfg::Config;
    pub use crate::error::{Error, ParsingError};
    pub use crate::ground_position::GroundPosition;
    pub use crate::navigation::{parse_navigation, Ephemeris};
    pub use crate::observation::{
        parse_observation_files, parse_observations, Observation, ObservationSet, VerticalTec,
    };
    pub use crate::product::{FileKind, Product};
    pub use crate::tec::{compute_tec, compute_tec_with_bias, TecPipeline, TecSolution};

    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
}
