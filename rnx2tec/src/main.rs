#[macro_use]
extern crate log;

use gnss_tec::prelude::*;

use cli::Cli;

use env_logger::{Builder, Target};
use itertools::Itertools;

use std::fs::File;
use std::io::{stdout, BufWriter};

use thiserror::Error;

mod cli; // command line interface
mod output; // csv formatting

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error")]
    IoError(#[from] std::io::Error),
    #[error("failed to parse configuration")]
    ConfigError(#[from] serde_json::Error),
    #[error("failed to write csv")]
    CsvError(#[from] csv::Error),
    #[error("no observations could be loaded")]
    NoObservations,
    #[error("invalid receiver coordinates \"{0}\": expecting three comma separated values")]
    InvalidPosition(String),
    #[error("receiver position is unknown: use --rx-ecef or --rx-geo")]
    UnknownPosition,
    #[error("tec estimation failed")]
    ProcessingFailure,
}

pub fn main() -> Result<(), Error> {
    let cli = Cli::new();

    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false);
    if cli.quiet() {
        builder.filter_level(log::LevelFilter::Error);
    }
    builder.init();

    let cfg = cli.config()?;

    let ephemerides = match cli.nav_file() {
        Some(path) => {
            let ephemerides = parse_navigation(path);
            info!("loaded {} ephemerides from \"{}\"", ephemerides.len(), path);
            ephemerides
        },
        None => Vec::new(),
    };

    let biases = match cli.bias_file() {
        Some(path) => {
            let biases = parse_biases(path);
            info!("loaded {} satellite biases from \"{}\"", biases.len(), path);
            biases
        },
        None => BiasMap::default(),
    };

    let set = parse_observation_files(&cli.input_files(), cli.density(), cfg.workers)
        .ok_or(Error::NoObservations)?;

    info!(
        "loaded {} observations: {} satellites, {} epochs",
        set.observations.len(),
        set.satellites().len(),
        set.epochs().len()
    );

    let receiver = cli
        .manual_position()?
        .or(set.receiver_position)
        .ok_or(Error::UnknownPosition)?;

    let (lat, lon, h) = receiver.to_geodetic();
    info!("receiver position: {} (lat={:.5}, lon={:.5}, h={:.1})", receiver, lat, lon, h);

    let mut pipeline = TecPipeline::new(&biases, receiver).with_config(cfg);
    if ephemerides.is_empty() {
        warn!("no ephemerides: only slant TEC is computed");
    } else {
        pipeline = pipeline.with_ephemerides(&ephemerides);
    }

    let mut solution = pipeline
        .run(set.observations)
        .ok_or(Error::ProcessingFailure)?;

    info!("estimated receiver bias: {:.3} TECu", solution.receiver_bias);

    if let Some(bias) = cli.receiver_bias() {
        info!("receiver bias manually set to {:.3} TECu", bias);
        solution.adjust_receiver_bias(bias);
    }

    if let Some((min, max)) = cli.window() {
        solution.retain_within(min, max);
    }

    let invalid = solution
        .observations
        .iter()
        .filter(|obs| obs.vertical_tec == Some(VerticalTec::Invalid))
        .count();
    if invalid > 0 {
        warn!("{} observations failed the vertical conversion", invalid);
    }

    let satellites = solution
        .observations
        .iter()
        .map(|obs| obs.sv)
        .unique()
        .sorted()
        .join(", ");
    info!("solutions for {}", satellites);

    match cli.output_path() {
        Some(path) => {
            let fd = File::create(path)?;
            output::write_solution(&solution, BufWriter::new(fd))?;
            info!("solutions written to \"{}\"", path);
        },
        None => output::write_solution(&solution, stdout().lock())?,
    }
    Ok(())
}
