use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use gnss_tec::prelude::{Config, GroundPosition};
use std::fs::read_to_string;

use crate::Error;

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

/// Parses a comma separated triplet, like "1.0,2.0,3.0"
fn parse_triplet(content: &str) -> Option<(f64, f64, f64)> {
    let items = content
        .split(',')
        .map(|item| item.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    if items.len() != 3 {
        return None;
    }
    Some((items[0], items[1], items[2]))
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: Self::command().get_matches(),
        }
    }
    fn command() -> Command {
        Command::new("rnx2tec")
            .author("Guillaume W. Bres, <guillaume.bressaix@gmail.com>")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Ionospheric TEC estimation from dual frequency GPS RINEX")
            .arg_required_else_help(true)
            .color(ColorChoice::Always)
            .arg(Arg::new("filepath")
                .short('f')
                .long("fp")
                .value_name("FILE")
                .action(ArgAction::Append)
                .required(true)
                .help("Observation RINEX (V2) file. You can load as many as you want,
they are processed as a single session."))
            .arg(Arg::new("nav")
                .short('n')
                .long("nav")
                .value_name("FILE")
                .help("Navigation RINEX file. Required to determine
the satellites elevation and obtain vertical TEC."))
            .arg(Arg::new("bias")
                .short('b')
                .long("bias")
                .value_name("FILE")
                .help("IONEX file providing the satellites differential code biases.
Satellite biases are considered null otherwise."))
            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the solutions to this CSV file, instead of stdout."))
            .arg(Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Disable all terminal output, except errors."))
        .next_help_heading("Processing")
            .arg(Arg::new("density")
                .short('d')
                .long("density")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Only keep one epoch out of N (N=1 keeps all of them)."))
            .arg(Arg::new("workers")
                .short('j')
                .long("jobs")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Number of worker threads."))
            .arg(Arg::new("config")
                .short('c')
                .long("cfg")
                .value_name("FILE")
                .help("Pipeline configuration (JSON). Fields that are not
specified take their default value."))
            .arg(Arg::new("rx-ecef")
                .long("rx-ecef")
                .value_name("X,Y,Z")
                .conflicts_with("rx-geo")
                .help("Receiver ECEF WGS84 coordinates, in meters.
Overrides the position described by the Observation header."))
            .arg(Arg::new("rx-geo")
                .long("rx-geo")
                .value_name("LAT,LON,H")
                .help("Receiver geodetic coordinates: latitude and longitude
in decimal degrees, height above the ellipsoid in meters."))
            .arg(Arg::new("rx-bias")
                .long("rx-bias")
                .value_name("TECu")
                .allow_hyphen_values(true)
                .value_parser(clap::value_parser!(f64))
                .help("Replace the estimated receiver bias with this value."))
            .arg(Arg::new("min")
                .long("min")
                .value_name("TECu")
                .allow_hyphen_values(true)
                .value_parser(clap::value_parser!(f64))
                .help("Drop solutions lower than this value."))
            .arg(Arg::new("max")
                .long("max")
                .value_name("TECu")
                .value_parser(clap::value_parser!(f64))
                .help("Drop solutions greater than this value."))
    }
    /// Returns Observation filepaths
    pub fn input_files(&self) -> Vec<&String> {
        if let Some(fp) = self.matches.get_many::<String>("filepath") {
            fp.collect()
        } else {
            Vec::new()
        }
    }
    pub fn nav_file(&self) -> Option<&String> {
        self.matches.get_one::<String>("nav")
    }
    pub fn bias_file(&self) -> Option<&String> {
        self.matches.get_one::<String>("bias")
    }
    pub fn output_path(&self) -> Option<&String> {
        self.matches.get_one::<String>("output")
    }
    /// Returns true if quiet mode is activated
    pub fn quiet(&self) -> bool {
        self.matches.get_flag("quiet")
    }
    pub fn density(&self) -> usize {
        self.matches.get_one::<usize>("density").copied().unwrap_or(1)
    }
    /// Returns the pipeline [Config]: from the user file if any,
    /// with the possible workers override.
    pub fn config(&self) -> Result<Config, Error> {
        let cfg = match self.matches.get_one::<String>("config") {
            Some(path) => {
                let content = read_to_string(path)?;
                serde_json::from_str::<Config>(&content)?
            },
            None => Config::default(),
        };
        match self.matches.get_one::<usize>("workers") {
            Some(workers) => Ok(cfg.with_workers(*workers)),
            None => Ok(cfg),
        }
    }
    /// Returns the receiver position manually defined, if any.
    /// Malformed coordinates are an error.
    pub fn manual_position(&self) -> Result<Option<GroundPosition>, Error> {
        if let Some(ecef) = self.matches.get_one::<String>("rx-ecef") {
            let xyz = parse_triplet(ecef).ok_or_else(|| Error::InvalidPosition(ecef.clone()))?;
            Ok(Some(GroundPosition::from_ecef_wgs84(xyz)))
        } else if let Some(geo) = self.matches.get_one::<String>("rx-geo") {
            let geo = parse_triplet(geo).ok_or_else(|| Error::InvalidPosition(geo.clone()))?;
            Ok(Some(GroundPosition::from_geodetic(geo)))
        } else {
            Ok(None)
        }
    }
    /// Returns the receiver bias manually defined, in TECu
    pub fn receiver_bias(&self) -> Option<f64> {
        self.matches.get_one::<f64>("rx-bias").copied()
    }
    /// Returns the (min, max) solution window
    pub fn window(&self) -> Option<(f64, f64)> {
        let min = self.matches.get_one::<f64>("min").copied();
        let max = self.matches.get_one::<f64>("max").copied();
        match (min, max) {
            (None, None) => None,
            (min, max) => Some((min.unwrap_or(f64::MIN), max.unwrap_or(f64::MAX))),
        }
    }
}
