use crate::Error;
use csv::Writer;
use gnss_tec::prelude::{TecSolution, VerticalTec};
use std::io::Write;

fn optional(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.3}", value),
        None => String::new(),
    }
}

pub fn write_solution<W: Write>(solution: &TecSolution, w: W) -> Result<(), Error> {
    let mut w = Writer::from_writer(w);
    w.write_record([
        "Epoch",
        "SV",
        "Elevation [deg]",
        "Slant TEC [TECu]",
        "Error [TECu]",
        "Vertical TEC [TECu]",
    ])?;
    for obs in solution.observations.iter() {
        let vertical = match obs.vertical_tec {
            Some(VerticalTec::Value(value)) => format!("{:.3}", value),
            Some(VerticalTec::Invalid) => "Invalid".to_string(),
            None => String::new(),
        };
        w.write_record(&[
            obs.epoch.to_string(),
            obs.sv.to_string(),
            optional(obs.elevation),
            optional(obs.slant_tec),
            optional(obs.tec_error),
            vertical,
        ])?;
    }
    w.flush()?;
    Ok(())
}
