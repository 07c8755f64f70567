//! Carrier phase leveling: the precise but ambiguous phase TEC
//! is aligned on the absolute but noisy code TEC, per continuous arc.
use std::ops::Range;

use crate::{cfg::LevelingOpts, observation::Observation};

/// Sorts observations by satellite then time, which is
/// the order expected by the other processing stages.
pub fn sort_observations(observations: &mut [Observation]) {
    observations.sort();
}

/// Returns the index ranges of the continuous runs of one satellite.
/// Observations must be sorted.
pub(crate) fn satellite_runs(observations: &[Observation]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=observations.len() {
        if i == observations.len() || observations[i].sv != observations[start].sv {
            runs.push(start..i);
            start = i;
        }
    }
    runs
}

/// Median sampling period of this run, in seconds
fn median_time_step(run: &[Observation]) -> f64 {
    let mut steps = run
        .windows(2)
        .map(|w| (w[1].epoch - w[0].epoch).to_seconds())
        .collect::<Vec<_>>();
    if steps.is_empty() {
        return 0.0;
    }
    steps.sort_by(|a, b| a.total_cmp(b));
    steps[steps.len() / 2]
}

/// Splits one satellite run into arcs. A new arc starts on data gaps
/// and on phase TEC jumps (cycle slips). Returned ranges are relative to the run.
pub(crate) fn arcs(run: &[Observation], opts: &LevelingOpts) -> Vec<Range<usize>> {
    let max_gap = opts.gap_factor * median_time_step(run);
    let mut arcs = Vec::new();
    let mut start = 0;
    for i in 1..run.len() {
        let dt = (run[i].epoch - run[i - 1].epoch).to_seconds();
        let slip = (run[i].phase - run[i - 1].phase).abs() > opts.cycle_slip_threshold;
        if dt > max_gap || slip {
            arcs.push(start..i);
            start = i;
        }
    }
    if start < run.len() {
        arcs.push(start..run.len());
    }
    arcs
}

/// Levels one arc: the phase TEC is offset by the median of the
/// phase minus code differences. The leveling error derives from
/// the interquartile spread of these differences.
fn level_arc(arc: &mut [Observation], opts: &LevelingOpts) {
    let len = arc.len();
    if len < 2 {
        return;
    }

    let mut differences = arc
        .iter()
        .map(|obs| obs.phase - obs.differential_range)
        .collect::<Vec<_>>();
    differences.sort_by(|a, b| a.total_cmp(b));

    let offset = differences[len / 2];
    let q1 = differences[(len as f64 * 0.25) as usize];
    let q3 = differences[(len as f64 * 0.75) as usize];

    let mut spread = q3 - q1;
    if len < opts.small_segment_len && spread < opts.spread_floor {
        spread = opts.spread_floor;
    }
    let error = spread / (len as f64).sqrt();

    for obs in arc.iter_mut() {
        obs.slant_tec = Some(obs.phase - offset);
        obs.tec_error = Some(error);
    }
}

/// Levels the phase TEC of every satellite, then drops observations
/// that could not be leveled (isolated points).
/// Observations must be sorted, see [sort_observations].
pub fn level_phase(observations: &mut Vec<Observation>, opts: &LevelingOpts) {
    for obs in observations.iter_mut() {
        obs.slant_tec = None;
        obs.tec_error = None;
    }

    for run in satellite_runs(observations) {
        let run = &mut observations[run];
        for arc in arcs(run, opts) {
            level_arc(&mut run[arc], opts);
        }
    }

    observations.retain(|obs| obs.is_leveled());
}
