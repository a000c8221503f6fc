use std::collections::BTreeMap;

use nback_core::TrialRecord;

/// Signal-detection tallies for one back-distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelSummary {
    pub trials: usize,
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    pub correct_rejections: usize,
    /// Mean reaction time of responded trials.
    pub mean_rt_ms: Option<f64>,
}

impl LevelSummary {
    pub fn accuracy(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        (self.hits + self.correct_rejections) as f64 / self.trials as f64
    }
}

/// Per-level outcome of the scored (non-training) records.
pub fn summarize(records: &[TrialRecord]) -> BTreeMap<usize, LevelSummary> {
    let mut levels: BTreeMap<usize, (LevelSummary, Vec<u64>)> = BTreeMap::new();
    for record in records.iter().filter(|r| !r.training) {
        let (summary, rts) = levels.entry(record.block_n).or_default();
        summary.trials += 1;
        match (record.is_target, record.response) {
            (true, true) => summary.hits += 1,
            (true, false) => summary.misses += 1,
            (false, true) => summary.false_alarms += 1,
            (false, false) => summary.correct_rejections += 1,
        }
        if let Some(rt) = record.reaction_time_ms {
            rts.push(rt);
        }
    }
    levels
        .into_iter()
        .map(|(n, (mut summary, rts))| {
            if !rts.is_empty() {
                summary.mean_rt_ms = Some(rts.iter().sum::<u64>() as f64 / rts.len() as f64);
            }
            (n, summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize, is_target: bool, response: bool, rt: Option<u64>, training: bool) -> TrialRecord {
        TrialRecord {
            participant_id: "P".into(),
            version: 1,
            block_n: n,
            trial_index: 0,
            stimulus_digit: 0,
            is_target,
            response,
            accuracy: Some(is_target == response),
            reaction_time_ms: rt,
            stimulus_onset_ms: 0,
            response_time_ms: None,
            training,
            timestamp: String::new(),
        }
    }

    #[test]
    fn tallies_outcomes_per_level() {
        let records = vec![
            record(1, true, true, Some(400), false),
            record(1, true, false, None, false),
            record(1, false, true, Some(600), false),
            record(1, false, false, None, false),
            record(2, false, false, None, false),
            record(2, true, true, Some(300), true),
        ];
        let summary = summarize(&records);
        let one = &summary[&1];
        assert_eq!((one.hits, one.misses, one.false_alarms, one.correct_rejections), (1, 1, 1, 1));
        assert_eq!(one.mean_rt_ms, Some(500.0));
        assert_eq!(one.accuracy(), 0.5);
        let two = &summary[&2];
        assert_eq!(two.trials, 1);
        assert_eq!(two.mean_rt_ms, None);
    }
}
