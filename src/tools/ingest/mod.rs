//! Concurrent per-chromosome ingestion.
//!
//! One scoped worker per sample reads its coverage file(s). Workers share a
//! single [`Mutex`]-guarded [`RoundState`]: each fills only its own slot and
//! widens the genome window. The scope is the join barrier, so
//! [`IngestionCoordinator::run_round`] returns only after every worker is
//! done.

use std::path::PathBuf;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};

use arcstr::ArcStr;
use log::{
    debug,
    info,
};

use crate::data_structs::{
    Cohort,
    GenomeWindow,
    SampleMeta,
    SampleSeries,
};
use crate::error::DhunterError;
use crate::io::coverage::{
    read_sample_series,
    StrandMode,
};
use crate::tools::events::{
    EventSink,
    PipelineEvent,
};

/// Cooperative stop flag shared by all ingestion workers.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) { self.0.store(true, Ordering::SeqCst) }

    pub fn is_aborted(&self) -> bool { self.0.load(Ordering::Relaxed) }

    pub fn reset(&self) { self.0.store(false, Ordering::SeqCst) }
}

/// Where to read one sample from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSource {
    pub index:  usize,
    pub name:   String,
    pub dir:    PathBuf,
    pub cohort: Cohort,
}

/// Everything read for one chromosome, in sample order.
#[derive(Debug)]
pub struct IngestionRound {
    pub chromosome: ArcStr,
    pub series:     Vec<SampleSeries>,
    /// `None` when no sample had a single record.
    pub window:     Option<GenomeWindow>,
    pub aborted:    bool,
}

/// State shared between the workers of one round. Rebuilt for every round.
struct RoundState {
    slots:     Vec<Option<SampleSeries>>,
    completed: usize,
    window:    Option<GenomeWindow>,
    fired:     bool,
    aborted:   bool,
}

impl RoundState {
    fn new(n_samples: usize) -> Self {
        Self {
            slots:     vec![None; n_samples],
            completed: 0,
            window:    None,
            fired:     false,
            aborted:   false,
        }
    }

    /// Stores a finished series. Returns `true` exactly once, for the
    /// completion that brings the counter to the number of samples.
    fn complete(
        &mut self,
        slot: usize,
        series: SampleSeries,
        aborted: bool,
    ) -> bool {
        self.window = GenomeWindow::merge_bounds(self.window, series.bounds());
        self.aborted |= aborted;
        if self.slots[slot].replace(series).is_none() {
            self.completed += 1;
        }
        if self.completed == self.slots.len() && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }
}

pub struct IngestionCoordinator {
    strand_mode: StrandMode,
    abort:       AbortHandle,
    events:      EventSink,
}

impl IngestionCoordinator {
    pub fn new(
        strand_mode: StrandMode,
        abort: AbortHandle,
        events: EventSink,
    ) -> Self {
        Self {
            strand_mode,
            abort,
            events,
        }
    }

    pub fn abort_handle(&self) -> AbortHandle { self.abort.clone() }

    /// Clears a previous stop request. Must be called before the first round
    /// of a run.
    pub fn start(&self) { self.abort.reset() }

    /// Reads all samples of `chromosome` concurrently.
    pub fn run_round(
        &self,
        chromosome: &str,
        samples: &[SampleSource],
    ) -> IngestionRound {
        let chromosome = ArcStr::from(chromosome);
        let n_samples = samples.len();
        let state = Mutex::new(RoundState::new(n_samples));
        info!(
            "Reading chromosome {} for {} samples",
            chromosome, n_samples
        );

        std::thread::scope(|scope| {
            for (slot, source) in samples.iter().enumerate() {
                let state = &state;
                let chromosome = chromosome.clone();
                scope.spawn(move || {
                    self.read_one(slot, source, chromosome, n_samples, state)
                });
            }
        });

        let mut state = state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if n_samples == 0 && !state.fired {
            state.fired = true;
            self.chromosome_read(&chromosome, 0);
        }
        let aborted = state.aborted || self.abort.is_aborted();
        if aborted {
            debug!("Ingestion of chromosome {} was aborted", chromosome);
        }

        let series = state
            .slots
            .into_iter()
            .zip(samples)
            .map(|(slot, source)| {
                slot.unwrap_or_else(|| {
                    SampleSeries::empty(sample_meta(
                        source,
                        chromosome.clone(),
                        self.strand_mode,
                    ))
                })
            })
            .collect();

        IngestionRound {
            chromosome,
            series,
            window: state.window,
            aborted,
        }
    }

    fn read_one(
        &self,
        slot: usize,
        source: &SampleSource,
        chromosome: ArcStr,
        n_samples: usize,
        state: &Mutex<RoundState>,
    ) {
        let meta = sample_meta(source, chromosome.clone(), self.strand_mode);
        let read = read_sample_series(
            &source.dir,
            &chromosome,
            self.strand_mode,
            meta,
            &self.abort,
        );
        for error in read.errors.iter() {
            let path = match error {
                DhunterError::Ingestion { path, .. } => Some(path.clone()),
                _ => None,
            };
            self.events.send(PipelineEvent::IngestionError {
                sample: source.index,
                path,
                message: error.to_string(),
            });
        }

        let bounds = read.series.bounds();
        let fire = state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .complete(slot, read.series, read.aborted);

        debug!(
            "Sample {} ({}) read for chromosome {}: {:?}",
            source.index, source.name, chromosome, bounds
        );
        self.events.send(PipelineEvent::FileRead {
            sample:     source.index,
            chromosome: chromosome.to_string(),
            min_pos:    bounds.map(|b| b.0),
            max_pos:    bounds.map(|b| b.1),
        });
        if fire {
            self.chromosome_read(&chromosome, n_samples);
        }
    }

    fn chromosome_read(
        &self,
        chromosome: &str,
        n_samples: usize,
    ) {
        self.events.send(PipelineEvent::ChromosomeRead {
            chromosome: chromosome.to_string(),
            n_samples,
        });
    }
}

fn sample_meta(
    source: &SampleSource,
    chromosome: ArcStr,
    mode: StrandMode,
) -> SampleMeta {
    SampleMeta {
        index: source.index,
        name: source.name.clone(),
        chromosome,
        cohort: source.cohort,
        strand: mode.series_strand(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::data_structs::Strand;
    use crate::io::coverage::coverage_file_path;

    fn source(
        index: usize,
        dir: PathBuf,
        cohort: Cohort,
    ) -> SampleSource {
        SampleSource {
            index,
            name: format!("s{}", index),
            dir,
            cohort,
        }
    }

    #[test]
    fn test_round_state_fires_once() {
        let meta = SampleMeta {
            index:      0,
            name:       "a".to_string(),
            chromosome: ArcStr::from("1"),
            cohort:     Cohort::Case,
            strand:     Strand::Forward,
        };
        let mut state = RoundState::new(2);
        assert!(!state.complete(1, SampleSeries::empty(meta.clone()), false));
        assert!(state.complete(0, SampleSeries::empty(meta.clone()), false));
        assert!(!state.complete(0, SampleSeries::empty(meta), false));
        assert_eq!(state.completed, 2);
    }

    #[test]
    fn test_round_collects_in_sample_order() {
        let dirs = (0..3).map(|_| tempdir().unwrap()).collect::<Vec<_>>();
        fs::write(
            coverage_file_path(dirs[0].path(), Strand::Forward, "2"),
            "40 1 0 1 0\n50 1 0 1 0\n",
        )
        .unwrap();
        fs::write(
            coverage_file_path(dirs[2].path(), Strand::Forward, "2"),
            "15 1 0 1 0\n",
        )
        .unwrap();
        let samples = vec![
            source(0, dirs[0].path().to_path_buf(), Cohort::Case),
            source(1, dirs[1].path().to_path_buf(), Cohort::Case),
            source(2, dirs[2].path().to_path_buf(), Cohort::Control),
        ];

        let (sender, receiver) = crossbeam::channel::unbounded();
        let coordinator = IngestionCoordinator::new(
            StrandMode::Forward,
            AbortHandle::default(),
            EventSink::new(sender),
        );
        coordinator.start();
        let round = coordinator.run_round("2", &samples);

        assert!(!round.aborted);
        assert_eq!(round.window, Some(GenomeWindow::new(15, 50)));
        let lens = round.series.iter().map(|s| s.len()).collect::<Vec<_>>();
        assert_eq!(lens, vec![2, 0, 1]);
        assert_eq!(round.series[2].meta().cohort, Cohort::Control);

        let events = receiver.try_iter().collect::<Vec<_>>();
        let n_file_read = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::FileRead { .. }))
            .count();
        let n_completed = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::ChromosomeRead { .. }))
            .count();
        let n_errors = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::IngestionError { .. }))
            .count();
        assert_eq!(n_file_read, 3);
        assert_eq!(n_completed, 1);
        assert_eq!(n_errors, 1);
    }

    #[test]
    fn test_abort_during_round_keeps_partial_series() {
        const N_LINES: usize = 1_000_000;
        let small = tempdir().unwrap();
        let large = tempdir().unwrap();
        fs::write(
            coverage_file_path(small.path(), Strand::Forward, "1"),
            "10 1 0 1 0\n",
        )
        .unwrap();
        let content = (1..=N_LINES)
            .map(|pos| format!("{} 1 0 1 0\n", pos))
            .collect::<String>();
        fs::write(
            coverage_file_path(large.path(), Strand::Forward, "1"),
            content,
        )
        .unwrap();
        let samples = vec![
            source(0, small.path().to_path_buf(), Cohort::Case),
            source(1, large.path().to_path_buf(), Cohort::Control),
        ];

        let (sender, receiver) = crossbeam::channel::unbounded();
        let coordinator = IngestionCoordinator::new(
            StrandMode::Forward,
            AbortHandle::default(),
            EventSink::new(sender),
        );
        let abort = coordinator.abort_handle();
        let round = std::thread::scope(|scope| {
            let handle = scope.spawn(|| coordinator.run_round("1", &samples));
            for event in receiver.iter() {
                if matches!(event, PipelineEvent::FileRead { sample: 0, .. }) {
                    abort.abort();
                    break;
                }
            }
            handle.join().unwrap()
        });

        assert!(round.aborted);
        assert_eq!(round.series[0].len(), 1);
        assert!(round.series[1].len() < N_LINES);
    }

    #[test]
    fn test_abort_and_restart() {
        let dir = tempdir().unwrap();
        fs::write(
            coverage_file_path(dir.path(), Strand::Forward, "1"),
            "10 1 0 1 0\n",
        )
        .unwrap();
        let samples = vec![source(0, dir.path().to_path_buf(), Cohort::Case)];
        let coordinator = IngestionCoordinator::new(
            StrandMode::Forward,
            AbortHandle::default(),
            EventSink::default(),
        );

        coordinator.abort_handle().abort();
        let round = coordinator.run_round("1", &samples);
        assert!(round.aborted);
        assert!(round.series[0].is_empty());

        coordinator.start();
        let round = coordinator.run_round("1", &samples);
        assert!(!round.aborted);
        assert_eq!(round.series[0].len(), 1);
        assert_eq!(round.window, Some(GenomeWindow::new(10, 10)));
    }
}
