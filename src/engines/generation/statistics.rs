use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one finished search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub algorithm: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub iterations: u64,
    pub tests_executed: u64,
    pub best_fitness: Option<f64>,
    pub suite_size: usize,
    pub suite_total_length: usize,
}

/// Receives search progress, fire-and-forget.
///
/// Sinks are output-only: nothing a sink does, including failing, may feed
/// back into the search.
pub trait StatisticsSink: Send {
    fn on_search_started(&mut self, algorithm: &str);

    fn on_iteration(&mut self, iteration: u64, best_fitness: f64, suite_size: usize);

    fn on_test_executed(&mut self);

    fn on_search_finished(&mut self, report: &SearchReport);
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NoopStatistics;

impl StatisticsSink for NoopStatistics {
    fn on_search_started(&mut self, _algorithm: &str) {}

    fn on_iteration(&mut self, _iteration: u64, _best_fitness: f64, _suite_size: usize) {}

    fn on_test_executed(&mut self) {}

    fn on_search_finished(&mut self, _report: &SearchReport) {}
}

/// Sink that reports through the log facade.
#[derive(Debug, Default)]
pub struct LogStatistics;

impl StatisticsSink for LogStatistics {
    fn on_search_started(&mut self, algorithm: &str) {
        log::info!("search started with algorithm {algorithm}");
    }

    fn on_iteration(&mut self, iteration: u64, best_fitness: f64, suite_size: usize) {
        log::debug!(
            "iteration {iteration} complete, best fitness {best_fitness:.4}, suite size {suite_size}"
        );
    }

    fn on_test_executed(&mut self) {
        log::trace!("test case executed");
    }

    fn on_search_finished(&mut self, report: &SearchReport) {
        log::info!(
            "search finished after {} iterations and {} executions, best fitness {:?}",
            report.iterations,
            report.tests_executed,
            report.best_fitness
        );
    }
}

/// One progress event as sent over a channel.
#[derive(Debug, Clone)]
pub enum StatisticsEvent {
    SearchStarted {
        algorithm: String,
    },
    Iteration {
        iteration: u64,
        best_fitness: f64,
        suite_size: usize,
    },
    TestExecuted,
    SearchFinished(SearchReport),
}

/// Sink that forwards events over an mpsc channel, for listeners living on
/// another thread.
pub struct ChannelStatistics {
    sender: std::sync::mpsc::Sender<StatisticsEvent>,
}

impl ChannelStatistics {
    pub fn new(sender: std::sync::mpsc::Sender<StatisticsEvent>) -> Self {
        Self { sender }
    }
}

impl StatisticsSink for ChannelStatistics {
    fn on_search_started(&mut self, algorithm: &str) {
        let _ = self.sender.send(StatisticsEvent::SearchStarted {
            algorithm: algorithm.to_string(),
        });
    }

    fn on_iteration(&mut self, iteration: u64, best_fitness: f64, suite_size: usize) {
        // Ignore send errors (the listener might be gone).
        let _ = self.sender.send(StatisticsEvent::Iteration {
            iteration,
            best_fitness,
            suite_size,
        });
    }

    fn on_test_executed(&mut self) {
        let _ = self.sender.send(StatisticsEvent::TestExecuted);
    }

    fn on_search_finished(&mut self, report: &SearchReport) {
        let _ = self
            .sender
            .send(StatisticsEvent::SearchFinished(report.clone()));
    }
}
