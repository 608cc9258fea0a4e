//! Wall-clock timing of pipeline stages, reported through the `log` facade
//! at debug level.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AstParsing,
    LayoutCalculation,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::AstParsing => "AST Parsing",
            Metric::LayoutCalculation => "Layout Calculation",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Runs `action`, logs how long it took and returns its value.
pub fn measure<T>(metric: Metric, action: impl FnOnce() -> T) -> T {
    timed(metric, action).0
}

/// Like [`measure`], also returning the elapsed time.
pub fn timed<T>(metric: Metric, action: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = action();
    let elapsed = start.elapsed();
    report(metric, elapsed);
    (value, elapsed)
}

/// Awaits `action`, logs how long it took and returns its output.
pub async fn measure_async<F: Future>(metric: Metric, action: F) -> F::Output {
    let start = Instant::now();
    let value = action.await;
    report(metric, start.elapsed());
    value
}

fn report(metric: Metric, elapsed: Duration) {
    log::debug!(
        "[{metric}] Executed in: {:.2} ms",
        elapsed.as_secs_f64() * 1000.0
    );
}
