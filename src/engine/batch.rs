// src/engine/batch.rs
//
// Sequential batch driver.
//
// Items are converted strictly one after another, in input order. A failed
// item does not stop the batch; it is recorded as a Failure outcome and
// logged, and the silent-skip view (`into_results`) simply leaves it out.

use super::codec::ImageCodec;
use super::result::{ConversionResult, ItemOutcome, ResultList};
use super::source::SourceImage;
use super::transformer::ImageTransformer;
use crate::error::ConvertError;
use crate::ops::{OutputFormat, ResizePolicy};
use tracing::{info, instrument, warn};

/// Progress after an item has been converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `round(100 * completed / total)`
    pub percent: u8,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percent: progress_percent(completed, total),
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Coarse completion percentage. An empty batch reports 0.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (100.0 * completed.min(total) as f64 / total as f64).round();
    percent as u8
}

/// Outcomes of one batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Every source fails with the same error. Used when the request itself
    /// is invalid, so no item can be converted.
    pub fn all_failed(sources: &[SourceImage], error: &ConvertError) -> Self {
        let outcomes = sources
            .iter()
            .map(|source| ItemOutcome::Failure {
                source_name: source.name().to_string(),
                error: error.clone(),
            })
            .collect();
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn results(&self) -> impl Iterator<Item = &ConversionResult> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ItemOutcome::Success(result) => Some(result),
            ItemOutcome::Failure { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ConvertError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            ItemOutcome::Success(_) => None,
            ItemOutcome::Failure { source_name, error } => Some((source_name.as_str(), error)),
        })
    }

    pub fn success_count(&self) -> usize {
        self.results().count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Successful results only, in input order.
    pub fn into_results(self) -> ResultList {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| outcome.into_result().ok())
            .collect()
    }
}

/// Convert every source with `transformer`, one at a time.
///
/// `on_progress` is called after each successful item with the position of
/// that item; a failed item reports nothing.
#[instrument(skip_all, fields(items = sources.len(), format = %format))]
pub fn run_batch<C, F>(
    transformer: &ImageTransformer<C>,
    sources: &[SourceImage],
    policy: &ResizePolicy,
    format: OutputFormat,
    mut on_progress: F,
) -> BatchReport
where
    C: ImageCodec,
    F: FnMut(Progress),
{
    let total = sources.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, source) in sources.iter().enumerate() {
        let outcome = match transformer.convert(source, policy, format) {
            Ok(result) => {
                on_progress(Progress::new(index + 1, total));
                ItemOutcome::Success(result)
            }
            Err(error) => {
                warn!(
                    source = source.name(),
                    kind = %error.kind(),
                    error = %error,
                    "conversion failed, item skipped"
                );
                ItemOutcome::Failure {
                    source_name: source.name().to_string(),
                    error,
                }
            }
        };
        outcomes.push(outcome);
    }

    let report = BatchReport { outcomes };
    info!(
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "batch finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::TransformerConfig;
    use crate::engine::transformer::fake::{source, transformer, FakeCodec};
    use crate::error::ErrorKind;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(2, 4), 50);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(9, 3), 100);
    }

    #[test]
    fn test_failed_item_is_skipped_in_order() {
        let t = transformer(FakeCodec::default(), TransformerConfig::default());
        let sources = [
            source("a.png", "10x10"),
            source("b.png", "corrupt"),
            source("c.png", "20x10"),
        ];

        let report = t.convert_batch(&sources, &ResizePolicy::Original, OutputFormat::Png, |_| {});
        assert_eq!(report.len(), 3);
        assert_eq!(report.failure_count(), 1);
        let (name, error) = report.failures().next().unwrap();
        assert_eq!(name, "b.png");
        assert_eq!(error.kind(), ErrorKind::Decode);

        let results = report.into_results();
        let names: Vec<_> = results.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, ["a.png", "c.png"]);
    }

    #[test]
    fn test_progress_reported_only_for_successes() {
        let t = transformer(FakeCodec::default(), TransformerConfig::default());
        let sources = [
            source("a.png", "10x10"),
            source("b.png", "nope"),
            source("c.png", "10x10"),
            source("d.png", "10x10"),
        ];
        let mut seen = Vec::new();
        t.convert_batch(&sources, &ResizePolicy::Original, OutputFormat::Jpeg, |p| {
            seen.push(p)
        });

        let percents: Vec<u8> = seen.iter().map(|p| p.percent).collect();
        assert_eq!(percents, [25, 75, 100]);
        assert_eq!(seen[1], Progress::new(3, 4));
        assert!(seen[2].is_done());
    }

    #[test]
    fn test_all_failing_batch_reports_no_progress() {
        let t = transformer(FakeCodec::default(), TransformerConfig::default());
        let sources = [source("a.png", "bad"), source("b.png", "worse")];
        let mut calls = 0;
        t.convert_batch(&sources, &ResizePolicy::Original, OutputFormat::Png, |_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_every_item_failing_yields_empty_results() {
        let t = transformer(FakeCodec::default(), TransformerConfig::default());
        let sources = [source("a.png", "10x10"), source("b.png", "10x10")];
        let report = t.convert_batch(
            &sources,
            &ResizePolicy::FixedRatio(0.0),
            OutputFormat::Png,
            |_| {},
        );
        assert_eq!(report.failure_count(), 2);
        assert!(report
            .outcomes()
            .iter()
            .all(|o| o.kind() == Some(ErrorKind::InvalidPolicy)));
        assert!(report.into_results().is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let t = transformer(FakeCodec::default(), TransformerConfig::default());
        let mut calls = 0;
        let report = t.convert_batch(&[], &ResizePolicy::Original, OutputFormat::Png, |_| calls += 1);
        assert!(report.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_all_failed() {
        let sources = [source("a.png", "1x1"), source("b.png", "1x1")];
        let report = BatchReport::all_failed(&sources, &ConvertError::invalid_dimensions(0, 5));
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.outcomes()[1].source_name(), "b.png");
    }
}
