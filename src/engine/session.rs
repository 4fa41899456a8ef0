// src/engine/session.rs
//
// ConversionSession: the selected files, the options typed by the user, the
// progress counter and the results of the last run.
//
// Nothing here is persisted. Results own their blobs, so replacing or
// clearing them (or dropping the session) revokes every output.

use super::batch::{run_batch, BatchReport, Progress};
use super::codec::{ImageCodec, NativeCodec};
use super::result::ResultList;
use super::source::SourceImage;
use super::transformer::ImageTransformer;
use crate::error::{ConvertError, Result};
use crate::ops::ConvertOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct ConversionSession<C: ImageCodec = NativeCodec> {
    transformer: ImageTransformer<C>,
    files: Vec<SourceImage>,
    options: ConvertOptions,
    progress: u8,
    results: ResultList,
    failures: Vec<(String, ConvertError)>,
}

impl ConversionSession<NativeCodec> {
    pub fn new() -> Self {
        Self::with_transformer(ImageTransformer::new())
    }
}

impl Default for ConversionSession<NativeCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> ConversionSession<C> {
    pub fn with_transformer(transformer: ImageTransformer<C>) -> Self {
        Self {
            transformer,
            files: Vec::new(),
            options: ConvertOptions::default(),
            progress: 0,
            results: ResultList::new(),
            failures: Vec::new(),
        }
    }

    pub fn transformer(&self) -> &ImageTransformer<C> {
        &self.transformer
    }

    pub fn files(&self) -> &[SourceImage] {
        &self.files
    }

    /// Append files to the selection. Results of a previous run are dropped.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = SourceImage>) {
        let before = self.files.len();
        self.files.extend(files);
        self.clear_results();
        debug!(added = self.files.len() - before, total = self.files.len(), "files added");
    }

    pub fn remove_file(&mut self, index: usize) -> Option<SourceImage> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ConvertOptions {
        &mut self.options
    }

    pub fn set_options(&mut self, options: ConvertOptions) {
        self.options = options;
    }

    /// Percentage reached by the last run.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn results(&self) -> &ResultList {
        &self.results
    }

    /// Items the last run could not convert, with the reason.
    pub fn failures(&self) -> &[(String, ConvertError)] {
        &self.failures
    }

    /// Convert every selected file with the current options, replacing the
    /// previous results. Does nothing when no file is selected.
    pub fn process<F>(&mut self, mut on_progress: F) -> &ResultList
    where
        F: FnMut(Progress),
    {
        if self.files.is_empty() {
            return &self.results;
        }

        self.clear_results();

        let report = match self.options.resolve() {
            Ok((policy, format)) => {
                let progress = &mut self.progress;
                run_batch(&self.transformer, &self.files, &policy, format, |p| {
                    *progress = p.percent;
                    on_progress(p);
                })
            }
            Err(error) => {
                warn!(error = %error, "options rejected, no item converted");
                BatchReport::all_failed(&self.files, &error)
            }
        };

        self.failures = report
            .failures()
            .map(|(name, error)| (name.to_string(), error.clone()))
            .collect();
        self.results = report.into_results();
        &self.results
    }

    /// Revoke and drop every result.
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.failures.clear();
        self.progress = 0;
    }

    /// Save every result into `dir`, in result order.
    pub fn download_all(&self, dir: impl AsRef<Path>) -> Vec<Result<PathBuf>> {
        self.results.download_all(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::TransformerConfig;
    use crate::engine::transformer::fake::{source, transformer, FakeCodec};
    use crate::error::ErrorKind;
    use crate::ops::{OutputFormat, ResizePreset};

    fn session() -> ConversionSession<FakeCodec> {
        ConversionSession::with_transformer(transformer(
            FakeCodec::default(),
            TransformerConfig::default(),
        ))
    }

    #[test]
    fn test_process_with_no_files_is_noop() {
        let mut s = session();
        let mut calls = 0;
        assert!(s.process(|_| calls += 1).is_empty());
        assert_eq!(calls, 0);
        assert_eq!(s.progress(), 0);
    }

    #[test]
    fn test_process_uses_options() {
        let mut s = session();
        s.add_files([source("a.b.png", "1920x1080"), source("bad.png", "??")]);
        s.options_mut().target_format = OutputFormat::WebP;
        s.options_mut().select_preset(ResizePreset::Story);

        let results = s.process(|_| {});
        assert_eq!(results.len(), 1);
        let r = results.get(0).unwrap();
        assert_eq!(r.file_name, "a_vibed.webp");
        assert_eq!((r.width, r.height), (608, 1080));
        assert_eq!(s.progress(), 50);
        assert_eq!(s.failures().len(), 1);
        assert_eq!(s.failures()[0].0, "bad.png");
    }

    #[test]
    fn test_custom_size_overrides_preset() {
        let mut s = session();
        s.add_files([source("a.png", "100x100")]);
        s.set_options(
            ConvertOptions::new(OutputFormat::Png, ResizePreset::Post).with_custom_size("800px", "600"),
        );
        let r = s.process(|_| {}).get(0).unwrap();
        assert_eq!((r.width, r.height), (800, 600));
    }

    #[test]
    fn test_invalid_custom_size_fails_every_item() {
        let mut s = session();
        s.add_files([source("a.png", "10x10"), source("b.png", "10x10")]);
        s.set_options(ConvertOptions::default().with_custom_size("0", "600"));
        assert!(s.process(|_| {}).is_empty());
        assert_eq!(s.failures().len(), 2);
        assert_eq!(s.failures()[0].1.kind(), ErrorKind::InvalidPolicy);
        assert_eq!(s.transformer().codec().counters.decodes.get(), 0);
    }

    #[test]
    fn test_adding_files_revokes_previous_results() {
        let mut s = session();
        s.add_files([source("a.png", "10x10")]);
        s.process(|_| {});
        let store = s.transformer().blob_store().clone();
        assert_eq!(store.live_count(), 1);

        s.add_files([source("b.png", "10x10")]);
        assert!(s.results().is_empty());
        assert_eq!(store.live_count(), 0);
        assert_eq!(s.files().len(), 2);
    }

    #[test]
    fn test_reprocess_replaces_results() {
        let mut s = session();
        s.add_files([source("a.png", "10x10"), source("b.png", "10x10")]);
        s.process(|_| {});
        s.process(|_| {});
        assert_eq!(s.results().len(), 2);
        assert_eq!(s.transformer().blob_store().live_count(), 2);
    }

    #[test]
    fn test_remove_and_clear_files() {
        let mut s = session();
        s.add_files([source("a.png", "1x1"), source("b.png", "1x1")]);
        assert_eq!(s.remove_file(0).unwrap().name(), "a.png");
        assert!(s.remove_file(5).is_none());
        assert_eq!(s.files().len(), 1);
        s.clear_files();
        assert!(s.files().is_empty());
    }

    #[test]
    fn test_download_all() {
        let mut s = session();
        s.add_files([source("x.png", "3x3"), source("y.png", "4x4")]);
        s.options_mut().target_format = OutputFormat::Png;
        s.process(|_| {});

        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = s
            .download_all(dir.path())
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(paths, [dir.path().join("x_vibed.png"), dir.path().join("y_vibed.png")]);
        assert_eq!(std::fs::read(&paths[1]).unwrap(), b"png:4x4");
    }
}
