//! Shared parallel processing configuration types.

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigValidator};

/// Centralized configuration for parallel processing behavior.
///
/// Pages (layout) and words (OCR) are independent units of work. Batches at or
/// below the configured thresholds are processed sequentially, larger batches
/// are spread over the rayon thread pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for parallel processing.
    /// If None, rayon will use the default thread pool size (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Page batches with at most this many pages are processed sequentially.
    #[serde(default = "ParallelPolicy::default_page_threshold")]
    pub page_threshold: usize,

    /// Pages with at most this many words reconstruct characters sequentially.
    #[serde(default = "ParallelPolicy::default_word_threshold")]
    pub word_threshold: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the page batch threshold.
    pub fn with_page_threshold(mut self, threshold: usize) -> Self {
        self.page_threshold = threshold;
        self
    }

    /// Set the per-page word threshold.
    pub fn with_word_threshold(mut self, threshold: usize) -> Self {
        self.word_threshold = threshold;
        self
    }

    /// Returns true when a batch of `pages` pages should be processed in parallel.
    pub fn parallel_pages(&self, pages: usize) -> bool {
        pages > self.page_threshold
    }

    /// Returns true when a page with `words` words should be processed in parallel.
    pub fn parallel_words(&self, words: usize) -> bool {
        words > self.word_threshold
    }

    /// Install the global rayon thread pool with the configured number of threads.
    ///
    /// This method should be called once at application startup before any parallel
    /// processing occurs. If `max_threads` is None, this method does nothing and
    /// rayon will use its default thread pool size.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the thread pool was successfully configured
    /// - `Ok(false)` if `max_threads` is None (no configuration needed)
    /// - `Err` if the thread pool has already been initialized
    pub fn install_global_thread_pool(&self) -> Result<bool, rayon::ThreadPoolBuildError> {
        if let Some(num_threads) = self.max_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn default_page_threshold() -> usize {
        4
    }

    fn default_word_threshold() -> usize {
        256
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            page_threshold: Self::default_page_threshold(),
            word_threshold: Self::default_word_threshold(),
        }
    }
}

impl ConfigValidator for ParallelPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.max_threads {
            self.validate_positive_count("parallel.max_threads", threads)?;
        }
        Ok(())
    }
}
