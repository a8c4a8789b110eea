//! Run-wide decoding options.

/// What a record stream does after a chunk-scoped error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Yield the error and continue with the next chunk.
    #[default]
    BestEffort,
    /// Yield the first error, then end the stream.
    FailFast,
}

/// Options shared by every record stream of a [`ChunksReader`](crate::ChunksReader).
///
/// ```
/// use scchunks::{DecodeOptions, ErrorPolicy};
///
/// let options = DecodeOptions::default().with_threads(4).fail_fast();
/// assert_eq!(options.policy, ErrorPolicy::FailFast);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Worker threads for chunk decoding. `0` and `1` decode on the calling thread.
    pub threads: usize,
    pub policy: ErrorPolicy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            policy: ErrorPolicy::BestEffort,
        }
    }
}

impl DecodeOptions {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn fail_fast(self) -> Self {
        self.with_policy(ErrorPolicy::FailFast)
    }

    pub fn is_parallel(&self) -> bool {
        self.threads > 1
    }

    /// Number of chunks decoded per batch.
    ///
    /// Sequential decoding reads one chunk at a time so an abandoned stream
    /// stops reading immediately.
    pub fn window(&self) -> usize {
        if self.is_parallel() { self.threads * 2 } else { 1 }
    }
}
