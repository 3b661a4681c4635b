use std::time::Duration;

/// The default maximum number of rule firings per normalization.
pub const DEFAULT_MAX_REWRITES: usize = 4096;

/// The default minimum number of arguments for which arguments are normalized in parallel.
pub const DEFAULT_FAN_OUT_THRESHOLD: usize = 8;

/// Options that bound and tune a [`Normalizer`](super::Normalizer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// The maximum number of rule firings in a single call to
    /// [`Normalizer::normalize`](super::Normalizer::normalize), counted across all threads.
    ///
    /// When the limit is reached, normalization stops and the partially normalized expression is
    /// returned, tagged with [`Status::RewriteLimitExceeded`](super::Status::RewriteLimitExceeded).
    /// This guarantees termination even for rule sets that rewrite forever, such as
    /// `x_ -> f[x]`.
    pub max_rewrites: usize,

    /// The maximum wall-clock time of a single normalization. If [`None`], there is no limit.
    pub time_limit: Option<Duration>,

    /// The minimum number of arguments a call must have for its arguments to be normalized in
    /// parallel. Calls with fewer arguments are normalized sequentially, since the cost of
    /// spawning tasks outweighs the work for small argument lists.
    ///
    /// Set this to [`usize::MAX`] to disable parallelism entirely.
    pub fan_out_threshold: usize,

    /// The number of worker threads in the normalizer's thread pool. If zero, the number of
    /// threads is chosen automatically from the available parallelism.
    pub workers: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_rewrites: DEFAULT_MAX_REWRITES,
            time_limit: None,
            fan_out_threshold: DEFAULT_FAN_OUT_THRESHOLD,
            workers: 0,
        }
    }
}

impl NormalizeConfig {
    /// Wraps the given [`NormalizeConfig`] into a builder for further customization.
    pub fn into_builder(self) -> NormalizeConfigBuilder {
        NormalizeConfigBuilder(self)
    }
}

/// A builder for [`NormalizeConfig`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeConfigBuilder(NormalizeConfig);

impl NormalizeConfigBuilder {
    /// Creates a new builder with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of rule firings. See [`NormalizeConfig::max_rewrites`] for more
    /// information.
    pub fn max_rewrites(mut self, max_rewrites: usize) -> Self {
        self.0.max_rewrites = max_rewrites;
        self
    }

    /// Sets the wall-clock time limit. See [`NormalizeConfig::time_limit`] for more information.
    pub fn time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.0.time_limit = time_limit;
        self
    }

    /// Sets the minimum number of arguments normalized in parallel. See
    /// [`NormalizeConfig::fan_out_threshold`] for more information.
    pub fn fan_out_threshold(mut self, fan_out_threshold: usize) -> Self {
        self.0.fan_out_threshold = fan_out_threshold;
        self
    }

    /// Sets the number of worker threads.
    pub fn workers(mut self, workers: usize) -> Self {
        self.0.workers = workers;
        self
    }

    /// Builds the [`NormalizeConfig`].
    pub fn build(self) -> NormalizeConfig {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn builder() {
        let config = NormalizeConfigBuilder::new()
            .max_rewrites(10)
            .time_limit(Some(Duration::from_millis(250)))
            .fan_out_threshold(2)
            .workers(3)
            .build();
        assert_eq!(config, NormalizeConfig {
            max_rewrites: 10,
            time_limit: Some(Duration::from_millis(250)),
            fan_out_threshold: 2,
            workers: 3,
        });
        assert_eq!(config.into_builder().workers(1).build().max_rewrites, 10);
        assert_eq!(NormalizeConfigBuilder::new().build(), NormalizeConfig::default());
    }
}
