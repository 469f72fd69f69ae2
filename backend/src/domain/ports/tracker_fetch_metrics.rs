//! Domain port for tracker fetch outcome counters.
//!
//! The tracker client never surfaces errors to its caller, so this port and
//! the logs are the only places a discarded failure remains visible.

use async_trait::async_trait;

use super::{TrackerLocationSourceError, define_port_error};

define_port_error! {
    /// Errors exposed when recording tracker metrics.
    pub enum TrackerFetchMetricsError {
        /// Metric exporter rejected the write.
        Export {
            /// Failure description.
            message: String,
        } => "tracker metrics exporter failed: {message}",
    }
}

/// Failure reason labels for tracker fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackerFetchFailureKind {
    /// The final attempt timed out.
    Timeout,
    /// The final attempt failed in transport.
    Transport,
    /// The final attempt received a non-success status.
    Status,
    /// The final attempt returned an undecodable body.
    Decode,
}

impl TrackerFetchFailureKind {
    /// Stable label used by exporters.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Status => "status",
            Self::Decode => "decode",
        }
    }
}

impl From<&TrackerLocationSourceError> for TrackerFetchFailureKind {
    fn from(error: &TrackerLocationSourceError) -> Self {
        match error {
            TrackerLocationSourceError::Timeout { .. } => Self::Timeout,
            TrackerLocationSourceError::Transport { .. } => Self::Transport,
            TrackerLocationSourceError::Status { .. } => Self::Status,
            TrackerLocationSourceError::Decode { .. } => Self::Decode,
        }
    }
}

/// Payload for a fetch that reached the tracker endpoint successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerFetchSuccess {
    /// Attempts used, including the first.
    pub attempt_count: u32,
    /// Entries kept after bounds filtering.
    pub accepted: usize,
    /// Entries dropped for lying outside the geofence.
    pub out_of_bounds: usize,
}

/// Payload for a fetch that exhausted its retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerFetchFailure {
    /// Attempts used, including the first.
    pub attempt_count: u32,
    /// Classification of the last error.
    pub kind: TrackerFetchFailureKind,
}

/// Metrics recording port for the tracker client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerFetchMetrics: Send + Sync {
    /// Record a lookup answered from the cache.
    async fn record_cache_hit(&self) -> Result<(), TrackerFetchMetricsError>;

    /// Record a successful fetch.
    ///
    /// ```rust,ignore
    /// use rocktags::domain::ports::{
    ///     NoOpTrackerFetchMetrics, TrackerFetchMetrics, TrackerFetchSuccess,
    /// };
    ///
    /// # async fn demo() {
    /// let metrics = NoOpTrackerFetchMetrics;
    /// let payload = TrackerFetchSuccess {
    ///     attempt_count: 1,
    ///     accepted: 1,
    ///     out_of_bounds: 0,
    /// };
    /// assert!(metrics.record_success(&payload).await.is_ok());
    /// # }
    /// ```
    async fn record_success(
        &self,
        payload: &TrackerFetchSuccess,
    ) -> Result<(), TrackerFetchMetricsError>;

    /// Record a fetch that was swallowed into an empty result.
    async fn record_failure(
        &self,
        payload: &TrackerFetchFailure,
    ) -> Result<(), TrackerFetchMetricsError>;
}

/// No-op implementation used when metrics are disabled or in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTrackerFetchMetrics;

#[async_trait]
impl TrackerFetchMetrics for NoOpTrackerFetchMetrics {
    async fn record_cache_hit(&self) -> Result<(), TrackerFetchMetricsError> {
        Ok(())
    }

    async fn record_success(
        &self,
        _payload: &TrackerFetchSuccess,
    ) -> Result<(), TrackerFetchMetricsError> {
        Ok(())
    }

    async fn record_failure(
        &self,
        _payload: &TrackerFetchFailure,
    ) -> Result<(), TrackerFetchMetricsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TrackerLocationSourceError::timeout("slow"), "timeout")]
    #[case(TrackerLocationSourceError::transport("reset"), "transport")]
    #[case(TrackerLocationSourceError::status(502_u16, "bad gateway"), "status")]
    #[case(TrackerLocationSourceError::decode("not json"), "decode")]
    fn classifies_source_errors(#[case] error: TrackerLocationSourceError, #[case] label: &str) {
        assert_eq!(TrackerFetchFailureKind::from(&error).as_label(), label);
    }
}
