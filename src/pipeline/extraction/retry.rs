use std::time::Duration;

use tracing::warn;

use super::types::{ExtractedData, Extractor};
use super::ExtractionError;
use crate::pipeline::registry::DocumentTypeConfig;

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Wraps an extractor with bounded retries and exponential backoff.
///
/// Retryable failures (transport errors, throttling, 5xx, unparseable
/// output) are attempted `max_retries` more times. Anything else, or the
/// last failure, is returned unchanged.
pub struct RetryingExtractor<E> {
    inner: E,
    max_retries: u32,
    initial_backoff: Duration,
}

impl<E: Extractor> RetryingExtractor<E> {
    pub fn new(inner: E, max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            initial_backoff,
        }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &E {
        &self.inner
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }
}

impl<E: Extractor> Extractor for RetryingExtractor<E> {
    fn extract(
        &self,
        pdf_bytes: &[u8],
        config: &DocumentTypeConfig,
    ) -> Result<ExtractedData, ExtractionError> {
        let mut attempt = 0;
        loop {
            match self.inner.extract(pdf_bytes, config) {
                Ok(data) => return Ok(data),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        doc_type = %config.document_type,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Extraction failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::pipeline::extraction::MockExtractor;
    use crate::pipeline::registry::config_for_type;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the given error kind `failures` times, then succeeds.
    struct FlakyExtractor {
        failures: u32,
        calls: AtomicU32,
        status: u16,
    }

    impl FlakyExtractor {
        fn new(failures: u32, status: u16) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                status,
            }
        }
    }

    impl Extractor for FlakyExtractor {
        fn extract(
            &self,
            _pdf_bytes: &[u8],
            _config: &DocumentTypeConfig,
        ) -> Result<ExtractedData, ExtractionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ExtractionError::Service {
                    status: self.status,
                    body: "unavailable".into(),
                })
            } else {
                Ok(ExtractedData::new().with("cost", "100"))
            }
        }
    }

    fn sales() -> &'static DocumentTypeConfig {
        config_for_type(DocumentType::Sales)
    }

    #[test]
    fn recovers_after_transient_failures() {
        let retrying = RetryingExtractor::new(FlakyExtractor::new(2, 503), 2, Duration::ZERO);
        let data = retrying.extract(b"", sales()).unwrap();
        assert_eq!(data.get("cost"), Some("100"));
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let retrying = RetryingExtractor::new(FlakyExtractor::new(5, 503), 2, Duration::ZERO);
        let err = retrying.extract(b"", sales()).unwrap_err();
        assert!(matches!(err, ExtractionError::Service { status: 503, .. }));
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn non_retryable_fails_immediately() {
        let retrying = RetryingExtractor::new(FlakyExtractor::new(1, 401), 3, Duration::ZERO);
        assert!(retrying.extract(b"", sales()).is_err());
        assert_eq!(retrying.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unparseable_output_still_errors_after_retries() {
        let retrying = RetryingExtractor::new(MockExtractor::new("not json"), 2, Duration::ZERO);
        let err = retrying.extract(b"", sales()).unwrap_err();
        assert!(err.is_parse_failure());
        assert_eq!(retrying.inner().calls(), 3);
    }

    #[test]
    fn zero_retries_is_single_attempt() {
        let retrying = RetryingExtractor::new(MockExtractor::unavailable(), 0, Duration::ZERO);
        assert!(retrying.extract(b"", sales()).is_err());
        assert_eq!(retrying.inner().calls(), 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let retrying =
            RetryingExtractor::new(MockExtractor::unavailable(), 10, Duration::from_millis(500));
        assert_eq!(retrying.backoff_for(0), Duration::from_millis(500));
        assert_eq!(retrying.backoff_for(1), Duration::from_millis(1000));
        assert_eq!(retrying.backoff_for(2), Duration::from_millis(2000));
        assert_eq!(retrying.backoff_for(8), MAX_BACKOFF);
    }
}
