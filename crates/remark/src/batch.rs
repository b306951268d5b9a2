//! Parallel processing of many documents with one shared [`Processor`].

use crate::processor::Processor;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// A single document to process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Markdown source.
    pub source: String,
}

impl BatchInput {
    /// Creates an input.
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}

/// Result for a single document in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Identifier matching the input.
    pub id: String,
    /// Rendered HTML (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Error message (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Number of documents submitted.
    pub total: usize,
    /// Number processed successfully.
    pub succeeded: usize,
    /// Number that failed.
    pub failed: usize,
    /// Wall-clock time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    /// Maximum number of threads. Defaults to rayon's global pool.
    #[serde(default)]
    pub max_threads: Option<usize>,
    /// Keep going after a failure. Defaults to true.
    #[serde(default)]
    pub continue_on_error: Option<bool>,
}

/// All results plus statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput {
    /// One entry per processed input, in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Processes documents in parallel.
///
/// With `continue_on_error` set to false, documents are processed in order
/// and processing stops after the first failure; `results` then ends at the
/// failed document.
pub fn process_batch(
    processor: &Processor,
    inputs: Vec<BatchInput>,
    options: &BatchOptions,
) -> BatchOutput {
    let start = Instant::now();
    let continue_on_error = options.continue_on_error.unwrap_or(true);

    let pool = options.max_threads.and_then(|max_threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .map_err(|err| log::warn!("Falling back to the global thread pool: {}", err))
            .ok()
    });

    let total = inputs.len();
    let succeeded = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        match processor.process(&input.source) {
            Ok(rendered) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    html: Some(rendered.html),
                    error: None,
                }
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::debug!("Failed to process {}: {}", input.id, err);
                BatchResult {
                    id: input.id,
                    html: None,
                    error: Some(err.to_string()),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        match &pool {
            Some(pool) => pool.install(|| inputs.into_par_iter().map(process_input).collect()),
            None => inputs.into_par_iter().map(process_input).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let had_error = result.error.is_some();
            results.push(result);
            if had_error {
                break;
            }
        }
        results
    };

    BatchOutput {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogmark_core::{BlogmarkError, Node};

    fn failing_processor() -> Processor {
        let mut processor = Processor::default();
        processor.add_ast_transform(|root: &mut Node| -> Result<(), BlogmarkError> {
            if root.text_content().contains("boom") {
                return Err(BlogmarkError::malformed("boom"));
            }
            Ok(())
        });
        processor
    }

    #[test]
    fn results_keep_input_order() {
        let inputs = (0..16)
            .map(|i| BatchInput::new(format!("doc-{i}"), format!(":::tip\n{i}\n:::")))
            .collect();
        let output = process_batch(&Processor::default(), inputs, &BatchOptions::default());

        assert_eq!(output.stats.total, 16);
        assert_eq!(output.stats.succeeded, 16);
        assert_eq!(output.stats.failed, 0);
        for (i, result) in output.results.iter().enumerate() {
            assert_eq!(result.id, format!("doc-{i}"));
            assert_eq!(
                result.html.as_deref(),
                Some(format!("<div data-admonition=\"tip\"><p>Tip</p><p>{i}</p></div>").as_str())
            );
        }
    }

    #[test]
    fn thread_cap_is_honored() {
        let options = BatchOptions {
            max_threads: Some(2),
            ..Default::default()
        };
        let inputs = vec![BatchInput::new("a", "# A"), BatchInput::new("b", "# B")];
        let output = process_batch(&Processor::default(), inputs, &options);
        assert_eq!(output.results[1].html.as_deref(), Some("<h1 id=\"b\"><a href=\"#b\">B</a></h1>"));
    }

    #[test]
    fn errors_are_collected_by_default() {
        let inputs = vec![
            BatchInput::new("ok", "fine"),
            BatchInput::new("bad", "boom"),
            BatchInput::new("ok2", "also fine"),
        ];
        let output = process_batch(&failing_processor(), inputs, &BatchOptions::default());
        assert_eq!(output.results.len(), 3);
        assert_eq!(output.stats.failed, 1);
        assert_eq!(output.stats.succeeded, 2);
        assert!(output.results[1].error.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn stops_at_first_error_when_asked() {
        let options = BatchOptions {
            continue_on_error: Some(false),
            ..Default::default()
        };
        let inputs = vec![
            BatchInput::new("ok", "fine"),
            BatchInput::new("bad", "boom"),
            BatchInput::new("never", "unreached"),
        ];
        let output = process_batch(&failing_processor(), inputs, &options);
        assert_eq!(output.results.len(), 2);
        assert_eq!(output.stats.total, 3);
        assert_eq!(output.stats.succeeded, 1);
        assert_eq!(output.stats.failed, 1);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let stats = BatchStats {
            total: 1,
            succeeded: 1,
            failed: 0,
            processing_time_ms: 0.5,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"total":1,"succeeded":1,"failed":0,"processingTimeMs":0.5}"#
        );
    }
}
