//! Centrality options and requests.

use super::Algorithm;
use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default PageRank damping factor.
pub const DEFAULT_DAMPING: f64 = 0.85;

/// Default PageRank iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default PageRank convergence tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

fn default_true() -> bool {
    true
}

/// Options shared by every centrality algorithm.
///
/// The PageRank-only fields stay `None` unless the caller sets them, which
/// is how [`validate_for`](Self::validate_for) tells a deliberate setting
/// from a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CentralityOptions {
    /// Scale scores into a size-independent range.
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Follow link direction instead of treating links as symmetric.
    #[serde(default)]
    pub directed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl Default for CentralityOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            directed: false,
            damping: None,
            max_iterations: None,
            tolerance: None,
        }
    }
}

impl CentralityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes options from a JSON object.
    ///
    /// Unknown keys and mistyped values are rejected here, before any
    /// algorithm runs.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GraphError::InvalidOptions(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::InvalidOptions(e.to_string()))
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = Some(damping);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn damping(&self) -> f64 {
        self.damping.unwrap_or(DEFAULT_DAMPING)
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }

    /// Checks that `algorithm` can honour every option that was set.
    pub fn validate_for(&self, algorithm: Algorithm) -> Result<()> {
        let pagerank_only = [
            ("damping", self.damping.is_some()),
            ("maxIterations", self.max_iterations.is_some()),
            ("tolerance", self.tolerance.is_some()),
        ];

        if algorithm != Algorithm::PageRank {
            if let Some((name, _)) = pagerank_only.iter().find(|(_, set)| *set) {
                return Err(GraphError::unsupported(
                    algorithm.as_str(),
                    format!("option `{}`", name),
                ));
            }
            return Ok(());
        }

        let damping = self.damping();
        if !(damping > 0.0 && damping < 1.0) {
            return Err(GraphError::unsupported(
                algorithm.as_str(),
                format!("damping {} (must be strictly between 0 and 1)", damping),
            ));
        }
        let tolerance = self.tolerance();
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(GraphError::unsupported(
                algorithm.as_str(),
                format!("tolerance {} (must be positive)", tolerance),
            ));
        }
        if self.max_iterations() == 0 {
            return Err(GraphError::unsupported(
                algorithm.as_str(),
                "zero iterations",
            ));
        }
        Ok(())
    }
}

/// An algorithm plus its options, as sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CentralityRequest {
    pub algorithm: Algorithm,
    #[serde(default)]
    pub options: CentralityOptions,
}

impl CentralityRequest {
    pub fn new(algorithm: Algorithm, options: CentralityOptions) -> Self {
        Self { algorithm, options }
    }

    /// Decodes and validates a request.
    pub fn from_json(json: &str) -> Result<Self> {
        let request: Self =
            serde_json::from_str(json).map_err(|e| GraphError::InvalidOptions(e.to_string()))?;
        request.options.validate_for(request.algorithm)?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = CentralityOptions::from_value(json!({})).unwrap();
        assert!(options.normalize);
        assert!(!options.directed);
        assert_eq!(options.damping(), DEFAULT_DAMPING);
        assert_eq!(options.max_iterations(), DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let err = CentralityOptions::from_value(json!({ "normalize": "yes" })).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOptions(_)));
    }

    #[test]
    fn test_unknown_key_is_invalid() {
        let err = CentralityOptions::from_value(json!({ "weighted": true })).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOptions(_)));
    }

    #[test]
    fn test_pagerank_option_on_other_algorithm() {
        let options = CentralityOptions::new().with_damping(0.9);
        assert!(options.validate_for(Algorithm::PageRank).is_ok());
        let err = options.validate_for(Algorithm::Betweenness).unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnsupportedOption {
                algorithm: "betweenness",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_values() {
        for options in [
            CentralityOptions::new().with_damping(1.0),
            CentralityOptions::new().with_damping(0.0),
            CentralityOptions::new().with_tolerance(0.0),
            CentralityOptions::new().with_tolerance(f64::NAN),
            CentralityOptions::new().with_max_iterations(0),
        ] {
            let err = options.validate_for(Algorithm::PageRank).unwrap_err();
            assert!(matches!(err, GraphError::UnsupportedOption { .. }), "{:?}", options);
        }
    }

    #[test]
    fn test_request_from_json() {
        let request = CentralityRequest::from_json(
            r#"{ "algorithm": "pagerank", "options": { "maxIterations": 20, "directed": true } }"#,
        )
        .unwrap();
        assert_eq!(request.algorithm, Algorithm::PageRank);
        assert_eq!(request.options.max_iterations(), 20);
        assert!(request.options.directed);

        let err = CentralityRequest::from_json(r#"{ "algorithm": "closeness" }"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOptions(_)));

        let err = CentralityRequest::from_json(
            r#"{ "algorithm": "degree", "options": { "tolerance": 0.1 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::UnsupportedOption { .. }));
    }
}
