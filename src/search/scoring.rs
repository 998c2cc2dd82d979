//! BM25 scoring and score explanations.
//!
//! # Examples
//!
//! ```
//! use sarissa_jpc::search::ScoringParams;
//!
//! let params = ScoringParams::default();
//! let idf = ScoringParams::idf(1, 10);
//! let explanation = params.explain_weight("weight(title:sea in 0)", ScoringParams::explain_idf(1, 10), 1.0, 4.0, 4.0);
//!
//! assert!((explanation.value - idf * params.tf_norm(1.0, 4.0, 4.0)).abs() < 1e-6);
//! ```

use serde::Serialize;

use crate::error::{JpcError, Result};

/// Default BM25 term saturation.
pub const DEFAULT_K1: f32 = 1.2;

/// Default BM25 length normalization.
pub const DEFAULT_B: f32 = 0.75;

/// The BM25 `(k1, b)` pair used by a search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringParams {
    /// Term frequency saturation.
    pub k1: f32,
    /// Field length normalization.
    pub b: f32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        ScoringParams {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
        }
    }
}

impl ScoringParams {
    /// Create parameters, rejecting non-finite values.
    pub fn new(k1: f32, b: f32) -> Result<Self> {
        if !k1.is_finite() || !b.is_finite() {
            return Err(JpcError::invalid_input(format!(
                "k1 and b must be finite, got k1={k1} b={b}"
            )));
        }
        Ok(ScoringParams { k1, b })
    }

    /// Inverse document frequency of a term found in `doc_freq` of `num_docs` documents.
    pub fn idf(doc_freq: u32, num_docs: u32) -> f32 {
        let n = num_docs as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Saturated, length-normalized term frequency.
    pub fn tf_norm(&self, freq: f32, field_len: f32, avg_len: f32) -> f32 {
        if freq <= 0.0 {
            return 0.0;
        }
        let ratio = if avg_len > 0.0 { field_len / avg_len } else { 1.0 };
        let norm = 1.0 - self.b + self.b * ratio;
        freq * (self.k1 + 1.0) / (freq + self.k1 * norm)
    }

    /// Explain the idf of one term.
    pub fn explain_idf(doc_freq: u32, num_docs: u32) -> Explanation {
        Explanation::new(
            Self::idf(doc_freq, num_docs),
            "idf, computed as log(1 + (N - n + 0.5) / (n + 0.5)) from:",
        )
        .with_detail(Explanation::new(
            doc_freq as f32,
            "n, number of documents containing term",
        ))
        .with_detail(Explanation::new(
            num_docs as f32,
            "N, total number of documents",
        ))
    }

    /// Explain the normalized term frequency.
    pub fn explain_tf(&self, freq: f32, field_len: f32, avg_len: f32) -> Explanation {
        Explanation::new(
            self.tf_norm(freq, field_len, avg_len),
            "tf, computed as freq * (k1 + 1) / (freq + k1 * (1 - b + b * dl / avgdl)) from:",
        )
        .with_detail(Explanation::new(freq, "freq, occurrences of term within document"))
        .with_detail(Explanation::new(self.k1, K1_DESCRIPTION))
        .with_detail(Explanation::new(self.b, B_DESCRIPTION))
        .with_detail(Explanation::new(field_len, "dl, length of field"))
        .with_detail(Explanation::new(avg_len, "avgdl, average length of field"))
    }

    /// Explain a weight computed as `idf * tf`.
    pub fn explain_weight<S: Into<String>>(
        &self,
        description: S,
        idf: Explanation,
        freq: f32,
        field_len: f32,
        avg_len: f32,
    ) -> Explanation {
        let tf = self.explain_tf(freq, field_len, avg_len);
        Explanation::new(idf.value * tf.value, description)
            .with_detail(idf)
            .with_detail(tf)
    }
}

/// Description of the `k1` node in a term explanation.
pub const K1_DESCRIPTION: &str = "k1, term saturation parameter";

/// Description of the `b` node in a term explanation.
pub const B_DESCRIPTION: &str = "b, length normalization parameter";

/// A tree describing how a score was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// The value of this node.
    pub value: f32,
    /// What the value means.
    pub description: String,
    /// Values this one was computed from.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Explanation>,
}

impl Explanation {
    /// Create a leaf.
    pub fn new<S: Into<String>>(value: f32, description: S) -> Self {
        Explanation {
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// A node whose value is the sum of its details.
    pub fn sum<S: Into<String>>(description: S, details: Vec<Explanation>) -> Self {
        Explanation {
            value: details.iter().map(|d| d.value).sum(),
            description: description.into(),
            details,
        }
    }

    /// Append a detail node.
    pub fn with_detail(mut self, detail: Explanation) -> Self {
        self.details.push(detail);
        self
    }

    /// Find the first node, depth first, with the given description.
    pub fn find(&self, description: &str) -> Option<&Explanation> {
        if self.description == description {
            return Some(self);
        }
        self.details.iter().find_map(|d| d.find(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idf_is_positive() {
        assert!(ScoringParams::idf(10, 10) > 0.0);
        assert!(ScoringParams::idf(1, 10) > ScoringParams::idf(5, 10));
    }

    #[test]
    fn test_tf_norm_saturates() {
        let params = ScoringParams::default();
        let one = params.tf_norm(1.0, 4.0, 4.0);
        let many = params.tf_norm(100.0, 4.0, 4.0);

        assert!((one - 1.0).abs() < 1e-6);
        assert!(many < params.k1 + 1.0);
        assert_eq!(params.tf_norm(0.0, 4.0, 4.0), 0.0);
    }

    #[test]
    fn test_b_zero_ignores_length() {
        let params = ScoringParams::new(1.2, 0.0).unwrap();
        assert_eq!(params.tf_norm(2.0, 1.0, 8.0), params.tf_norm(2.0, 50.0, 8.0));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(ScoringParams::new(f32::NAN, 0.75).is_err());
        assert!(ScoringParams::new(1.2, f32::INFINITY).is_err());
    }

    #[test]
    fn test_explanation_reports_parameters() {
        let params = ScoringParams::new(2.0, 0.5).unwrap();
        let explanation = params.explain_weight(
            "weight(body:sea in 0)",
            ScoringParams::explain_idf(1, 3),
            2.0,
            5.0,
            4.0,
        );

        assert_eq!(explanation.find(K1_DESCRIPTION).unwrap().value, 2.0);
        assert_eq!(explanation.find(B_DESCRIPTION).unwrap().value, 0.5);
        let expected = ScoringParams::idf(1, 3) * params.tf_norm(2.0, 5.0, 4.0);
        assert!((explanation.value - expected).abs() < 1e-6);
    }

    #[test]
    fn test_sum() {
        let sum = Explanation::sum(
            "sum of:",
            vec![Explanation::new(1.5, "a"), Explanation::new(2.0, "b")],
        );
        assert_eq!(sum.value, 3.5);
        assert_eq!(sum.details.len(), 2);
    }
}
