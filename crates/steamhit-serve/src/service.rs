//! Stateless scoring over a loaded model artifact.

use steamhit_io::ModelArtifact;

use crate::error::ServeError;

/// One scored feature vector.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Prediction {
    /// 1 for a hit, 0 otherwise.
    pub predicted_class: u8,
    /// Probability of class 1, in `[0, 1]`.
    pub probability: f64,
}

impl Prediction {
    /// Whether the predicted class is a hit.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.predicted_class == 1
    }

    /// `"hit"` or `"niche"`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.is_hit() { "hit" } else { "niche" }
    }
}

/// Scores feature vectors against an immutable artifact.
///
/// Holds no mutable state: repeated calls with the same input return the
/// same [`Prediction`].
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifact: ModelArtifact,
}

impl PredictionService {
    /// Wrap a loaded artifact.
    #[must_use]
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Feature names, in the order [`predict`](Self::predict) expects values.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        self.artifact.feature_names()
    }

    /// Score one feature vector laid out in [`feature_names`](Self::feature_names) order.
    ///
    /// The class follows the forest's own decision rule.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ServeError::ShapeMismatch`] | `features.len()` differs from the stored feature count |
    /// | [`ServeError::Forest`] | The forest rejects the input, e.g. its width disagrees with the stored list |
    pub fn predict(&self, features: &[f64]) -> Result<Prediction, ServeError> {
        let expected = self.artifact.feature_names().len();
        if features.len() != expected {
            return Err(ServeError::ShapeMismatch {
                expected,
                got: features.len(),
            });
        }
        let (hit, probability) = self.artifact.forest().predict_with_proba(features)?;
        Ok(Prediction {
            predicted_class: u8::from(hit),
            probability,
        })
    }
}
