//! Serving side of steamhit: score feature vectors against a loaded
//! artifact, and resolve dataset titles into predictions.

mod context;
mod error;
mod service;

pub use context::{AppContext, TitlePrediction};
pub use error::{ErrorCategory, ServeError};
pub use service::{Prediction, PredictionService};
