//! Random Forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::importance::aggregate_importances;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig, to_columns, validate_training_data};

/// A fitted Random Forest ensemble for binary classification.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Draw `n_samples` indices with replacement.
fn bootstrap_indices(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Train the Random Forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[bool],
    feature_names: &[String],
) -> Result<RandomForestResult, ForestError> {
    let n_features = validate_training_data(features, labels)?;
    if feature_names.len() != n_features {
        return Err(ForestError::FeatureNameMismatch {
            n_names: feature_names.len(),
            n_features,
        });
    }
    let n_positive = labels.iter().filter(|&&l| l).count();
    if n_positive == 0 || n_positive == labels.len() {
        return Err(ForestError::SingleClass {
            positive: n_positive > 0,
        });
    }

    let max_features = config.max_features.resolve(n_features)?;
    let tree_template = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    tree_template.validate(n_features)?;

    let n_samples = features.len();
    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_positive,
        max_features,
        "training random forest"
    );

    // Per-tree seeds come from one master RNG so results do not depend on
    // how rayon schedules the trees.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let columns = to_columns(features, n_features);
    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sample = bootstrap_indices(n_samples, &mut rng);
            tree_template
                .clone()
                .with_seed(rng.r#gen())
                .fit_validated(&columns, labels, &sample)
        })
        .collect();

    debug!(n_trees_trained = trees.len(), "tree training complete");

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree, feature_names);

    let forest = RandomForest {
        trees,
        n_features,
        feature_names: feature_names.to_vec(),
    };
    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_samples,
        n_positive,
        max_features_resolved: max_features,
    };

    info!("random forest training complete");
    Ok(RandomForestResult::new(forest, importances, metadata))
}

#[cfg(test)]
mod tests {
    use crate::config::{MaxFeatures, RandomForestConfig};
    use crate::error::ForestError;

    /// Positives sit at x >= 10; y is noise-free filler.
    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<bool>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            features.push(vec![i as f64 * 0.1, 0.5]);
            labels.push(false);
        }
        for i in 0..20 {
            features.push(vec![10.0 + i as f64 * 0.1, 0.5]);
            labels.push(true);
        }
        (features, labels, vec!["x".to_string(), "y".to_string()])
    }

    #[test]
    fn separable_training_accuracy() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(30)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&features, &labels, &names)
            .unwrap();
        let predictions = result.forest().predict_batch(&features).unwrap();
        assert_eq!(predictions, labels);
    }

    #[test]
    fn metadata_reflects_inputs() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(5)
            .unwrap()
            .fit(&features, &labels, &names)
            .unwrap();
        let meta = result.metadata();
        assert_eq!(meta.n_trees, 5);
        assert_eq!(meta.n_samples, 50);
        assert_eq!(meta.n_positive, 20);
        assert!((meta.positive_rate() - 0.4).abs() < 1e-12);
        assert_eq!(meta.max_features_resolved, 1);
        assert_eq!(result.forest().n_trees(), 5);
    }

    #[test]
    fn feature_importances_sum_to_one() {
        let (features, labels, names) = make_separable_data();
        let result = RandomForestConfig::new(20)
            .unwrap()
            .fit(&features, &labels, &names)
            .unwrap();
        let total: f64 = result.importances().iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
        assert_eq!(result.importances()[0].name, "x");
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels, names) = make_separable_data();
        let config = RandomForestConfig::new(10).unwrap().with_seed(99);
        let a = config.fit(&features, &labels, &names).unwrap();
        let b = config.fit(&features, &labels, &names).unwrap();
        let point = [5.0, 0.5];
        assert_eq!(
            a.forest().predict_proba(&point).unwrap(),
            b.forest().predict_proba(&point).unwrap()
        );
        assert_eq!(
            a.forest().predict_batch(&features).unwrap(),
            b.forest().predict_batch(&features).unwrap()
        );
    }

    #[test]
    fn single_class_rejected() {
        let features = vec![vec![1.0], vec![2.0]];
        let names = vec!["x".to_string()];
        let err = RandomForestConfig::new(3)
            .unwrap()
            .fit(&features, &[true, true], &names)
            .unwrap_err();
        assert!(matches!(err, ForestError::SingleClass { positive: true }));

        let err = RandomForestConfig::new(3)
            .unwrap()
            .fit(&features, &[false, false], &names)
            .unwrap_err();
        assert!(matches!(err, ForestError::SingleClass { positive: false }));
    }

    #[test]
    fn feature_name_count_checked() {
        let (features, labels, _) = make_separable_data();
        let err = RandomForestConfig::new(3)
            .unwrap()
            .fit(&features, &labels, &["x".to_string()])
            .unwrap_err();
        assert!(matches!(
            err,
            ForestError::FeatureNameMismatch { n_names: 1, n_features: 2 }
        ));
    }

    #[test]
    fn empty_dataset_error() {
        let err = RandomForestConfig::new(10).unwrap().fit(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }
}
