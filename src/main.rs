use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use tracing::{info, warn};

use steamhit_forest::{
    ConfusionMatrix, DEFAULT_N_TREES, DEFAULT_TEST_FRACTION, DecisionTreeConfig, HoldoutSplit,
    RandomForestConfig, RankedFeature,
};
use steamhit_io::{
    ArtifactStore, DEFAULT_MIN_POSITIVE_RATIO, DEFAULT_MIN_USER_REVIEWS, Dataset, DatasetReader,
    FeatureSelector, HitRule, TrainingSet,
};
use steamhit_serve::{AppContext, ErrorCategory, ServeError};

#[derive(Parser)]
#[command(name = "steamhit")]
#[command(about = "Classify Steam store listings as commercial hits or niche titles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the train/test split and the model
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Thresholds of the hit rule.
#[derive(Args, Debug, Clone)]
struct RuleArgs {
    /// Minimum positive review percentage for a hit (inclusive)
    #[arg(long, default_value_t = DEFAULT_MIN_POSITIVE_RATIO)]
    min_positive_ratio: f64,

    /// Minimum number of user reviews for a hit (inclusive)
    #[arg(long, default_value_t = DEFAULT_MIN_USER_REVIEWS)]
    min_reviews: u64,
}

impl RuleArgs {
    fn rule(&self) -> HitRule {
        HitRule::new(self.min_positive_ratio, self.min_reviews)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Train the random forest, report hold-out accuracy, and write the model artifacts
    Train {
        /// Path to the games CSV file
        #[arg(long)]
        data: PathBuf,

        /// Directory for model.bin and features.json
        #[arg(long, default_value = ".")]
        model_dir: PathBuf,

        /// Number of trees in the forest
        #[arg(long, default_value_t = DEFAULT_N_TREES)]
        n_trees: usize,

        /// Maximum tree depth (unlimited when omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Fraction of each class held out for scoring
        #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
        test_fraction: f64,

        #[command(flatten)]
        rule: RuleArgs,
    },

    /// Score a single decision tree on the same split, as a reference point
    Baseline {
        /// Path to the games CSV file
        #[arg(long)]
        data: PathBuf,

        /// Maximum tree depth (unlimited when omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Fraction of each class held out for scoring
        #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
        test_fraction: f64,

        #[command(flatten)]
        rule: RuleArgs,
    },

    /// Predict hit probability for one title, or summarise over every record
    Predict {
        /// Path to the games CSV file
        #[arg(long)]
        data: PathBuf,

        /// Directory holding model.bin and features.json
        #[arg(long, default_value = ".")]
        model_dir: PathBuf,

        /// Title to score (first matching row); omit to score all records
        #[arg(long)]
        title: Option<String>,
    },

    /// List distinct titles in dataset order
    Titles {
        /// Path to the games CSV file
        #[arg(long)]
        data: PathBuf,

        /// Print at most this many titles
        #[arg(long)]
        limit: Option<usize>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    n_records: usize,
    n_excluded: usize,
    n_rows: usize,
    n_hits: usize,
    n_train: usize,
    n_test: usize,
    accuracy: f64,
    confusion: ConfusionMatrix,
    n_trees: usize,
    seed: u64,
    feature_importances: Vec<RankedFeature>,
    model_path: PathBuf,
    features_path: PathBuf,
}

#[derive(Serialize)]
struct PredictAllOutput {
    n_records: usize,
    n_scored: usize,
    n_skipped: usize,
    n_hits: usize,
    mean_probability: Option<f64>,
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    DatasetReader::new(path)
        .read()
        .with_context(|| format!("failed to read dataset {}", path.display()))
}

fn training_set(dataset: &Dataset, rule: &RuleArgs) -> Result<TrainingSet> {
    let set = TrainingSet::build(dataset, &rule.rule(), &FeatureSelector::standard());
    if set.is_empty() {
        anyhow::bail!("no record has every value needed for training");
    }
    Ok(set)
}

/// Attach an operator hint that depends on what went wrong.
fn serve_context(e: ServeError) -> anyhow::Error {
    let hint = match e.category() {
        ErrorCategory::ModelUnavailable => "no usable model; run `steamhit train` first",
        ErrorCategory::DatasetUnavailable => "dataset could not be loaded",
        ErrorCategory::BadInput => "the requested record cannot be scored",
    };
    anyhow::Error::new(e).context(hint)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            model_dir,
            n_trees,
            max_depth,
            test_fraction,
            rule,
        } => {
            let dataset = load_dataset(&data)?;
            let set = training_set(&dataset, &rule)?;

            let config = RandomForestConfig::new(n_trees)
                .context("invalid forest configuration")?
                .with_max_depth(max_depth)
                .with_seed(cli.seed);
            let holdout = HoldoutSplit::new(test_fraction)
                .context("invalid test fraction")?
                .with_seed(cli.seed);

            let result = holdout
                .evaluate(&config, set.features(), set.labels(), set.feature_names())
                .context("training failed")?;
            info!(accuracy = result.accuracy, "model accuracy on held-out rows");

            let store = ArtifactStore::new(&model_dir);
            store
                .save(&result.forest, set.feature_names())
                .context("failed to write model artifacts")?;

            let output = TrainOutput {
                n_records: dataset.len(),
                n_excluded: set.excluded().len(),
                n_rows: set.len(),
                n_hits: set.n_hits(),
                n_train: result.split.train.len(),
                n_test: result.split.test.len(),
                accuracy: result.accuracy,
                confusion: result.confusion,
                n_trees,
                seed: cli.seed,
                feature_importances: result.importances,
                model_path: store.model_path(),
                features_path: store.features_path(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Baseline {
            data,
            max_depth,
            test_fraction,
            rule,
        } => {
            let dataset = load_dataset(&data)?;
            let set = training_set(&dataset, &rule)?;

            let config = DecisionTreeConfig::new()
                .with_max_depth(max_depth)
                .with_seed(cli.seed);
            let holdout = HoldoutSplit::new(test_fraction)
                .context("invalid test fraction")?
                .with_seed(cli.seed);
            let result = holdout
                .evaluate_tree(&config, set.features(), set.labels())
                .context("baseline training failed")?;

            println!("Accuracy: {:.4}", result.accuracy);
            println!();
            println!("Confusion matrix:");
            print!("{}", result.confusion);
            println!();
            println!("Classification report:");
            print!("{}", result.confusion.report("niche", "hit"));
        }

        Command::Predict {
            data,
            model_dir,
            title,
        } => {
            let store = ArtifactStore::new(&model_dir);
            let ctx = AppContext::init(&data, &store).map_err(serve_context)?;

            match title {
                Some(title) => {
                    let scored = ctx
                        .predict_title(&title)
                        .map_err(serve_context)
                        .with_context(|| format!("cannot predict \"{title}\""))?;
                    println!("{}", serde_json::to_string_pretty(&scored)?);
                }
                None => {
                    let outcomes: Vec<_> = ctx
                        .dataset()
                        .records()
                        .par_iter()
                        .map(|record| ctx.predict_record(record))
                        .collect();

                    let scored: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
                    let n_skipped = outcomes.len() - scored.len();
                    if n_skipped > 0 {
                        warn!(n_skipped, "records without every model input were skipped");
                    }
                    let mean_probability = (!scored.is_empty()).then(|| {
                        scored.iter().map(|p| p.probability).sum::<f64>() / scored.len() as f64
                    });

                    let output = PredictAllOutput {
                        n_records: outcomes.len(),
                        n_scored: scored.len(),
                        n_skipped,
                        n_hits: scored.iter().filter(|p| p.is_hit()).count(),
                        mean_probability,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }

        Command::Titles { data, limit } => {
            let dataset = load_dataset(&data)?;
            let titles = dataset.unique_titles();
            let shown = limit.map_or(titles.len(), |n| n.min(titles.len()));
            println!("{}", serde_json::to_string_pretty(&titles[..shown])?);
        }
    }

    Ok(())
}
