use agrisense::{
    advisor::{Advisor, ManualReading, Strategy},
    auth::{CredentialStore, SledCredentialStore},
    config::Config,
    logging,
    ml::{MLConfig, ModelCache, ModelType, TrainedModel, TrainingJob},
    models::Reading,
    thresholds::{self, Classification},
};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "agrisense-cli")]
#[command(about = "Agrisense offline tools", long_about = None, version)]
struct Cli {
    /// Configuration file (overrides AGRISENSE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Algorithm {
    RandomForest,
    DecisionTree,
}

impl From<Algorithm> for ModelType {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::RandomForest => ModelType::RandomForest,
            Algorithm::DecisionTree => ModelType::DecisionTree,
        }
    }
}

#[derive(Args)]
struct ReadingArgs {
    /// Temperature (°C)
    #[arg(short, long, allow_negative_numbers = true)]
    temperature: f64,

    /// Humidity (%)
    #[arg(short = 'u', long)]
    humidity: f64,

    /// Nutrients (g/L)
    #[arg(short, long)]
    nutrients: f64,

    /// pH
    #[arg(short, long)]
    ph: f64,
}

impl ReadingArgs {
    fn reading(&self) -> Reading {
        Reading::new(self.temperature, self.humidity, self.nutrients, self.ph)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a model on historical data and export predictions
    Train {
        /// Historical CSV
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Where to write the model artifact
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// CSV with recommendations and model predictions
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        algorithm: Option<Algorithm>,

        /// Derive labels from the threshold rules even if the file has some
        #[arg(long)]
        generate_labels: bool,

        /// Fraction of rows held out for validation metrics
        #[arg(long)]
        validation_split: Option<f64>,
    },

    /// Classify one reading with the threshold rules
    Classify {
        #[command(flatten)]
        reading: ReadingArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Predict with a trained model alongside the rule advice
    Predict {
        /// Model artifact
        #[arg(short, long)]
        model: Option<PathBuf>,

        #[command(flatten)]
        reading: ReadingArgs,

        #[arg(short, long, default_value = "both")]
        strategy: Strategy,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Register a user in the credential store
    AddUser {
        /// Credential database
        #[arg(long)]
        db: Option<PathBuf>,

        #[arg(long)]
        username: String,

        #[arg(long, env = "AGRISENSE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Check a username/password pair
    CheckLogin {
        /// Credential database
        #[arg(long)]
        db: Option<PathBuf>,

        #[arg(long)]
        username: String,

        #[arg(long, env = "AGRISENSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    logging::init_tracing(&config.observability);

    match cli.command {
        Commands::Train {
            data,
            model,
            output,
            algorithm,
            generate_labels,
            validation_split,
        } => {
            let ml = MLConfig {
                algorithm: algorithm.map(Into::into).unwrap_or(config.ml.algorithm),
                validation_split: validation_split.unwrap_or(config.ml.validation_split),
                ..config.ml.clone()
            };
            let job = TrainingJob {
                data_path: data.unwrap_or(config.data.history_path),
                model_path: model.unwrap_or(config.data.model_path),
                output_path: Some(output.unwrap_or(config.data.predictions_path)),
                generate_labels,
            };

            let report = job.run(&ml)?;

            println!("Algorithm:      {}", report.algorithm);
            println!("Samples:        {}", report.samples);
            println!("Classes:        {}", report.classes);
            println!(
                "Train accuracy: {:.4}",
                report.training_metrics.accuracy
            );
            if let Some(validation) = &report.validation_metrics {
                println!("Valid accuracy: {:.4}", validation.accuracy);
                println!("Valid F1:       {:.4}", validation.f1_score);
            }
            println!("Model saved to {}", report.model_path.display());
            if let Some(output) = &report.output_path {
                println!("Predictions written to {}", output.display());
            }
        }

        Commands::Classify { reading, json } => {
            let classification = thresholds::classify(&reading.reading());
            if json {
                println!("{}", serde_json::to_string_pretty(&classification)?);
            } else {
                print_classification(&classification);
            }
        }

        Commands::Predict {
            model,
            reading,
            strategy,
            json,
        } => {
            let path = model.unwrap_or(config.data.model_path);
            let cache = if strategy == Strategy::Rules {
                ModelCache::empty()
            } else {
                let model = TrainedModel::load(&path)
                    .with_context(|| format!("Failed to load model {}", path.display()))?;
                ModelCache::from_model(model)
            };

            let advisor = Advisor::new(Arc::new(cache));
            let advice = advisor.advise_manual(ManualReading::from(reading.reading()), strategy)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&advice)?);
            } else {
                if let Some(prediction) = &advice.model {
                    println!("Model ({}): {}", prediction.model_type, prediction.value);
                }
                if let Some(rules) = &advice.rules {
                    print_classification(rules);
                }
            }
        }

        Commands::AddUser {
            db,
            username,
            password,
        } => {
            let store = open_store(db, &config)?;
            store.add_user(&username, &password)?;
            store.flush()?;
            println!("User '{}' added", username.trim());
        }

        Commands::CheckLogin {
            db,
            username,
            password,
        } => {
            let store = open_store(db, &config)?;
            if store.check_login(&username, &password)? {
                println!("Login OK");
            } else {
                bail!("Invalid username or password");
            }
        }
    }

    Ok(())
}

fn open_store(db: Option<PathBuf>, config: &Config) -> anyhow::Result<SledCredentialStore> {
    let path = db.unwrap_or_else(|| config.auth.db_path.clone());
    SledCredentialStore::open(&path, config.auth.hash_iterations)
        .with_context(|| format!("Failed to open credential store {}", path.display()))
}

fn print_classification(classification: &Classification) {
    for assessment in &classification.assessments {
        println!(
            "{:<18} {:>8.2}  {:<9}  {}",
            assessment.dimension.column(),
            assessment.value,
            assessment.tier,
            assessment.guidance
        );
    }
    println!();
    println!("Overall: {}", classification.worst_tier());
    println!("{}", classification.recommendations);
}
