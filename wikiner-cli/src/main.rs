//! Linha de comando do wikiner: treino do modelo e destaque de entidades.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wikiner_core::{
    classification_report, Algorithm, ClassConfig, NerDataset, NerModel, NerPipeline,
    SequenceLabeler, TrainerConfig,
};

#[derive(Parser)]
#[command(name = "wikiner")]
#[command(about = "Reconhecimento de entidades nomeadas no estilo WikiNER", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Treina um modelo e avalia no conjunto de teste
    Train(TrainArgs),
    /// Destaca as entidades de um arquivo de texto
    Tag(TagArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Algoritmo de treino
    #[arg(long, default_value = "perceptron")]
    algorithm: Algorithm,

    /// Número de passadas pelo dataset de treino
    #[arg(long, default_value_t = 100)]
    max_iterations: usize,

    /// Raio da janela de features
    #[arg(long, default_value_t = wikiner_core::features::DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// Dataset de treino (.json ou .jsonl)
    #[arg(long)]
    train_data: PathBuf,

    /// Dataset de teste (.json ou .jsonl)
    #[arg(long)]
    test_data: PathBuf,

    /// Pasta onde o modelo é salvo
    #[arg(long, default_value = "output")]
    saving_path: PathBuf,
}

#[derive(Args)]
struct TagArgs {
    /// Arquivo .txt com o texto a analisar
    #[arg(long)]
    text: PathBuf,

    /// Modelo salvo pelo comando `train`
    #[arg(long)]
    model: PathBuf,

    /// Configuração de classes e cores (`.yaml`, `.yml` ou `.json`)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train(args) => train(args),
        Commands::Tag(args) => tag(args),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    fs::create_dir_all(&args.saving_path)
        .with_context(|| format!("não foi possível criar {}", args.saving_path.display()))?;

    let mut model = NerModel::new(TrainerConfig {
        algorithm: args.algorithm,
        max_iterations: args.max_iterations,
        window_size: args.window_size,
    });
    let model_path = args.saving_path.join(model.default_filename());

    info!(path = %args.train_data.display(), "carregando dataset de treino");
    let train_set = NerDataset::load(&args.train_data).context("dataset de treino")?;

    info!(path = %model_path.display(), "iniciando treino");
    model.fit(
        &train_set.features_with_window(model.window_size()),
        &train_set.labels()?,
    )?;
    model.save(&model_path)?;

    info!(path = %args.test_data.display(), "carregando dataset de teste");
    let test_set = NerDataset::load(&args.test_data).context("dataset de teste")?;
    let test_features = test_set.features_with_window(model.window_size());
    let test_labels = test_set.labels()?;

    let accuracy = model.score(&test_features, &test_labels)?;
    info!(accuracy, "acurácia no teste");

    let predicted = model.predict(&test_features)?;
    println!("{}", classification_report(&test_labels, &predicted)?);
    Ok(())
}

fn tag(args: TagArgs) -> Result<()> {
    let text = fs::read_to_string(&args.text)
        .with_context(|| format!("não foi possível ler {}", args.text.display()))?;
    let model = NerModel::load(&args.model).context("carregando o modelo")?;
    let config = match &args.config {
        Some(path) => ClassConfig::load(path)?,
        None => ClassConfig::default(),
    };

    let pipeline = NerPipeline::with_config(model, &config);
    println!("{}", pipeline.legend()?);
    println!("{}", pipeline.highlight(&text)?);
    Ok(())
}
