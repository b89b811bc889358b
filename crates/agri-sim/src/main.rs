use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use agri_core::LocationId;
use agri_service::init_tracing;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;

use dataset::Workspace;

mod dataset;

#[derive(Parser, Debug)]
#[command(name = "agri-sim", about = "Crop sowing and harvest schedule planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train and store the climate forecaster of a location.
    TrainForecaster(LocationArgs),
    /// Extend a location's climate past its last observation.
    Forecast(ForecastArgs),
    /// Train yield models for one crop or for every crop.
    TrainYield(TrainYieldArgs),
    /// Search the best sowing and harvest months for a crop at a location.
    Optimize(OptimizeArgs),
    /// Clean the dataset's yield records and print the derived crops.
    PrepareCrops(CommonArgs),
}

#[derive(ClapArgs, Debug)]
struct CommonArgs {
    /// JSON dataset with locations, climate, drivers and yield records.
    #[arg(long)]
    data: PathBuf,
    /// Optional YAML pipeline configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding trained model artifacts.
    #[arg(long, default_value = "artifacts")]
    artifacts: PathBuf,
    /// Write the JSON result to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct LocationArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Location identifier.
    #[arg(long)]
    location: u64,
}

#[derive(ClapArgs, Debug)]
struct ForecastArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Location identifier.
    #[arg(long)]
    location: u64,
    /// Months to forecast; defaults to the configured horizon.
    #[arg(long)]
    horizon: Option<usize>,
}

#[derive(ClapArgs, Debug)]
struct TrainYieldArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Crop name; every crop in the dataset when omitted.
    #[arg(long)]
    crop: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct OptimizeArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Crop name.
    #[arg(long)]
    crop: String,
    /// Location identifier.
    #[arg(long)]
    location: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing("info");
    let cli = Cli::parse();
    match cli.command {
        Command::TrainForecaster(args) => train_forecaster(args).await,
        Command::Forecast(args) => forecast(args).await,
        Command::TrainYield(args) => train_yield(args).await,
        Command::Optimize(args) => optimize(args).await,
        Command::PrepareCrops(args) => prepare_crops(args).await,
    }
}

fn open(common: &CommonArgs) -> Result<Workspace, Box<dyn Error>> {
    Workspace::open(&common.data, common.config.as_deref(), &common.artifacts)
}

async fn train_forecaster(args: LocationArgs) -> Result<(), Box<dyn Error>> {
    let workspace = open(&args.common)?;
    let summary = workspace
        .planner
        .train_generative_model(LocationId::from_raw(args.location))
        .await?;
    emit(args.common.out.as_deref(), &summary)
}

async fn forecast(args: ForecastArgs) -> Result<(), Box<dyn Error>> {
    let workspace = open(&args.common)?;
    let horizon = args
        .horizon
        .unwrap_or(workspace.planner.config().horizon_months);
    let frame = workspace
        .planner
        .generate_forecast(LocationId::from_raw(args.location), horizon)
        .await?;
    emit(args.common.out.as_deref(), &frame)
}

async fn train_yield(args: TrainYieldArgs) -> Result<(), Box<dyn Error>> {
    let workspace = open(&args.common)?;
    workspace.prepare().await?;
    let result = match &args.crop {
        Some(crop) => {
            let metrics = workspace.planner.train_yield_model(crop).await?;
            serde_json::to_value(BTreeMap::from([(crop.clone(), metrics)]))?
        }
        None => serde_json::to_value(workspace.planner.train_all_yield_models().await?)?,
    };
    emit(args.common.out.as_deref(), &result)
}

async fn optimize(args: OptimizeArgs) -> Result<(), Box<dyn Error>> {
    let workspace = open(&args.common)?;
    workspace.prepare().await?;
    let report = workspace
        .planner
        .optimize_schedule(&args.crop, LocationId::from_raw(args.location))
        .await?;
    if let Some(best) = report.top.first() {
        info!(sowing = %best.sowing, harvest = %best.harvest, "best schedule");
    }
    emit(args.common.out.as_deref(), &report)
}

async fn prepare_crops(args: CommonArgs) -> Result<(), Box<dyn Error>> {
    let workspace = open(&args)?;
    let prepared = workspace.prepare().await?;
    emit(args.out.as_deref(), &prepared)
}

fn emit<T: serde::Serialize>(out: Option<&Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
