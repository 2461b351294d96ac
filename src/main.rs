//! Headless LumaCanvas driver.
//!
//! Loads an image, applies grading values, optionally runs an AI transform
//! and exports the graded result.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use lumacanvas::{
    init_logging, CanvasController, ColorParameters, Config, Engine, HttpTransformService,
    LutPreset, SystemClock, TracingSink, BUILD_DATE, VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "lumacanvas", version, about = "Grade and AI-transform an image from the command line")]
struct Cli {
    /// Image to load
    image: PathBuf,

    /// Run an AI transform with this instruction
    #[arg(long)]
    prompt: Option<String>,

    /// Tool name reported with the transform
    #[arg(long, default_value = "relight")]
    tool: String,

    /// Remote engine (kontext-max or kontext-pro)
    #[arg(long)]
    engine: Option<Engine>,

    /// Configuration file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the exported image
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Skip the export step
    #[arg(long)]
    no_export: bool,

    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    contrast: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    saturation: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    tint: Option<f64>,

    /// Named look (vintage, film, cyberpunk, horror, warm, cool, cinematic)
    #[arg(long)]
    preset: Option<LutPreset>,
}

impl Cli {
    fn color_parameters(&self) -> ColorParameters {
        let mut params = ColorParameters::default();
        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("temperature", self.temperature),
            ("tint", self.tint),
        ] {
            if let Some(value) = value {
                params.set_by_name(name, value);
            }
        }
        if let Some(preset) = self.preset {
            params.preset = preset;
        }
        params
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    tracing::info!("LumaCanvas {} ({})", VERSION, BUILD_DATE);

    let mut config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(engine) = cli.engine {
        config.engine.engine = engine;
    }
    if let Some(dir) = &cli.export_dir {
        config.export.directory = dir.clone();
    }

    let service = HttpTransformService::new(
        config.engine.endpoints.clone(),
        config.engine.api_key(),
        config.engine.api_key_env.clone(),
        config.engine.request_timeout(),
    );
    let controller = CanvasController::from_config(
        &config,
        Arc::new(service),
        Arc::new(SystemClock),
        Box::new(TracingSink),
    );
    let forwarder = controller.spawn_state_forwarder();

    let bytes = std::fs::read(&cli.image)
        .with_context(|| format!("Failed to read {}", cli.image.display()))?;
    let file_name = cli
        .image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    controller.on_load_image(bytes, file_name);

    let params = cli.color_parameters();
    if !params.is_neutral() {
        controller.set_color_parameters(params);
    }

    if let Some(prompt) = cli.prompt.clone() {
        if let Some(task) = controller.on_run_transform(cli.tool.clone(), prompt) {
            let report = task.await.context("Transform task failed")?;
            println!("{}", report.outcome.message());
        }
    }

    if !cli.no_export {
        let path = controller.on_export().await.context("Export failed")?;
        println!("Exported {}", path.display());
    }

    forwarder.abort();
    Ok(())
}
