//! CLI for scenegen - place a reference image into a generated scene.

use clap::{Args, Parser, Subcommand, ValueEnum};
use scenegen::{
    BorderState, GeminiModel, GeminiProvider, GeneratedImage, PageController, PreviewHandle,
    SceneConfig, SceneService, UploadCandidate, View,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenegen")]
#[command(about = "Compose a reference image into a generated scene via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a scene around the subject of an input image
    Compose(ComposeArgs),

    /// Verify the API key and model are usable
    Check(ServiceArgs),
}

#[derive(Args)]
struct ServiceArgs {
    /// Gemini model to use (overrides the config file; default nano-banana)
    #[arg(short, long, value_enum)]
    model: Option<ModelArg>,

    /// API key (falls back to GOOGLE_API_KEY)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args)]
struct ComposeArgs {
    /// Reference image
    input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    service: ServiceArgs,

    /// JSON configuration file (prompt, labels and model)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replace the scene prompt
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the scene prompt from a file
    #[arg(long)]
    prompt_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

/// Terminal rendition of the page: status lines and alerts on stderr.
struct TerminalView {
    quiet: bool,
}

impl TerminalView {
    fn status(&self, line: &str) {
        if !self.quiet {
            eprintln!("{line}");
        }
    }
}

impl View for TerminalView {
    fn alert(&mut self, message: &str) {
        eprintln!("error: {message}");
    }

    fn show_preview(&mut self, preview: &PreviewHandle) {
        self.status(&format!("Selected {}", preview.name));
    }

    fn revoke_preview(&mut self, _preview: &PreviewHandle) {}

    fn set_placeholder_prompt_visible(&mut self, _visible: bool) {}

    fn set_trigger(&mut self, _enabled: bool, _label: &str) {}

    fn set_progress_visible(&mut self, visible: bool) {
        if visible {
            self.status("Generating scene...");
        }
    }

    fn show_result(&mut self, image: &GeneratedImage) {
        if let Some(caption) = &image.caption {
            self.status(caption);
        }
    }

    fn show_result_placeholder(&mut self) {}

    fn set_border(&mut self, _border: BorderState) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compose(args) => compose(args, cli.json).await,
        Commands::Check(args) => {
            check(args, cli.json).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_provider(args: &ServiceArgs, fallback: GeminiModel) -> anyhow::Result<GeminiProvider> {
    let model = args.model.map(GeminiModel::from).unwrap_or(fallback);
    let mut builder = GeminiProvider::builder().model(model);
    if let Some(key) = &args.api_key {
        builder = builder.api_key(key);
    }
    Ok(builder.build()?)
}

fn load_config(args: &ComposeArgs) -> anyhow::Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => SceneConfig::from_env(),
    };
    if let Some(prompt) = &args.prompt {
        config = config.with_prompt(prompt);
    }
    if let Some(path) = &args.prompt_file {
        config = config.with_prompt_file(path)?;
    }
    Ok(config)
}

/// Runs the page flow once. Failures inside the flow are already shown by
/// the view's alert, so they only turn into a failing exit code here.
async fn compose(args: ComposeArgs, json_output: bool) -> anyhow::Result<ExitCode> {
    let config = load_config(&args)?;
    let provider = build_provider(&args.service, config.model)?;
    let view = TerminalView { quiet: json_output };

    let mut page = PageController::new(provider, view, config);
    if page
        .select_file(UploadCandidate::from_path(&args.input))
        .await
        .is_err()
    {
        return Ok(ExitCode::FAILURE);
    }
    if page.generate().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    let Some(image) = page.state().result() else {
        anyhow::bail!("no scene image was produced");
    };
    image.save(&args.output)?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "input": args.input.display().to_string(),
            "output": args.output.display().to_string(),
            "size_bytes": image.size(),
            "media_type": image.media_type,
            "model": image.model,
            "duration_ms": image.duration_ms,
            "caption": image.caption,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated scene: {} ({} bytes) via {}",
            args.output.display(),
            image.size(),
            page.service().name()
        );
        if let Some(duration) = image.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn check(args: ServiceArgs, json_output: bool) -> anyhow::Result<()> {
    let provider = build_provider(&args, GeminiModel::default())?;
    provider.health_check().await?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "provider": provider.name(),
            "model": provider.model().as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{} ready ({})", provider.name(), provider.model());
    }
    Ok(())
}
