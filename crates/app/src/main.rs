use std::path::{Path, PathBuf};

use beamviz_core::{
    AppConfig, Layout, Recorder, RecordingSettings, SceneDescriptor, SceneInstance, SceneKind,
    Script, TracingRenderer,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> beamviz_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::List => run_list(),
        Commands::Render { scene, output } => run_render(scene, output.as_deref(), &config),
        Commands::Layout { scene } => run_layout(scene, &config),
        Commands::Script { input } => run_script(&input, &config),
    }
}

fn run_list() -> beamviz_core::Result<()> {
    for descriptor in SceneDescriptor::catalogue() {
        println!("{:<24} {}", descriptor.kind, descriptor.name);
    }
    Ok(())
}

fn run_render(scene: SceneKind, output: Option<&Path>, config: &AppConfig) -> beamviz_core::Result<()> {
    tracing::info!(%scene, ?output, "rendering scene");
    let instance = SceneInstance::build(scene, config)?;

    match output {
        Some(path) => {
            let mut recorder = Recorder::new(RecordingSettings {
                output_path: path.to_string_lossy().into_owned(),
                fps: config.frame.fps,
            });
            recorder.start()?;
            instance.play(&mut recorder)?;
            recorder.stop()?;
            recorder.save()
        }
        None => {
            let mut renderer = TracingRenderer::new(config.frame.clone());
            let clock = instance.play(&mut renderer)?;
            tracing::info!(seconds = clock.time_seconds, calls = renderer.calls(), "scene finished");
            Ok(())
        }
    }
}

fn run_layout(scene: SceneKind, config: &AppConfig) -> beamviz_core::Result<()> {
    let instance = SceneInstance::build(scene, config)?;
    println!("{}", serde_json::to_string_pretty(&instance.layout.summary())?);
    Ok(())
}

fn run_script(input: &Path, config: &AppConfig) -> beamviz_core::Result<()> {
    tracing::info!(?input, "running construction script");
    let script = Script::load(input)?;
    let mut layout = Layout::new(config.layout.clone());
    script.run(&mut layout)?;
    println!("{}", serde_json::to_string_pretty(&layout.summary())?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Lay out and play structural-engineering diagrams", long_about = None)]
struct Cli {
    /// JSON configuration file; defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available scenes.
    List,
    /// Play a scene. Without an output file every renderer call is logged.
    Render {
        scene: SceneKind,
        /// Write the ordered render calls to this JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the final bounds of every node in a scene.
    Layout { scene: SceneKind },
    /// Run a JSON construction script and print the resulting bounds.
    Script {
        /// Path to the script file.
        input: PathBuf,
    },
}
