use std::path::{Path, PathBuf};

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use magima_core::config::{GenerationConfig, GenerationOverrides};
use magima_core::preset::{ConfigResolver, PRESET_NAMES};
use magima_pipeline::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "magima")]
#[command(about = "Text-to-video generation for short animated clips", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub endpoints: EndpointArgs,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Generate a video from a text prompt
    Generate(GenerateArgs),

    /// Load the model and render a tiny clip to check the setup
    Warmup,

    /// List the available presets
    Presets,
}

/// Collaborator locations. Unset flags fall back to the environment, then
/// to built-in defaults.
#[derive(Args, Debug, Default, PartialEq)]
pub struct EndpointArgs {
    /// Base URL of the diffusion model server
    #[arg(long, env = "MODEL_SERVER_URL", global = true)]
    pub model_server_url: Option<String>,

    /// Weights file the model server should load
    #[arg(long, env = "MODEL_PATH", global = true)]
    pub model_path: Option<String>,

    /// Base URL of the prompt enhancement model (empty disables enhancement)
    #[arg(long, env = "ENHANCER_URL", global = true)]
    pub enhancer_url: Option<String>,

    /// Enhancement model name
    #[arg(long, env = "ENHANCER_MODEL", global = true)]
    pub enhancer_model: Option<String>,

    /// ffmpeg executable
    #[arg(long, env = "FFMPEG_BIN", global = true)]
    pub ffmpeg: Option<String>,
}

impl EndpointArgs {
    /// Overlay explicit values on `base`.
    pub fn apply_to(&self, mut base: PipelineConfig) -> PipelineConfig {
        if let Some(url) = &self.model_server_url {
            base.model_server_url = url.clone();
        }
        if let Some(path) = &self.model_path {
            base.model_path = path.clone();
        }
        if let Some(url) = &self.enhancer_url {
            base.enhancer_url = (!url.trim().is_empty()).then(|| url.clone());
        }
        if let Some(model) = &self.enhancer_model {
            base.enhancer_model = model.clone();
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            base.ffmpeg_bin = ffmpeg.clone();
        }
        base
    }
}

#[derive(Args, Debug, PartialEq)]
pub struct GenerateArgs {
    /// Text prompt describing the scene
    #[arg(short, long)]
    pub prompt: String,

    /// Output directory
    #[arg(short, long, default_value = "outputs")]
    pub output: PathBuf,

    /// Preset configuration (default: kids-1080p-5sec)
    #[arg(long, value_parser = PossibleValuesParser::new(PRESET_NAMES))]
    pub preset: Option<String>,

    /// Video width, a multiple of 32
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Video height, a multiple of 32
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Number of frames, of the form 8n+1
    #[arg(short, long)]
    pub frames: Option<u32>,

    /// Inference steps
    #[arg(short, long)]
    pub steps: Option<u32>,

    /// Guidance scale
    #[arg(short, long)]
    pub guidance: Option<f32>,

    /// Random seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enhance the prompt with the language model
    #[arg(long)]
    pub enhance_prompt: bool,

    /// Disable prompt enhancement, overriding the preset
    #[arg(long)]
    pub no_enhance: bool,

    /// Wrap the prompt in the film-style template
    #[arg(long)]
    pub film_template: bool,

    /// Negative prompt (default: built-in blocklist)
    #[arg(short = 'n', long)]
    pub negative_prompt: Option<String>,
}

impl GenerateArgs {
    pub fn overrides(&self) -> GenerationOverrides {
        GenerationOverrides {
            width: self.width,
            height: self.height,
            frame_count: self.frames,
            inference_steps: self.steps,
            guidance_scale: self.guidance,
            seed: self.seed,
            enhance_prompt: self.enhance_prompt.then_some(true),
            use_template: self.film_template.then_some(true),
        }
    }

    /// Resolve the final configuration. `--no-enhance` wins over everything.
    pub fn resolve(&self, resolver: &ConfigResolver) -> GenerationConfig {
        let mut config = resolver.resolve(self.preset.as_deref(), &self.overrides());
        if self.no_enhance {
            config.enhance_prompt = false;
        }
        config
    }
}

/// `{dir}/video_{YYYYmmdd_HHMMSS}.mp4`
pub fn timestamped_output(dir: &Path, now: chrono::DateTime<chrono::Local>) -> PathBuf {
    dir.join(format!("video_{}.mp4", now.format("%Y%m%d_%H%M%S")))
}
