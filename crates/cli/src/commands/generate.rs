use anyhow::{Context, Result};
use magima_core::preset::ConfigResolver;
use magima_pipeline::{GenerationRequest, PipelineConfig, VideoGenerator};

use magima_cli::{timestamped_output, GenerateArgs};

pub async fn run(args: GenerateArgs, pipeline: &PipelineConfig) -> Result<()> {
    let config = args.resolve(&ConfigResolver::default());
    let output = timestamped_output(&args.output, chrono::Local::now());

    tracing::info!(
        prompt = %args.prompt,
        width = config.width,
        height = config.height,
        frames = config.frame_count,
        duration_secs = config.duration_secs(),
        steps = config.inference_steps,
        guidance = config.guidance_scale,
        enhance = config.enhance_prompt,
        template = config.use_template,
        "Generation settings",
    );

    let generator = VideoGenerator::from_config(pipeline);
    let request = GenerationRequest {
        prompt: args.prompt,
        negative_prompt: args.negative_prompt,
        config,
    };

    let report = generator
        .run(&request, &output)
        .await
        .context("Video generation failed")?;

    tracing::info!(
        elapsed_secs = report.elapsed.as_secs_f32(),
        frames = report.frame_count,
        "Done",
    );
    println!("{}", report.output_path.display());
    Ok(())
}
