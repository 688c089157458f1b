use anyhow::{Context, Result};
use magima_pipeline::{PipelineConfig, VideoGenerator};

pub async fn run(pipeline: &PipelineConfig) -> Result<()> {
    let generator = VideoGenerator::from_config(pipeline);
    let report = generator.warmup().await.context("Warmup failed")?;

    println!("Model load:  {:.1}s", report.load_time.as_secs_f32());
    println!(
        "Generation:  {:.1}s ({} frames)",
        report.generation_time.as_secs_f32(),
        report.frame_count
    );
    Ok(())
}
