pub mod generate;
pub mod presets;
pub mod warmup;
