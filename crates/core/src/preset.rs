//! Named generation presets and the configuration resolver.
//!
//! Resolution is lenient: an unknown preset name falls back to the resolver's
//! default preset and logs a notice. Invalid resulting values are left for
//! [`crate::validation::validate`] to reject.

use crate::config::{GenerationConfig, GenerationOverrides};

/* --------------------------------------------------------------------------
   Presets
   -------------------------------------------------------------------------- */

/// A named, fixed [`GenerationConfig`] template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// 1920x1088, 121 frames, 40 steps, enhanced and templated.
    Kids1080p5Sec,
    /// 1280x736, 121 frames, 30 steps, enhanced and templated.
    Kids720p5Sec,
    /// 512x512, 25 frames, 20 steps, no prompt processing.
    FastTest,
    /// 704x480, 65 frames, 30 steps. Defaults of the HTTP API.
    ApiStandard,
    /// 256x256, 9 frames, 4 steps. Smallest useful render, used to warm up.
    Warmup,
}

/// Every preset, in display order.
pub const ALL_PRESETS: [Preset; 5] = [
    Preset::Kids1080p5Sec,
    Preset::Kids720p5Sec,
    Preset::FastTest,
    Preset::ApiStandard,
    Preset::Warmup,
];

/// Every preset name, in display order.
pub const PRESET_NAMES: [&str; 5] = [
    "kids-1080p-5sec",
    "kids-720p-5sec",
    "fast-test",
    "api-standard",
    "warmup",
];

impl Preset {
    /// The preset used when none (or an unknown one) is requested.
    pub const DEFAULT: Preset = Preset::Kids1080p5Sec;

    /// Stable name used on the CLI and in API requests.
    pub fn name(self) -> &'static str {
        match self {
            Self::Kids1080p5Sec => PRESET_NAMES[0],
            Self::Kids720p5Sec => PRESET_NAMES[1],
            Self::FastTest => PRESET_NAMES[2],
            Self::ApiStandard => PRESET_NAMES[3],
            Self::Warmup => PRESET_NAMES[4],
        }
    }

    /// Look up a preset by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_PRESETS.into_iter().find(|p| p.name() == name)
    }

    /// The stored configuration of this preset. Presets never carry a seed.
    pub fn config(self) -> GenerationConfig {
        match self {
            Self::Kids1080p5Sec => GenerationConfig {
                width: 1920,
                height: 1088,
                frame_count: 121,
                inference_steps: 40,
                guidance_scale: 7.5,
                seed: None,
                enhance_prompt: true,
                use_template: true,
            },
            Self::Kids720p5Sec => GenerationConfig {
                width: 1280,
                height: 736,
                frame_count: 121,
                inference_steps: 30,
                guidance_scale: 7.5,
                seed: None,
                enhance_prompt: true,
                use_template: true,
            },
            Self::FastTest => GenerationConfig {
                width: 512,
                height: 512,
                frame_count: 25,
                inference_steps: 20,
                guidance_scale: 7.5,
                seed: None,
                enhance_prompt: false,
                use_template: false,
            },
            Self::ApiStandard => GenerationConfig {
                width: 704,
                height: 480,
                frame_count: 65,
                inference_steps: 30,
                guidance_scale: 7.5,
                seed: None,
                enhance_prompt: true,
                use_template: false,
            },
            Self::Warmup => GenerationConfig {
                width: 256,
                height: 256,
                frame_count: 9,
                inference_steps: 4,
                guidance_scale: 7.5,
                seed: None,
                enhance_prompt: false,
                use_template: false,
            },
        }
    }

    /// One-line summary for help output.
    pub fn summary(self) -> String {
        let c = self.config();
        format!(
            "{}x{}, {} frames, {} steps, {}",
            c.width,
            c.height,
            c.frame_count,
            c.inference_steps,
            if c.enhance_prompt { "enhanced" } else { "no enhancement" }
        )
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/* --------------------------------------------------------------------------
   Resolver
   -------------------------------------------------------------------------- */

/// Merges a named preset with explicit overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigResolver {
    default_preset: Preset,
}

impl ConfigResolver {
    /// Create a resolver that falls back to `default_preset`.
    pub fn new(default_preset: Preset) -> Self {
        Self { default_preset }
    }

    /// The preset used when none or an unknown one is requested.
    pub fn default_preset(&self) -> Preset {
        self.default_preset
    }

    /// Pick the base preset for `name`, falling back leniently.
    pub fn base_preset(&self, name: Option<&str>) -> Preset {
        match name {
            None => self.default_preset,
            Some(name) => match Preset::from_name(name) {
                Some(preset) => {
                    tracing::info!(preset = %preset, "Using preset");
                    preset
                }
                None => {
                    tracing::warn!(
                        requested = name,
                        fallback = %self.default_preset,
                        "Unknown preset, falling back to default",
                    );
                    self.default_preset
                }
            },
        }
    }

    /// Produce a concrete configuration. Every present override wins.
    pub fn resolve(&self, name: Option<&str>, overrides: &GenerationOverrides) -> GenerationConfig {
        let mut config = self.base_preset(name).config();
        overrides.apply_to(&mut config);
        config
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn override_sets() -> Vec<GenerationOverrides> {
        vec![
            GenerationOverrides::default(),
            GenerationOverrides {
                width: Some(700),
                ..Default::default()
            },
            GenerationOverrides {
                height: Some(1024),
                frame_count: Some(17),
                ..Default::default()
            },
            GenerationOverrides {
                inference_steps: Some(0),
                guidance_scale: Some(3.0),
                seed: Some(7),
                ..Default::default()
            },
            GenerationOverrides {
                enhance_prompt: Some(false),
                use_template: Some(true),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn names_round_trip() {
        for preset in ALL_PRESETS {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("ultra-8k"), None);
    }

    #[test]
    fn identity_resolution_returns_stored_values() {
        let resolver = ConfigResolver::default();
        for preset in ALL_PRESETS {
            let resolved = resolver.resolve(Some(preset.name()), &GenerationOverrides::default());
            assert_eq!(resolved, preset.config(), "preset {preset}");
        }
    }

    #[test]
    fn present_overrides_win_absent_fields_keep_preset() {
        let resolver = ConfigResolver::default();
        for preset in ALL_PRESETS {
            let base = preset.config();
            for o in override_sets() {
                let c = resolver.resolve(Some(preset.name()), &o);
                assert_eq!(c.width, o.width.unwrap_or(base.width));
                assert_eq!(c.height, o.height.unwrap_or(base.height));
                assert_eq!(c.frame_count, o.frame_count.unwrap_or(base.frame_count));
                assert_eq!(
                    c.inference_steps,
                    o.inference_steps.unwrap_or(base.inference_steps)
                );
                assert_eq!(
                    c.guidance_scale,
                    o.guidance_scale.unwrap_or(base.guidance_scale)
                );
                assert_eq!(c.seed, o.seed.or(base.seed));
                assert_eq!(
                    c.enhance_prompt,
                    o.enhance_prompt.unwrap_or(base.enhance_prompt)
                );
                assert_eq!(c.use_template, o.use_template.unwrap_or(base.use_template));
            }
        }
    }

    #[test]
    fn missing_preset_uses_resolver_default() {
        let resolver = ConfigResolver::new(Preset::ApiStandard);
        let c = resolver.resolve(None, &GenerationOverrides::default());
        assert_eq!(c, Preset::ApiStandard.config());
    }

    #[test]
    fn unknown_preset_falls_back_without_failing() {
        let resolver = ConfigResolver::default();
        let c = resolver.resolve(Some("nonexistent"), &GenerationOverrides::default());
        assert_eq!(c, Preset::DEFAULT.config());
    }

    #[test]
    fn presets_never_carry_a_seed() {
        assert!(ALL_PRESETS.iter().all(|p| p.config().seed.is_none()));
    }

    #[test]
    fn summary_mentions_geometry() {
        assert_eq!(
            Preset::FastTest.summary(),
            "512x512, 25 frames, 20 steps, no enhancement"
        );
    }
}
