use magima_core::preset::{Preset, ALL_PRESETS};

pub fn run() {
    for preset in ALL_PRESETS {
        let marker = if preset == Preset::DEFAULT { " (default)" } else { "" };
        println!("{:<16} {}{marker}", preset.name(), preset.summary());
    }
}
