//! Presets compiled into the library.
//!
//! Always available without files on disk; also the starting points
//! `stompbox preset save` writes out.

use crate::Preset;

/// Factory preset keys, in listing order.
pub static FACTORY_PRESET_NAMES: &[&str] = &["clean", "crunch", "ambient", "lead"];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("clean", CLEAN_PRESET),
    ("crunch", CRUNCH_PRESET),
    ("ambient", AMBIENT_PRESET),
    ("lead", LEAD_PRESET),
];

const CLEAN_PRESET: &str = r#"
name = "Clean"
description = "Light compression, cabinet and a touch of room"
sample_rate = 48000

[[effects]]
type = "compressor"
[effects.params]
threshold = "-24dB"
ratio = "3"
attack = "15ms"
release = "150ms"
makeup = "3dB"

[[effects]]
type = "eq"
[effects.params]
low = "1dB"
high = "2dB"

[[effects]]
type = "cabinet"
[effects.params]
high_cut = "7kHz"

[[effects]]
type = "reverb"
[effects.params]
decay = "35%"
mix = "15%"
"#;

const CRUNCH_PRESET: &str = r#"
name = "Crunch"
description = "Mid-gain rhythm drive into a 4x12"
sample_rate = 48000

[[effects]]
type = "overdrive"
[effects.params]
drive = "18dB"
tone = "2.8kHz"
level = "-9dB"

[[effects]]
type = "eq"
[effects.params]
mid = "3dB"
mid_freq = "700Hz"

[[effects]]
type = "cabinet"

[[effects]]
type = "!echo"
[effects.params]
time = "120ms"
feedback = "15%"
mix = "20%"
"#;

const AMBIENT_PRESET: &str = r#"
name = "Ambient"
description = "Slow tremolo into long echoes and a big hall"
sample_rate = 48000

[[effects]]
type = "compressor"
[effects.params]
threshold = "-30dB"
ratio = "2"

[[effects]]
type = "tremolo"
[effects.params]
rate = "2Hz"
depth = "35%"

[[effects]]
type = "echo"
[effects.params]
time = "480ms"
feedback = "55%"
mix = "35%"

[[effects]]
type = "reverb"
[effects.params]
decay = "85%"
predelay = "40ms"
size = "90%"
damping = "30%"
mix = "45%"
"#;

const LEAD_PRESET: &str = r#"
name = "Lead"
description = "Compressed high-gain lead with a dotted echo"
sample_rate = 48000

[[effects]]
type = "compressor"
[effects.params]
threshold = "-20dB"
ratio = "6"
attack = "5ms"
makeup = "6dB"

[[effects]]
type = "overdrive"
[effects.params]
drive = "32dB"
tone = "3.5kHz"
level = "-14dB"

[[effects]]
type = "cabinet"
[effects.params]
resonance = "5dB"
presence = "3dB"

[[effects]]
type = "echo"
[effects.params]
time = "375ms"
feedback = "35%"
mix = "25%"

[[effects]]
type = "reverb"
[effects.params]
decay = "45%"
mix = "20%"
"#;

/// All factory presets, parsed.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Factory preset by key or display name (case-insensitive).
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
    {
        return Preset::from_toml(toml).ok();
    }
    factory_presets()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// True if `name` is a factory preset key.
pub fn is_factory_preset(name: &str) -> bool {
    FACTORY_PRESET_NAMES.iter().any(|key| key.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stompbox_core::EffectChain;
    use stompbox_effects::Pedal;

    #[test]
    fn every_factory_preset_parses_and_validates() {
        assert_eq!(factory_presets().len(), FACTORY_PRESET_NAMES.len());
        for preset in factory_presets() {
            preset.validate().unwrap_or_else(|e| panic!("{}: {e}", preset.name));
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(get_factory_preset("CRUNCH").unwrap().name, "Crunch");
        assert_eq!(get_factory_preset("Ambient").unwrap().name, "Ambient");
        assert!(get_factory_preset("metal").is_none());
        assert!(is_factory_preset("Lead"));
        assert!(!is_factory_preset("lead.toml"));
    }

    #[test]
    fn crunch_echo_starts_bypassed() {
        let preset = get_factory_preset("crunch").unwrap();
        let chain: EffectChain<Pedal> = preset.build_chain(48000.0).unwrap();
        let echo = chain.iter().last().map(|(_, slot)| slot.is_bypassed());
        assert_eq!(echo, Some(true));
    }
}
