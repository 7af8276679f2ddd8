//! Preset commands: list, show, validate and save.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use stompbox_config::{
    ParamOverride, Preset, factory_presets, find_preset, is_factory_preset, list_presets_in,
    user_presets_dir,
};
use stompbox_core::EffectChain;
use stompbox_effects::Pedal;

#[derive(Args)]
pub struct PresetArgs {
    #[command(subcommand)]
    command: PresetCommand,
}

#[derive(Subcommand)]
enum PresetCommand {
    /// List factory and user presets
    List,

    /// Show the effects and parameters of a preset
    Show {
        /// Preset name or path
        name: String,
    },

    /// Check a preset file without running it
    Validate {
        /// Preset file
        file: PathBuf,
    },

    /// Write a preset, with optional changes, to a file
    Save {
        /// Preset name or path to start from
        name: String,

        /// Destination file
        file: PathBuf,

        /// Parameter change, e.g. "reverb.mix=20%"
        #[arg(long = "set", value_name = "EFFECT.PARAM=VALUE")]
        set: Vec<ParamOverride>,

        /// Name stored in the new file
        #[arg(long)]
        rename: Option<String>,
    },
}

pub fn run(args: PresetArgs) -> anyhow::Result<()> {
    match args.command {
        PresetCommand::List => list(),
        PresetCommand::Show { name } => show(&name),
        PresetCommand::Validate { file } => validate(&file),
        PresetCommand::Save { name, file, set, rename } => save(&name, &file, &set, rename),
    }
}

fn list() -> anyhow::Result<()> {
    println!("Factory presets:");
    for preset in factory_presets() {
        println!(
            "  {:10}  {}",
            preset.name.to_lowercase(),
            preset.description.as_deref().unwrap_or("")
        );
    }

    let dir = user_presets_dir();
    let user = list_presets_in(&dir);
    println!();
    println!("User presets ({}):", dir.display());
    if user.is_empty() {
        println!("  (none)");
    }
    for path in user {
        match Preset::load(&path) {
            Ok(preset) => println!("  {:10}  {}", preset.name, path.display()),
            Err(e) => println!("  {:10}  {e}", path.display()),
        }
    }
    Ok(())
}

fn show(name: &str) -> anyhow::Result<()> {
    let preset = find_preset(name).with_context(|| format!("loading preset '{name}'"))?;
    let origin = if is_factory_preset(name) { " (factory)" } else { "" };
    println!("{}{origin}", preset.name);
    if let Some(description) = &preset.description {
        println!("  {description}");
    }
    println!("  sample rate: {} Hz", preset.sample_rate);
    if preset.bypassed {
        println!("  chain bypassed");
    }
    println!();
    for (i, effect) in preset.iter().enumerate() {
        println!("  [{i}] {}", effect.display_type());
        for (key, value) in &effect.params {
            println!("        {key:12} = {value}");
        }
    }
    Ok(())
}

fn validate(file: &std::path::Path) -> anyhow::Result<()> {
    let preset = Preset::load(file).with_context(|| format!("loading {}", file.display()))?;
    preset
        .validate()
        .with_context(|| format!("preset '{}' is invalid", preset.name))?;
    println!("{}: ok ({} effects)", file.display(), preset.len());
    Ok(())
}

fn save(
    name: &str,
    file: &std::path::Path,
    set: &[ParamOverride],
    rename: Option<String>,
) -> anyhow::Result<()> {
    let preset = find_preset(name).with_context(|| format!("loading preset '{name}'"))?;
    let mut chain: EffectChain<Pedal> = preset
        .build_chain(preset.sample_rate as f32)
        .with_context(|| format!("building preset '{}'", preset.name))?;
    for o in set {
        let (effect, param, value) = o.resolve(&preset)?;
        chain.set_param(effect, param, value)?;
    }

    let mut saved = Preset::capture(rename.unwrap_or_else(|| preset.name.clone()), &chain);
    saved.description = preset.description.clone();
    saved.save(file)?;
    println!("Saved '{}' to {}", saved.name, file.display());
    Ok(())
}
