//! Effect listing and parameter tables.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use stompbox_config::format_param_value;
use stompbox_core::ParamDescriptor;
use stompbox_effects::EffectKind;

#[derive(Args)]
pub struct EffectsArgs {
    /// Show the parameter table of one effect
    #[arg(value_name = "EFFECT")]
    effect: Option<String>,
}

pub fn run(args: EffectsArgs) -> anyhow::Result<()> {
    match &args.effect {
        Some(name) => {
            let kind = EffectKind::from_id(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown effect: {name}"))?;
            print_params(kind);
        }
        None => print_list(),
    }
    Ok(())
}

fn print_list() {
    println!("Available Effects");
    println!("=================");
    println!();
    println!("  {:12}  {:12}  {:10}  {}", "ID", "Name", "Category", "Description");
    println!("  {:12}  {:12}  {:10}  {}", "--", "----", "--------", "-----------");
    for kind in EffectKind::ALL {
        println!(
            "  {:12}  {:12}  {:10}  {}",
            kind.id(),
            kind.name(),
            kind.category().name(),
            kind.description()
        );
    }
    println!();
    println!("Use 'stompbox effects <ID>' for parameters.");
}

fn print_params(kind: EffectKind) {
    println!("{} ({})", kind.name(), kind.id());
    println!("{}", "=".repeat(kind.name().len() + kind.id().len() + 3));
    println!();
    println!("{}", kind.description());
    println!();
    println!("  {:12}  {:12}  {:22}  {}", "Parameter", "Default", "Range", "Unit");
    println!("  {:12}  {:12}  {:22}  {}", "---------", "-------", "-----", "----");
    for desc in kind.params() {
        println!(
            "  {:12}  {:12}  {:22}  {}",
            desc.string_id,
            format_param_value(desc, desc.default),
            range(desc),
            desc.unit.suffix().trim()
        );
    }

    if let Some(first) = kind.params().first() {
        println!();
        println!("Example:");
        println!(
            "  stompbox process in.wav out.wav --set {}.{}={}",
            kind.id(),
            first.string_id,
            format_param_value(first, first.default)
        );
    }
}

fn range(desc: &ParamDescriptor) -> String {
    format!(
        "{} .. {}",
        format_param_value(desc, desc.min),
        format_param_value(desc, desc.max)
    )
}
