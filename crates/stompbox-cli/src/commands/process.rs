//! Host simulator: a WAV file through the engine on simulated codec timing.
//!
//! A codec thread plays the interrupt side: every block period it calls
//! [`InterruptPort::on_transfer_complete`] and wakes the engine. An engine
//! thread runs [`AudioEngine::run`]. Without `--realtime` the codec waits
//! for each block to be processed instead of keeping time, so the run is
//! as fast as the chain allows and never under- or overruns.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ScopedJoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use stompbox_config::{EngineSettings, ParamOverride, Preset, find_preset, get_factory_preset};
use stompbox_core::{BLOCK_SIZE, ControlSurface, EffectChain, EffectId, ParameterBus, StatusBoard};
use stompbox_effects::Pedal;
use stompbox_engine::{
    AudioEngine, AudioPipeline, BufferPool, EngineStats, LoggingObserver, Notify, Signal, StdClock,
};

use crate::codec::FileCodec;
use crate::stall::Staller;
use crate::wav::{read_wav, write_wav};

/// Blocks in flight per direction.
const QUEUE_DEPTH: usize = 4;

/// Length of a `--slow-block` stall, in block periods.
const STALL_PERIODS: f32 = 3.0;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (mono, 32-bit float)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset file or name (default: the "clean" factory preset)
    #[arg(short, long)]
    preset: Option<String>,

    /// Parameter change applied before the first block, e.g. "echo.time=500ms"
    #[arg(long = "set", value_name = "EFFECT.PARAM=VALUE")]
    set: Vec<ParamOverride>,

    /// Start with the whole chain bypassed
    #[arg(long)]
    chain_bypass: bool,

    /// Pace the codec at the real block period
    #[arg(long)]
    realtime: bool,

    /// Stall the engine while it processes block N (0-based)
    #[arg(long, value_name = "N")]
    slow_block: Option<u64>,

    /// Engine settings file with an [engine] table
    #[arg(long, value_name = "FILE")]
    engine: Option<PathBuf>,

    /// Percent of the block period a block may take
    #[arg(long, value_name = "PERCENT")]
    deadline_margin: Option<f32>,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let (samples, sample_rate) = read_wav(&args.input)?;
    println!(
        "Read {}: {} samples, {} Hz, {:.2}s",
        args.input.display(),
        samples.len(),
        sample_rate,
        samples.len() as f32 / sample_rate as f32
    );

    let preset = load_preset(args.preset.as_deref())?;
    let mut settings = match &args.engine {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineSettings::default(),
    };
    if settings.sample_rate != sample_rate {
        tracing::debug!(
            configured = settings.sample_rate,
            file = sample_rate,
            "using the input file's sample rate"
        );
        settings.sample_rate = sample_rate;
    }
    if settings.queue_depth != QUEUE_DEPTH {
        tracing::warn!(
            configured = settings.queue_depth,
            compiled = QUEUE_DEPTH,
            "queue_depth is fixed at build time"
        );
    }
    if let Some(margin) = args.deadline_margin {
        settings.deadline_margin = margin;
    }
    let config = settings.to_engine_config()?;

    let overrides = args
        .set
        .iter()
        .map(|o| {
            o.resolve(&preset)
                .with_context(|| format!("--set {}.{}={}", o.effect, o.param, o.value))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut chain: EffectChain<Staller<Pedal>> = preset
        .build_chain_with(config.sample_rate, Staller::new)
        .with_context(|| format!("building preset '{}'", preset.name))?;
    if let Some(block) = args.slow_block {
        let stall = Duration::from_secs_f32(config.block_period_secs() * STALL_PERIODS);
        match chain.slot_mut(EffectId(0)) {
            Some(slot) => slot.effect_mut().stall_on(block, stall),
            None => tracing::warn!("--slow-block ignored: the chain is empty"),
        }
    }

    let bus = ParameterBus::for_chain(&chain).context("chain does not fit the parameter bus")?;
    let mut surface = ControlSurface::new(&bus);
    surface.attach(LoggingObserver::new("cli"));
    for (effect, param, value) in overrides {
        surface.set(effect, param, value)?;
    }
    if args.chain_bypass {
        surface.set_chain_bypass(true);
    }

    println!(
        "Preset: {} [{}]",
        preset.name,
        preset.effect_types().join(" > ")
    );

    let stats = EngineStats::new();
    let board = StatusBoard::new();
    let mut engine = AudioEngine::new(chain, &bus, StdClock::new(), &stats, config)?
        .with_status_board(&board);
    let latency = engine.chain().latency_samples();

    // one block of hand-off delay, the chain's own latency, and room for
    // everything still queued when the input runs out
    let ticks = (samples.len() + latency).div_ceil(BLOCK_SIZE) + QUEUE_DEPTH + 1;
    let period = Duration::from_secs_f32(config.block_period_secs());

    let interrupted = Arc::new(AtomicBool::new(false));
    if args.realtime {
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
    }

    let progress = ProgressBar::new(ticks as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} blocks")?
            .progress_chars("##-"),
    );

    let signal = Signal::default();
    let stop = AtomicBool::new(false);
    let mut pool = BufferPool::<QUEUE_DEPTH>::new();
    let mut pipeline = AudioPipeline::new(&mut pool);
    let (mut isr, mut port) = pipeline.split(&stats);
    let mut codec = FileCodec::new(&samples, ticks * BLOCK_SIZE);

    std::thread::scope(|s| {
        let engine_thread = s.spawn(|| engine.run(&mut port, &signal, &stop));

        let mut deadline = Instant::now();
        for tick in 0..ticks {
            if interrupted.load(Ordering::Relaxed) || engine_thread.is_finished() {
                break;
            }
            isr.on_transfer_complete(&mut codec);
            signal.notify();
            progress.inc(1);

            if args.realtime {
                deadline += period;
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
            } else {
                wait_for_engine(&stats, tick as u32 + 1, &engine_thread);
            }
        }

        stop.store(true, Ordering::Release);
        signal.notify();
    });
    progress.finish_and_clear();

    let snapshot = stats.snapshot();
    let played = codec.into_played();
    let keep = (samples.len() + latency).min(played.len().saturating_sub(BLOCK_SIZE));
    let output = played.get(BLOCK_SIZE..BLOCK_SIZE + keep).unwrap_or_default();
    write_wav(&args.output, output, sample_rate)?;
    println!("Wrote {} ({} samples)", args.output.display(), output.len());

    println!();
    println!("Engine:");
    println!("{snapshot}");
    println!("budget:            {} ns per block", engine.budget_ticks());
    println!("chain latency:     {latency} samples");

    let status = board.snapshot();
    for effect in status.effects() {
        let name = engine
            .chain()
            .slot(effect.id)
            .map(|slot| slot.effect().inner().kind().id())
            .unwrap_or("?");
        let state = if effect.bypassed { "bypassed" } else { effect.lifecycle.label() };
        println!("  [{}] {name:<10} {state}  {}", effect.id.0, effect.error.label());
    }
    if status.faulted() > 0 {
        tracing::warn!(faulted = status.faulted(), "some effects faulted and were bypassed");
    }
    if interrupted.load(Ordering::Relaxed) {
        println!("Interrupted; output is truncated.");
    }
    Ok(())
}

fn load_preset(name: Option<&str>) -> anyhow::Result<Preset> {
    match name {
        Some(name) => find_preset(name).with_context(|| format!("loading preset '{name}'")),
        None => get_factory_preset("clean").context("factory preset 'clean' is missing"),
    }
}

/// Lock-step mode: returns once the engine has accounted for `issued`
/// captured blocks.
fn wait_for_engine(stats: &EngineStats, issued: u32, engine: &ScopedJoinHandle<'_, ()>) {
    loop {
        let snap = stats.snapshot();
        if snap.blocks + snap.overruns >= issued || engine.is_finished() {
            return;
        }
        std::thread::yield_now();
    }
}
