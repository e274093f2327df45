use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use runpace::{
    CounterProvider, CpuInstance, DisplaySink, FrameSetRegistry, IndicatorSession, LogSink,
    MetricSampler, PngFileSink, ProcStatProvider, RatePreset, SamplerOpts, Settings, SubjectSpec,
    ThemePreference,
};

#[derive(Parser, Debug)]
#[command(name = "runpace", version, about = "CPU-load driven icon animation")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Counter source file.
    #[arg(long, global = true, default_value = "/proc/stat")]
    proc_stat: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List selectable CPU instances, aggregate first.
    Instances,
    /// Print CPU load samples.
    Sample(SampleArgs),
    /// Print the load -> frame interval table.
    Curve(CurveArgs),
    /// Run the indicator against a directory of frame PNGs.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// CPU instance (`_Total` or a core id).
    #[arg(long, default_value = "_Total")]
    instance: String,

    /// Number of samples.
    #[arg(long, default_value_t = 5)]
    count: u32,

    /// Delay between samples in milliseconds.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

#[derive(Args, Debug)]
struct CurveArgs {
    /// Subject frame count (>= 30 selects the extended curve).
    #[arg(long, default_value_t = 5)]
    frames: usize,

    /// Rate preset (10fps, 20fps, 30fps, 40fps).
    #[arg(long, default_value = "40fps")]
    rate: RatePreset,

    /// Load step in percent.
    #[arg(long, default_value_t = 10)]
    step: u32,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory of `<theme>_<subject>_<index>.png` frames.
    #[arg(long)]
    assets: PathBuf,

    /// Settings JSON. CLI flags override its values.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the current frame to this PNG path instead of logging it.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Stop after this many seconds.
    #[arg(long, default_value_t = 10)]
    seconds: u64,

    /// CPU instance override.
    #[arg(long)]
    instance: Option<String>,

    /// Theme override (system, light, dark).
    #[arg(long)]
    theme: Option<ThemePreference>,

    /// Subject name override.
    #[arg(long)]
    subject: Option<String>,

    /// Subject frame count override.
    #[arg(long)]
    frames: Option<usize>,

    /// Rate preset override.
    #[arg(long)]
    rate: Option<RatePreset>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let provider: Arc<dyn CounterProvider> = Arc::new(ProcStatProvider::new(&cli.proc_stat));
    match cli.cmd {
        Command::Instances => cmd_instances(provider.as_ref()),
        Command::Sample(args) => cmd_sample(provider, args),
        Command::Curve(args) => cmd_curve(args),
        Command::Run(args) => cmd_run(provider, args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_instances(provider: &dyn CounterProvider) -> anyhow::Result<()> {
    for inst in runpace::list_available_instances(provider) {
        println!("{}\t{}", inst.id(), inst.display_name());
    }
    Ok(())
}

fn cmd_sample(provider: Arc<dyn CounterProvider>, args: SampleArgs) -> anyhow::Result<()> {
    let mut sampler = MetricSampler::initialize(
        provider,
        CpuInstance::parse(&args.instance),
        SamplerOpts::default(),
    )
    .context("open cpu counters")?;

    for _ in 0..args.count {
        std::thread::sleep(Duration::from_millis(args.interval_ms));
        let sample = sampler.sample();
        println!("{}", sample.description(sampler.instance()));
        for line in sample.indicator_lines().iter().skip(1) {
            println!("{line}");
        }
    }
    Ok(())
}

fn cmd_curve(args: CurveArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.frames > 0, "--frames must be >= 1");
    anyhow::ensure!(args.step > 0, "--step must be >= 1");

    let rate = args.rate.rate();
    println!("load%\tspeed\tinterval_ms");
    let mut load = 0u32;
    while load <= 100 {
        let l = load as f32;
        println!(
            "{load}\t{:.2}\t{}",
            runpace::speed(l, args.frames, rate).max(1.0),
            runpace::compute_interval_ms(l, args.frames, rate)
        );
        load += args.step;
    }
    Ok(())
}

fn cmd_run(provider: Arc<dyn CounterProvider>, args: RunArgs) -> anyhow::Result<()> {
    let mut settings = match &args.settings {
        Some(path) => Settings::from_path(path)?,
        None => Settings::default(),
    };
    if let Some(instance) = &args.instance {
        settings.cpu_instance = instance.clone();
    }
    if let Some(theme) = args.theme {
        settings.theme = theme;
    }
    if let Some(name) = &args.subject {
        settings.subject = SubjectSpec::new(name, settings.subject.frame_count);
    }
    if let Some(frames) = args.frames {
        settings.subject.frame_count = frames;
    }
    if let Some(rate) = args.rate {
        settings.rate = rate;
    }

    let registry = Arc::new(FrameSetRegistry::load_dir(&args.assets)?);
    let duration = Duration::from_secs(args.seconds);
    match &args.out {
        Some(out) => run_session(&settings, provider, registry, PngFileSink::new(out), duration),
        None => run_session(&settings, provider, registry, LogSink::new(), duration),
    }
}

fn run_session<S: DisplaySink + 'static>(
    settings: &Settings,
    provider: Arc<dyn CounterProvider>,
    registry: Arc<FrameSetRegistry>,
    sink: S,
    duration: Duration,
) -> anyhow::Result<()> {
    let mut session = IndicatorSession::new(settings, provider, registry, sink)
        .context("create indicator session")?;
    if session.player().frame_count() == 0 {
        tracing::warn!(
            subject = %settings.subject.name,
            "no frames found for subject; the indicator will stay blank"
        );
    }
    session.start()?;
    std::thread::sleep(duration);
    println!("{}", session.status_text());
    session.shutdown()?;
    Ok(())
}
