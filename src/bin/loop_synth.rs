use std::fs::File;
use std::io::{self, BufRead, BufWriter};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use log::info;

use loop_synth::host::{list_devices, print_devices, AudioHost, StreamOptions};
use loop_synth::{
    bounce, playback_engine, synthesis_engine, EngineConfig, RenderEngine, SampleBuffer,
    StopSignal,
};

const STOP_POLL: Duration = Duration::from_millis(50);
const DEFAULT_BOUNCE_SECONDS: f32 = 2.0;

const USAGE: &str = "usage: loop_synth [--config <file.json>] <command>

commands:
  devices                                    list audio devices
  play <file>                                loop a mono WAV/AIFF file until Enter is pressed
  synth                                      run the wavetable oscillator until Enter is pressed
  bounce <out.wav> [--seconds S] [--input <file>]
                                             render offline to a 32-bit float WAV";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Devices,
    Play {
        file: PathBuf,
    },
    Synth,
    Bounce {
        out: PathBuf,
        seconds: f32,
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Cli {
    config: Option<PathBuf>,
    command: Command,
}

fn parse_args<I>(args: I) -> anyhow::Result<Cli>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut positional = Vec::new();
    let mut seconds = None;
    let mut input = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config needs a file path")?;
                config = Some(PathBuf::from(value));
            }
            "--seconds" => {
                let value = args.next().context("--seconds needs a value")?;
                let parsed: f32 = value
                    .parse()
                    .with_context(|| format!("invalid --seconds value '{}'", value))?;
                if !parsed.is_finite() || parsed < 0.0 {
                    bail!("--seconds must be a non-negative number, got {}", value);
                }
                seconds = Some(parsed);
            }
            "--input" => {
                let value = args.next().context("--input needs a file path")?;
                input = Some(PathBuf::from(value));
            }
            "-h" | "--help" => bail!("{}", USAGE),
            flag if flag.starts_with("--") => bail!("unknown option '{}'\n\n{}", flag, USAGE),
            _ => positional.push(arg),
        }
    }

    let is_bounce = positional.first().map(String::as_str) == Some("bounce");
    if !is_bounce && (seconds.is_some() || input.is_some()) {
        bail!("--seconds and --input only apply to bounce");
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("devices") => Command::Devices,
        Some("play") => Command::Play {
            file: positional
                .next()
                .map(PathBuf::from)
                .context("play needs an audio file")?,
        },
        Some("synth") => Command::Synth,
        Some("bounce") => Command::Bounce {
            out: positional
                .next()
                .map(PathBuf::from)
                .context("bounce needs an output path")?,
            seconds: seconds.unwrap_or(DEFAULT_BOUNCE_SECONDS),
            input,
        },
        Some(other) => bail!("unknown command '{}'\n\n{}", other, USAGE),
        None => bail!("{}", USAGE),
    };

    if let Some(extra) = positional.next() {
        bail!("unexpected argument '{}'", extra);
    }
    Ok(Cli { config, command })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = parse_args(std::env::args().skip(1))?;
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Devices => {
            let devices = list_devices().context("failed to list audio devices")?;
            print_devices(&devices);
        }
        Command::Play { file } => {
            let devices = list_devices().context("failed to list audio devices")?;
            print_devices(&devices);

            let buffer = SampleBuffer::load(&file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            let engine = playback_engine(buffer, &config)?;
            let options = StreamOptions {
                output_device: config.output_device,
                input_device: None,
            };
            run_live(engine, options)?;
        }
        Command::Synth => {
            let devices = list_devices().context("failed to list audio devices")?;
            print_devices(&devices);

            let engine = synthesis_engine(&config)?;
            let options = StreamOptions {
                output_device: config.output_device,
                input_device: config.synth.pass_through.then_some(config.input_device),
            };
            run_live(engine, options)?;
        }
        Command::Bounce {
            out,
            seconds,
            input,
        } => {
            let mut engine = match &input {
                Some(path) => {
                    let buffer = SampleBuffer::load(path)
                        .with_context(|| format!("failed to load {}", path.display()))?;
                    playback_engine(buffer, &config)?
                }
                None => synthesis_engine(&config)?,
            };
            let frames = (seconds * engine.context().sample_rate as f32).round() as usize;
            let file = File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let written = bounce(&mut engine, frames, BufWriter::new(file))?;
            info!("Wrote {} frames to {}", written, out.display());
        }
    }

    Ok(())
}

/// Play `engine` on the device until the operator presses Enter.
fn run_live(engine: RenderEngine, options: StreamOptions) -> anyhow::Result<()> {
    let stop = StopSignal::new();
    let host = AudioHost::open(engine, options, stop.clone()).context("failed to open stream")?;
    host.start().context("failed to start stream")?;

    let remote = stop.clone();
    thread::spawn(move || {
        let mut line = String::new();
        // EOF or a read error also stops playback.
        let _ = io::stdin().lock().read_line(&mut line);
        remote.request();
    });

    println!("Press Enter to stop");
    host.run_until_stopped(STOP_POLL)
        .context("failed to stop stream")?;
    Ok(())
}
