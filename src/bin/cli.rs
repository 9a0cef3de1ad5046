use crabshot::events::CameraEvent;
use crabshot::hal::CameraBackend;
use crabshot::storage::DirectoryPathProvider;
use crabshot::testing::{EventWatcher, SimulatedBackend, SimulatedPreview};
use crabshot::{
    AspectRatio, CaptureSessionController, Facing, Flash, Mode, PreviewParams, SizeNegotiator,
};
use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    crabshot::init_logging();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: crabshot-cli <negotiate|shoot|record> [options] [--json]");
        std::process::exit(1);
    }

    let options = Options::parse(&args[2..])?;
    match args[1].as_str() {
        "negotiate" => cmd_negotiate(&options),
        "shoot" => cmd_shoot(&options),
        "record" => cmd_record(&options),
        command => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

struct Options {
    ratio: AspectRatio,
    mode: Mode,
    facing: Facing,
    flash: Flash,
    out: PathBuf,
    seconds: u64,
    json: bool,
}

impl Options {
    // Parse: [--ratio 4:3] [--mode image|video] [--facing back|front]
    //        [--flash off|on|auto|torch|red_eye] [--out <dir>] [--seconds <n>] [--json]
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = Options {
            ratio: AspectRatio::of(4, 3),
            mode: Mode::Image,
            facing: Facing::Back,
            flash: Flash::Off,
            out: PathBuf::from("./captures"),
            seconds: 1,
            json: false,
        };

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if flag == "--json" {
                options.json = true;
                i += 1;
                continue;
            }
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("Missing value for {}", flag))?;
            match flag {
                "--ratio" => options.ratio = value.parse().map_err(anyhow::Error::msg)?,
                "--mode" => options.mode = parse_enum(value)?,
                "--facing" => options.facing = parse_enum(value)?,
                "--flash" => options.flash = parse_enum(value)?,
                "--out" => options.out = PathBuf::from(value),
                "--seconds" => {
                    options.seconds = value.parse().context("--seconds takes a number")?
                }
                _ => bail!("Unknown option: {}", flag),
            }
            i += 2;
        }
        Ok(options)
    }
}

/// Parses a lowercase enum name the same way the config file does.
fn parse_enum<T: DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .with_context(|| format!("Unrecognized value: {}", value))
}

fn print_event(event: &CameraEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{:?}", event);
    }
    Ok(())
}

fn cmd_negotiate(options: &Options) -> Result<()> {
    let backend = SimulatedBackend::phone();
    let config = crabshot::CrabShotConfig::default();

    for id in backend.camera_ids()? {
        let characteristics = backend.characteristics(&id)?;
        if characteristics.facing.as_facing() != options.facing {
            continue;
        }
        let negotiator = SizeNegotiator::new(
            &characteristics.preview_sizes,
            &characteristics.jpeg_sizes,
            &characteristics.video_sizes,
            config.camera.max_video_height,
        );
        let streams = negotiator.negotiate(options.ratio, options.mode, None)?;
        if options.json {
            println!("{}", serde_json::to_string(&streams)?);
        } else {
            println!("camera {}", id);
            println!("  ratio:   {}", streams.aspect_ratio);
            println!("  preview: {}", streams.preview_size);
            if let Some(size) = streams.output_size(options.mode) {
                println!("  output:  {}", size);
            }
            let ratios: Vec<String> = negotiator
                .supported_aspect_ratios(options.mode)
                .iter()
                .map(|r| r.to_string())
                .collect();
            println!("  ratios:  {}", ratios.join(", "));
        }
        return Ok(());
    }
    bail!("No {:?} camera", options.facing)
}

fn controller(options: &Options) -> CaptureSessionController {
    let backend = Arc::new(SimulatedBackend::phone());
    let mut controller = CaptureSessionController::builder(backend)
        .path_provider(Arc::new(DirectoryPathProvider::new(&options.out)))
        .build();
    controller.initialize(Arc::new(SimulatedPreview::new(1080, 1440)));
    controller
}

/// Waits for `expected`, printing everything on the way. Errors abort.
fn await_event(
    controller: &CaptureSessionController,
    watcher: &mut EventWatcher,
    options: &Options,
    expected: fn(&CameraEvent) -> bool,
) -> Result<CameraEvent> {
    loop {
        let event = watcher
            .wait_for(controller.events(), EVENT_TIMEOUT, |_| true)
            .context("Timed out waiting for camera")?;
        print_event(&event, options.json)?;
        if let CameraEvent::Error { message, .. } = &event {
            bail!("{}", message);
        }
        if expected(&event) {
            return Ok(event);
        }
    }
}

fn cmd_shoot(options: &Options) -> Result<()> {
    let mut controller = controller(options);
    let mut watcher = EventWatcher::new();

    controller.start_preview(
        PreviewParams::default()
            .with_mode(Mode::Image)
            .with_facing(options.facing)
            .with_flash(options.flash)
            .with_aspect_ratio(options.ratio),
    );
    await_event(&controller, &mut watcher, options, |e| {
        *e == CameraEvent::PreviewStarted
    })?;

    controller.take_picture();
    await_event(&controller, &mut watcher, options, |e| {
        matches!(e, CameraEvent::ShotFinished { .. })
    })?;

    controller.stop_preview();
    for event in controller.events().drain() {
        print_event(&event, options.json)?;
    }
    Ok(())
}

fn cmd_record(options: &Options) -> Result<()> {
    let mut controller = controller(options);
    let mut watcher = EventWatcher::new();

    controller.start_preview(
        PreviewParams::default()
            .with_mode(Mode::Video)
            .with_facing(options.facing)
            .with_aspect_ratio(options.ratio),
    );
    await_event(&controller, &mut watcher, options, |e| {
        *e == CameraEvent::PreviewStarted
    })?;

    controller.start_recording(None);
    await_event(&controller, &mut watcher, options, |e| {
        *e == CameraEvent::StartRecording
    })?;

    std::thread::sleep(Duration::from_secs(options.seconds));
    controller.finish_recording();
    await_event(&controller, &mut watcher, options, |e| {
        matches!(e, CameraEvent::FinishRecording { .. })
    })?;

    controller.stop_preview();
    for event in controller.events().drain() {
        print_event(&event, options.json)?;
    }
    Ok(())
}
