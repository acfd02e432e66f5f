mod app;
mod config;
mod features;
mod gfx;
mod surface;

use anyhow::{Context, Result};
use app::App;
use calloop::channel;
use calloop::signals::{Signal, Signals};
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use config::{Config, FaceKind};
use features::clock::TimeSource;
use log::{error, info, warn};
use std::io::BufRead;
use std::time::{Duration, Instant};
use surface::svg::SvgSurface;
use surface::{caps, Surface, SurfaceEvent};

const TICK_PERIOD: Duration = Duration::from_millis(1000);
// Idle wakeup so debounce deadlines fire between events
const POLL_PERIOD: Duration = Duration::from_millis(200);
const APP_TITLE: &str = "cadran";

struct Runtime {
    app: App,
    surface: SvgSurface,
}

fn main() -> Result<()> {
    env_logger::init();
    println!("Starting cadran...");

    let config = Config::load().unwrap_or_else(|err| {
        warn!("could not load config ({err}), using defaults");
        Config::default()
    });

    // Must run before any thread exists or the offset lookup fails
    let time_source = TimeSource::new();

    let (width, height) = match config.face {
        FaceKind::Digital => (300.0, 190.0),
        FaceKind::Analog => (200.0, 200.0),
    };
    let mut surface = SvgSurface::new(config.output.clone(), APP_TITLE, width, height);

    let wake_lock = caps::detect_wake_lock();
    let fullscreen = caps::detect_fullscreen();
    let mut app = App::new(config, time_source, wake_lock, fullscreen);
    app.startup(&mut surface);
    surface.present().context("writing initial frame")?;
    info!("rendering to {}", app.config.output.display());

    let mut event_loop: EventLoop<Runtime> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    handle
        .insert_source(Timer::from_duration(TICK_PERIOD), |_, _, rt: &mut Runtime| {
            rt.app.handle_event(SurfaceEvent::Tick, &mut rt.surface);
            TimeoutAction::ToDuration(TICK_PERIOD)
        })
        .map_err(|err| anyhow::anyhow!("registering tick timer: {err}"))?;

    // SIGUSR1 hides the clock, SIGUSR2 shows it again
    handle
        .insert_source(
            Signals::new(&[Signal::SIGUSR1, Signal::SIGUSR2])?,
            |event, _, rt: &mut Runtime| {
                let visible = event.signal() == Signal::SIGUSR2;
                rt.app
                    .handle_event(SurfaceEvent::VisibilityChanged(visible), &mut rt.surface);
            },
        )
        .map_err(|err| anyhow::anyhow!("registering signal source: {err}"))?;

    let (sender, receiver) = channel::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    handle
        .insert_source(receiver, |event, _, rt: &mut Runtime| match event {
            channel::Event::Msg(line) => dispatch_command(&line, rt),
            channel::Event::Closed => rt.app.quit = true,
        })
        .map_err(|err| anyhow::anyhow!("registering input source: {err}"))?;

    info!("entering main loop");
    let stop = event_loop.get_signal();
    let mut runtime = Runtime { app, surface };
    let mut last_frame = Instant::now();

    event_loop
        .run(POLL_PERIOD, &mut runtime, move |runtime| {
            let Runtime { app, surface } = runtime;

            let now = Instant::now();
            let dt = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;
            app.update(dt, surface);

            if app.preference_dirty {
                if let Err(err) = app.config.save() {
                    error!("could not persist preferences: {err}");
                }
                app.preference_dirty = false;
            }

            if let Err(err) = surface.present() {
                error!("could not present frame: {err}");
            }

            if app.quit {
                stop.stop();
            }
        })
        .map_err(|err| anyhow::anyhow!("event loop: {err}"))?;

    Ok(())
}

// Line-oriented control protocol on stdin; the first word selects the
// event kind, anything unrecognized is treated as a key press.
fn dispatch_command(line: &str, runtime: &mut Runtime) {
    let Runtime { app, surface } = runtime;
    let mut parts = line.split_whitespace();

    let event = match parts.next() {
        None => return,
        Some("hide") => SurfaceEvent::VisibilityChanged(false),
        Some("show") => SurfaceEvent::VisibilityChanged(true),
        Some("dblclick") => SurfaceEvent::DoubleClick,
        Some("resize") => match parse_pair(parts.next(), parts.next()) {
            Some((width, height)) => SurfaceEvent::Resized { width, height },
            None => {
                warn!("usage: resize <width> <height>");
                return;
            }
        },
        Some("move") => match parse_pair(parts.next(), parts.next()) {
            Some((x, y)) => SurfaceEvent::PointerMoved { x, y },
            None => {
                warn!("usage: move <x> <y>");
                return;
            }
        },
        Some(word) => match word.chars().next() {
            Some(key) => SurfaceEvent::KeyPressed(key),
            None => return,
        },
    };

    app.handle_event(event, surface);
}

fn parse_pair(a: Option<&str>, b: Option<&str>) -> Option<(f32, f32)> {
    Some((a?.parse().ok()?, b?.parse().ok()?))
}
