use crate::config::{Config, FaceKind};
use crate::features::clock::{AnalogFace, ClockReading, DigitalFace, TimeSource};
use crate::features::pomodoro::{SegmentPlan, SEGMENT_IDS};
use crate::features::Face;
use crate::surface::caps::{Fullscreen, WakeLock};
use crate::surface::{Surface, SurfaceEvent, ROOT_ID};
use log::{debug, info};

const OVERLAY_SETTLE: f32 = 0.2;
const OVERLAY_SHOW_DELAY: f32 = 1.0;
const OVERLAY_HIDE_DELAY: f32 = 5.0;

/// A single pending deadline. Re-arming replaces the previous deadline, so
/// there is never more than one callback outstanding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debounce {
    deadline: Option<f32>,
}

impl Debounce {
    pub fn arm(&mut self, now: f32, delay: f32) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn fire(&mut self, now: f32) -> bool {
        if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.deadline = None;
                return true;
            }
        }
        false
    }
}

// Copyright overlay and cursor chrome: revealed while the pointer keeps
// moving, hidden again a few seconds after it settles.
struct Overlay {
    last_pointer: Option<(f32, f32)>,
    moving: bool,
    visible: bool,
    settle: Debounce,
    reveal: Debounce,
}

impl Overlay {
    fn new() -> Self {
        Self {
            last_pointer: None,
            moving: false,
            visible: false,
            settle: Debounce::default(),
            reveal: Debounce::default(),
        }
    }

    fn pointer_moved(&mut self, now: f32, x: f32, y: f32) {
        if self.last_pointer != Some((x, y)) {
            self.last_pointer = Some((x, y));
            self.wake(now);
        }
    }

    fn key_pressed(&mut self, now: f32) {
        self.last_pointer = None;
        self.wake(now);
    }

    fn wake(&mut self, now: f32) {
        self.moving = true;
        self.settle.arm(now, OVERLAY_SETTLE);
        if !self.visible && !self.reveal.armed() {
            self.reveal.arm(now, OVERLAY_SHOW_DELAY);
        }
    }

    fn poll(&mut self, now: f32, surface: &mut dyn Surface) {
        if self.settle.fire(now) {
            self.moving = false;
            if self.visible {
                self.reveal.arm(now, OVERLAY_HIDE_DELAY);
            }
        }

        if self.reveal.fire(now) {
            if self.visible {
                surface.set_attr("copyright", "class", "copyright");
                surface.set_attr(ROOT_ID, "cursor", "none");
                self.visible = false;
            } else if self.moving {
                surface.set_attr("copyright", "class", "copyright visible");
                surface.set_attr(ROOT_ID, "cursor", "default");
                self.visible = true;
            }
        }
    }
}

/// Top-level controller: owns every piece of state the tick and input
/// callbacks touch.
pub struct App {
    pub config: Config,
    kind: FaceKind,
    face: Box<dyn Face>,
    time_source: TimeSource,
    visible: bool,
    original_title: String,
    overlay: Overlay,
    wake_lock: Box<dyn WakeLock>,
    fullscreen: Box<dyn Fullscreen>,
    pub time: f32,
    pub preference_dirty: bool,
    pub quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        time_source: TimeSource,
        wake_lock: Box<dyn WakeLock>,
        fullscreen: Box<dyn Fullscreen>,
    ) -> Self {
        let kind = config.face;
        let face: Box<dyn Face> = match kind {
            FaceKind::Digital => Box::new(DigitalFace),
            FaceKind::Analog => Box::new(AnalogFace),
        };
        Self {
            config,
            kind,
            face,
            time_source,
            visible: true,
            original_title: String::new(),
            overlay: Overlay::new(),
            wake_lock,
            fullscreen,
            time: 0.0,
            preference_dirty: false,
            quit: false,
        }
    }

    pub fn startup(&mut self, surface: &mut dyn Surface) {
        self.original_title = surface.title();
        info!("building {} face", self.face.name());
        self.face.build(surface);
        self.set_visibility(true, surface);
    }

    pub fn handle_event(&mut self, event: SurfaceEvent, surface: &mut dyn Surface) {
        match event {
            SurfaceEvent::Tick => self.update_all(surface),
            SurfaceEvent::VisibilityChanged(visible) => self.set_visibility(visible, surface),
            SurfaceEvent::Resized { width, height } => self.resize(width, height, surface),
            SurfaceEvent::PointerMoved { x, y } => self.overlay.pointer_moved(self.time, x, y),
            SurfaceEvent::KeyPressed(key) => self.key_pressed(key, surface),
            SurfaceEvent::DoubleClick => self.fullscreen.toggle(),
        }
    }

    /// Advances wall time and runs any due debounce deadlines.
    pub fn update(&mut self, dt: f32, surface: &mut dyn Surface) {
        self.time += dt;
        self.overlay.poll(self.time, surface);
    }

    fn key_pressed(&mut self, key: char, surface: &mut dyn Surface) {
        match key {
            'p' => self.toggle_pomodoro(surface),
            'q' => {
                info!("quit requested");
                self.quit = true;
            }
            _ => {}
        }
        self.overlay.key_pressed(self.time);
    }

    fn update_all(&mut self, surface: &mut dyn Surface) {
        let reading = self.time_source.sample();
        self.refresh(surface, &reading);
    }

    fn refresh(&mut self, surface: &mut dyn Surface, reading: &ClockReading) {
        if self.visible {
            surface.set_title(&reading.hhmm());
            self.face.render(surface, reading);
            if self.config.pomodoro {
                self.face.apply_cycle(surface, &SegmentPlan::at(reading));
            }
        } else {
            surface.set_title(&self.original_title);
        }
    }

    fn set_visibility(&mut self, visible: bool, surface: &mut dyn Surface) {
        if visible {
            self.wake_lock.acquire();
        } else {
            self.wake_lock.release();
        }
        if self.visible != visible {
            info!("visibility changed: {}", if visible { "visible" } else { "hidden" });
        }
        self.visible = visible;
        self.update_all(surface);
    }

    pub fn toggle_pomodoro(&mut self, surface: &mut dyn Surface) {
        let on = !self.config.pomodoro;
        self.config.pomodoro = on;
        self.preference_dirty = true;
        info!("pomodoro {}", if on { "enabled" } else { "disabled" });

        if on {
            // Applies right away rather than waiting for the next tick
            let reading = self.time_source.sample();
            self.face.apply_cycle(surface, &SegmentPlan::at(&reading));
        } else {
            for id in SEGMENT_IDS {
                surface.set_visible(id, false);
            }
        }
    }

    fn resize(&mut self, width: f32, height: f32, surface: &mut dyn Surface) {
        match self.kind {
            FaceKind::Analog => {
                let size = width.min(height) / 1.5;
                surface.set_attr(ROOT_ID, "width", &format!("{size:.3}"));
                surface.set_attr(ROOT_ID, "height", &format!("{size:.3}"));
            }
            FaceKind::Digital => debug!("resize ignored for the digital face"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::caps::{NoopFullscreen, NoopWakeLock};
    use crate::surface::svg::SvgSurface;
    use std::path::PathBuf;

    fn app(config: Config) -> (App, SvgSurface) {
        let (width, height) = match config.face {
            FaceKind::Digital => (300.0, 190.0),
            FaceKind::Analog => (200.0, 200.0),
        };
        let surface = SvgSurface::new(PathBuf::from("unused.svg"), "cadran", width, height);
        let app = App::new(
            config,
            TimeSource::new(),
            Box::new(NoopWakeLock),
            Box::new(NoopFullscreen),
        );
        (app, surface)
    }

    #[test]
    fn debounce_rearm_replaces_deadline() {
        let mut d = Debounce::default();
        d.arm(0.0, 1.0);
        d.arm(0.5, 1.0);
        assert!(!d.fire(1.2));
        assert!(d.fire(1.5));
        assert!(!d.fire(2.0));

        d.arm(2.0, 1.0);
        d.cancel();
        assert!(!d.fire(10.0));
    }

    #[test]
    fn hiding_restores_the_original_title() {
        let (mut app, mut s) = app(Config::default());
        app.startup(&mut s);

        let active = s.title();
        assert_eq!(active.len(), 5);
        assert_eq!(&active[2..3], ":");

        app.handle_event(SurfaceEvent::VisibilityChanged(false), &mut s);
        assert_eq!(s.title(), "cadran");

        app.handle_event(SurfaceEvent::VisibilityChanged(true), &mut s);
        assert_eq!(s.title().len(), 5);
    }

    #[test]
    fn hidden_ticks_do_not_touch_the_face() {
        let (mut app, mut s) = app(Config::default());
        app.startup(&mut s);
        app.handle_event(SurfaceEvent::VisibilityChanged(false), &mut s);

        let before = s.text_of("time-str").map(str::to_owned);
        app.handle_event(SurfaceEvent::Tick, &mut s);
        assert_eq!(s.text_of("time-str").map(str::to_owned), before);
    }

    #[test]
    fn toggling_pomodoro_shows_three_segments_and_marks_preference() {
        let (mut app, mut s) = app(Config::default());
        app.startup(&mut s);
        assert!(!app.preference_dirty);

        app.handle_event(SurfaceEvent::KeyPressed('p'), &mut s);
        assert!(app.config.pomodoro);
        assert!(app.preference_dirty);
        let shown = SEGMENT_IDS.iter().filter(|id| s.is_visible(id)).count();
        assert_eq!(shown, 3);

        app.handle_event(SurfaceEvent::KeyPressed('p'), &mut s);
        assert!(!app.config.pomodoro);
        assert!(SEGMENT_IDS.iter().all(|id| !s.is_visible(id)));
    }

    #[test]
    fn quit_key_raises_the_flag() {
        let (mut app, mut s) = app(Config::default());
        app.startup(&mut s);
        app.handle_event(SurfaceEvent::KeyPressed('q'), &mut s);
        assert!(app.quit);
    }

    #[test]
    fn analog_resize_scales_the_root() {
        let mut config = Config::default();
        config.face = FaceKind::Analog;
        let (mut app, mut s) = app(config);
        app.startup(&mut s);

        app.handle_event(SurfaceEvent::Resized { width: 900.0, height: 600.0 }, &mut s);
        assert_eq!(s.attr(ROOT_ID, "width"), Some("400.000"));
        assert_eq!(s.attr(ROOT_ID, "height"), Some("400.000"));
    }

    #[test]
    fn overlay_appears_while_moving_and_fades_after_settle() {
        let (mut app, mut s) = app(Config::default());
        app.startup(&mut s);
        assert_eq!(s.attr("copyright", "class"), Some("copyright"));

        // sustained movement for one second reveals the overlay
        for i in 0..10 {
            app.handle_event(
                SurfaceEvent::PointerMoved { x: i as f32, y: 0.0 },
                &mut s,
            );
            app.update(0.125, &mut s);
        }
        assert_eq!(s.attr("copyright", "class"), Some("copyright visible"));
        assert_eq!(s.attr(ROOT_ID, "cursor"), Some("default"));

        // movement settles, then the hide delay elapses
        app.update(0.2, &mut s);
        app.update(5.1, &mut s);
        assert_eq!(s.attr("copyright", "class"), Some("copyright"));
        assert_eq!(s.attr(ROOT_ID, "cursor"), Some("none"));
    }

    #[test]
    fn a_short_twitch_never_reveals_the_overlay() {
        let (mut app, mut s) = app(Config::default());
        app.startup(&mut s);

        app.handle_event(SurfaceEvent::PointerMoved { x: 1.0, y: 1.0 }, &mut s);
        app.update(0.5, &mut s); // settles before the reveal deadline
        app.update(0.6, &mut s);
        assert_eq!(s.attr("copyright", "class"), Some("copyright"));
    }
}
