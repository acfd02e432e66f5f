use log::{debug, error, info, warn};
use std::process::{Child, Command, Stdio};

/// Screen wake lock held while the clock is visible. Acquire/release are
/// fire-and-forget: failures are logged, never fatal.
pub trait WakeLock {
    fn acquire(&mut self);
    fn release(&mut self);
}

pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// Holds an idle inhibitor by keeping a `systemd-inhibit` child alive.
pub struct InhibitWakeLock {
    child: Option<Child>,
}

impl WakeLock for InhibitWakeLock {
    fn acquire(&mut self) {
        if self.child.is_some() {
            return;
        }
        let spawned = Command::new("systemd-inhibit")
            .args([
                "--what=idle",
                "--who=cadran",
                "--why=clock visible",
                "--mode=block",
                "sleep",
                "infinity",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                info!("wake lock acquired (inhibitor pid {})", child.id());
                self.child = Some(child);
            }
            Err(err) => error!("wake lock error: {err}"),
        }
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            info!("wake lock released");
        }
    }
}

impl Drop for InhibitWakeLock {
    fn drop(&mut self) {
        self.release();
    }
}

pub fn detect_wake_lock() -> Box<dyn WakeLock> {
    let probe = Command::new("systemd-inhibit")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match probe {
        Ok(status) if status.success() => Box::new(InhibitWakeLock { child: None }),
        _ => {
            warn!("screen wake lock is not supported on this system");
            Box::new(NoopWakeLock)
        }
    }
}

pub trait Fullscreen {
    fn toggle(&mut self);
}

pub struct NoopFullscreen;

impl Fullscreen for NoopFullscreen {
    fn toggle(&mut self) {
        debug!("fullscreen not supported by this surface");
    }
}

pub fn detect_fullscreen() -> Box<dyn Fullscreen> {
    // No file-backed surface can go fullscreen; the interface stays so an
    // embedding with a real window can provide one.
    Box::new(NoopFullscreen)
}
