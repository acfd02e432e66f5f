pub mod clock;
pub mod pomodoro;

use crate::features::clock::ClockReading;
use crate::features::pomodoro::SegmentPlan;
use crate::surface::Surface;

pub trait Face {
    fn name(&self) -> &'static str;
    /// Constructs the static scene once, at startup.
    fn build(&self, surface: &mut dyn Surface);
    /// Applies one clock reading; safe to call every tick.
    fn render(&self, surface: &mut dyn Surface, reading: &ClockReading);
    /// Applies the pomodoro segments in this face's geometry encoding.
    fn apply_cycle(&self, surface: &mut dyn Surface, plan: &SegmentPlan);
}
