use crate::features::clock::ClockReading;

// 25 minutes on, 5 minutes rest, locked to the wall clock.
pub const CYCLE_SECS: u32 = 30 * 60;
pub const WORK_FRACTION: f32 = 25.0 / 30.0;

pub const SEGMENT_IDS: [&str; 5] = ["p1", "p2", "p3", "p4", "p5"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Hidden,
    Span { from: f32, to: f32 },
}

/// Where the current instant falls within the duty cycle, resolved into the
/// five ring/bar segments. `from`/`to` are fractions of the full cycle; the
/// face-specific encoders scale them to arc angles or bar widths.
#[derive(Debug, Clone, Copy)]
pub struct SegmentPlan {
    pub percentage: f32,
    pub phase: Phase,
    pub segments: [Segment; 5],
}

impl SegmentPlan {
    pub fn at(reading: &ClockReading) -> Self {
        let progress =
            (u32::from(reading.minutes) * 60 + u32::from(reading.seconds)) % CYCLE_SECS;
        Self::from_percentage(progress as f32 / CYCLE_SECS as f32)
    }

    pub fn from_percentage(percentage: f32) -> Self {
        let span = |from: f32, to: f32| Segment::Span { from, to };

        if percentage <= WORK_FRACTION {
            Self {
                percentage,
                phase: Phase::Work,
                segments: [
                    span(0.0, percentage),            // elapsed work
                    span(percentage, WORK_FRACTION),  // remaining work
                    Segment::Hidden,
                    Segment::Hidden,
                    span(WORK_FRACTION, 1.0),         // upcoming rest
                ],
            }
        } else {
            Self {
                percentage,
                phase: Phase::Rest,
                segments: [
                    Segment::Hidden,
                    Segment::Hidden,
                    span(WORK_FRACTION, percentage),  // elapsed rest
                    span(percentage, 1.0),            // remaining rest
                    span(0.0, WORK_FRACTION),         // completed work
                ],
            }
        }
    }
}
