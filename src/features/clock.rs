use crate::features::pomodoro::{Segment, SegmentPlan, SEGMENT_IDS};
use crate::features::Face;
use crate::gfx::geom;
use crate::surface::{Element, Surface, ROOT_ID};
use log::warn;
use time::{Month, OffsetDateTime, UtcOffset, Weekday};

/// Samples the wall clock. The local offset is captured once at
/// construction; `time` refuses to look it up after threads exist.
pub struct TimeSource {
    offset: UtcOffset,
}

impl TimeSource {
    pub fn new() -> Self {
        let offset = match UtcOffset::current_local_offset() {
            Ok(offset) => offset,
            Err(err) => {
                warn!("local UTC offset unavailable ({err}), falling back to UTC");
                UtcOffset::UTC
            }
        };
        Self { offset }
    }

    pub fn sample(&self) -> ClockReading {
        ClockReading::from(OffsetDateTime::now_utc().to_offset(self.offset))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClockReading {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub year: i32,
    pub month: Month,
    pub day: u8,
    pub weekday: Weekday,
}

impl From<OffsetDateTime> for ClockReading {
    fn from(now: OffsetDateTime) -> Self {
        Self {
            hours: now.hour(),
            minutes: now.minute(),
            seconds: now.second(),
            year: now.year(),
            month: now.month(),
            day: now.day(),
            weekday: now.weekday(),
        }
    }
}

impl ClockReading {
    /// 12-hour form: 0 and 12 both read as 12.
    pub fn hour12(&self) -> u8 {
        (self.hours + 11) % 12 + 1
    }

    pub fn meridiem(&self) -> &'static str {
        if self.hours >= 12 {
            "pm"
        } else {
            "am"
        }
    }

    /// 24-hour "HH:MM", used for the document title.
    pub fn hhmm(&self) -> String {
        format!("{:02}:{:02}", self.hours, self.minutes)
    }

    pub fn full_date(&self) -> String {
        format!("{}, {} {} {}", self.weekday, self.day, self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour: f32,
    pub minute: f32,
    pub second: f32,
}

impl HandAngles {
    /// Each hand carries the fractional progress of the next-finer unit, so
    /// the angles advance without jumps at rollover.
    pub fn of(reading: &ClockReading) -> Self {
        Self {
            hour: f32::from(reading.hours % 12) * 30.0 + f32::from(reading.minutes) * 0.5,
            minute: f32::from(reading.minutes) * 6.0 + f32::from(reading.seconds) * 0.1,
            second: f32::from(reading.seconds) * 6.0,
        }
    }
}

const BAR_WIDTH: f32 = 300.0;
const RING_RADIUS: f32 = 78.0;
const FACE_CENTER: f32 = geom::FACE_CENTER;

const DIGITAL_STYLE: &str = "\
    text { fill: #e8e8e8; font-family: sans-serif; }
    .backdrop { fill: #111; }
    .time { font-size: 56px; font-weight: 700; }
    .secs { font-size: 22px; fill: #9a9a9a; }
    .ampm { font-size: 16px; fill: #9a9a9a; }
    .date { font-size: 16px; fill: #b8b8b8; }
    .bar-work-done { fill: #d9534f; }
    .bar-work-left { fill: #5a2f2e; }
    .bar-rest-done { fill: #5cb85c; }
    .bar-rest-left { fill: #2e4d2e; }
    .bar-block { fill: #3a3a3a; }
    .copyright { font-size: 9px; fill: #6a6a6a; opacity: 0; }
    .copyright.visible { opacity: 1; }";

const ANALOG_STYLE: &str = "\
    .clock-face { fill: #111; stroke: #e8e8e8; }
    .hour-marker { stroke: #e8e8e8; }
    .minute-marker { stroke: #9a9a9a; }
    .face-seconds { font: 9px sans-serif; fill: #9a9a9a; }
    .hand { stroke: #e8e8e8; stroke-linecap: round; }
    .hand.second { stroke: #d9534f; }
    .hub { fill: #e8e8e8; }
    .date-text { font: 8px sans-serif; fill: #b8b8b8; }
    .date-text.day { font-size: 14px; fill: #e8e8e8; }
    .ring-work-done { stroke: #d9534f; fill: none; }
    .ring-work-left { stroke: #5a2f2e; fill: none; }
    .ring-rest-done { stroke: #5cb85c; fill: none; }
    .ring-rest-left { stroke: #2e4d2e; fill: none; }
    .ring-block { stroke: #3a3a3a; fill: none; }
    .copyright { font: 5px sans-serif; fill: #6a6a6a; opacity: 0; }
    .copyright.visible { opacity: 1; }";

const BAR_CLASSES: [&str; 5] = [
    "bar-work-done",
    "bar-work-left",
    "bar-rest-done",
    "bar-rest-left",
    "bar-block",
];

const RING_CLASSES: [&str; 5] = [
    "ring-work-done",
    "ring-work-left",
    "ring-rest-done",
    "ring-rest-left",
    "ring-block",
];

pub struct DigitalFace;

impl Face for DigitalFace {
    fn name(&self) -> &'static str {
        "digital"
    }

    fn build(&self, surface: &mut dyn Surface) {
        surface.append(ROOT_ID, Element::new("style").text(DIGITAL_STYLE));
        surface.append(
            ROOT_ID,
            Element::new("rect").class("backdrop").attr("width", 300).attr("height", 190),
        );

        let text = |id: &str, x: f32, y: f32, class: &str| {
            Element::new("text")
                .id(id)
                .class(class)
                .attr("x", x)
                .attr("y", y)
                .attr("text-anchor", "middle")
        };
        surface.append(ROOT_ID, text("time-str", 130.0, 96.0, "time"));
        surface.append(ROOT_ID, text("secs-str", 262.0, 74.0, "secs"));
        surface.append(ROOT_ID, text("hr12-str", 262.0, 96.0, "ampm"));
        surface.append(ROOT_ID, text("date-str", 150.0, 132.0, "date"));
        surface.append(ROOT_ID, text("copyright", 150.0, 182.0, "copyright").text(COPYRIGHT));

        for (id, class) in SEGMENT_IDS.iter().zip(BAR_CLASSES) {
            surface.append(
                ROOT_ID,
                Element::new("rect")
                    .id(id)
                    .class(class)
                    .attr("x", 0)
                    .attr("y", 150)
                    .attr("width", 0)
                    .attr("height", 10)
                    .attr("visibility", "hidden"),
            );
        }
    }

    fn render(&self, surface: &mut dyn Surface, reading: &ClockReading) {
        surface.set_text(
            "time-str",
            &format!("{:02}:{:02}", reading.hour12(), reading.minutes),
        );
        surface.set_text("secs-str", &format!("{:02}", reading.seconds));
        surface.set_text("hr12-str", reading.meridiem());
        surface.set_text("date-str", &reading.full_date());
    }

    fn apply_cycle(&self, surface: &mut dyn Surface, plan: &SegmentPlan) {
        for (id, segment) in SEGMENT_IDS.iter().zip(plan.segments) {
            match segment {
                Segment::Hidden => surface.set_visible(id, false),
                Segment::Span { from, to } => {
                    surface.set_visible(id, true);
                    surface.set_attr(id, "x", &format!("{:.3}", from * BAR_WIDTH));
                    surface.set_attr(id, "width", &format!("{:.3}", (to - from) * BAR_WIDTH));
                }
            }
        }
    }
}

pub struct AnalogFace;

const HANDS: [(&str, &str, f32, f32); 6] = [
    ("hour-hand", "hand hour", 50.0, 4.5),
    ("hour-hand-2", "hand hour", 86.0, 4.5),
    ("minute-hand", "hand minute", 26.0, 3.0),
    ("minute-hand-2", "hand minute", 84.0, 3.0),
    ("second-hand", "hand second", 20.0, 1.5),
    ("second-hand-2", "hand second", 76.0, 1.5),
];

impl AnalogFace {
    fn build_markers(&self, surface: &mut dyn Surface) {
        // The 12 o'clock mark is a pair straddling the 60 numeral.
        for offset in [-2.0f32, 2.0] {
            surface.append(
                "markers",
                Element::new("line")
                    .class("hour-marker")
                    .attr("x1", 100.0 + offset)
                    .attr("y1", 4.75)
                    .attr("x2", 100.0 + offset)
                    .attr("y2", 18)
                    .attr("stroke-width", 2),
            );
        }

        for i in 1..12 {
            surface.append(
                "markers",
                Element::new("line")
                    .class("hour-marker")
                    .attr("x1", 100)
                    .attr("y1", 12)
                    .attr("x2", 100)
                    .attr("y2", 18)
                    .attr("stroke-width", 2)
                    .attr("transform", geom::rotation_about(i as f32 * 30.0, FACE_CENTER, FACE_CENTER)),
            );
        }

        for i in 1..=12 {
            surface.append(
                "markers",
                Element::new("text")
                    .class("face-seconds")
                    .attr("x", 100)
                    .attr("y", 7)
                    .attr("text-anchor", "middle")
                    .attr("dominant-baseline", "middle")
                    .attr("transform", geom::rotation_about(i as f32 * 30.0, FACE_CENTER, FACE_CENTER))
                    .text((i * 5).to_string()),
            );
        }

        for i in 0..60 {
            if i % 5 == 0 {
                continue;
            }
            surface.append(
                "markers",
                Element::new("line")
                    .class("minute-marker")
                    .attr("x1", 100)
                    .attr("y1", 5)
                    .attr("x2", 100)
                    .attr("y2", 10)
                    .attr("stroke-width", 1)
                    .attr("transform", geom::rotation_about(i as f32 * 6.0, FACE_CENTER, FACE_CENTER)),
            );
        }
    }
}

impl Face for AnalogFace {
    fn name(&self) -> &'static str {
        "analog"
    }

    fn build(&self, surface: &mut dyn Surface) {
        surface.append(ROOT_ID, Element::new("style").text(ANALOG_STYLE));
        for group in ["clock-face", "markers", "ring", "date", "hands"] {
            surface.append(ROOT_ID, Element::new("g").id(group));
        }

        surface.append(
            "clock-face",
            Element::new("circle")
                .class("clock-face")
                .attr("cx", 100)
                .attr("cy", 100)
                .attr("r", 90)
                .attr("stroke-width", 1),
        );
        self.build_markers(surface);

        for (id, class) in SEGMENT_IDS.iter().zip(RING_CLASSES) {
            surface.append(
                "ring",
                Element::new("path")
                    .id(id)
                    .class(class)
                    .attr("stroke-width", 6)
                    .attr("visibility", "hidden"),
            );
        }

        let date_text = |id: &str, y: f32, class: &str| {
            Element::new("text")
                .id(id)
                .class(class)
                .attr("x", 100)
                .attr("y", y)
                .attr("text-anchor", "middle")
        };
        surface.append("date", date_text("dow-str", 64.0, "date-text"));
        surface.append("date", date_text("day-str", 140.0, "date-text day"));
        surface.append("date", date_text("month-str", 152.0, "date-text"));

        for (id, class, tip_y, width) in HANDS {
            surface.append(
                "hands",
                Element::new("line")
                    .id(id)
                    .class(class)
                    .attr("x1", 100)
                    .attr("y1", 100)
                    .attr("x2", 100)
                    .attr("y2", tip_y)
                    .attr("stroke-width", width),
            );
        }
        surface.append(
            "hands",
            Element::new("circle").class("hub").attr("cx", 100).attr("cy", 100).attr("r", 3.5),
        );
        surface.append(
            ROOT_ID,
            Element::new("text")
                .id("copyright")
                .class("copyright")
                .attr("x", 100)
                .attr("y", 196)
                .attr("text-anchor", "middle")
                .text(COPYRIGHT),
        );
    }

    fn render(&self, surface: &mut dyn Surface, reading: &ClockReading) {
        let angles = HandAngles::of(reading);
        let rotations = [
            ("hour-hand", angles.hour),
            ("hour-hand-2", angles.hour + 180.0),
            ("minute-hand", angles.minute),
            ("minute-hand-2", angles.minute + 180.0),
            ("second-hand", angles.second),
            ("second-hand-2", angles.second + 180.0),
        ];
        for (id, angle) in rotations {
            surface.set_attr(id, "transform", &geom::rotation_about(angle, FACE_CENTER, FACE_CENTER));
        }

        let weekday = reading.weekday.to_string();
        let month = reading.month.to_string();
        surface.set_text("dow-str", &weekday[..3].to_uppercase());
        surface.set_text("day-str", &reading.day.to_string());
        surface.set_text("month-str", &month[..3].to_uppercase());
    }

    fn apply_cycle(&self, surface: &mut dyn Surface, plan: &SegmentPlan) {
        for (id, segment) in SEGMENT_IDS.iter().zip(plan.segments) {
            match segment {
                Segment::Hidden => surface.set_visible(id, false),
                Segment::Span { from, to } => {
                    surface.set_visible(id, true);
                    let path = geom::ring_segment_path(
                        FACE_CENTER,
                        FACE_CENTER,
                        RING_RADIUS,
                        from * 360.0,
                        to * 360.0,
                    );
                    surface.set_attr(id, "d", &path);
                }
            }
        }
    }
}

const COPYRIGHT: &str = "cadran";
