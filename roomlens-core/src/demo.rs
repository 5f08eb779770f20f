//! Synthetic frames for rehearsing without hardware
//!
//! Values come from a stack of slow LFOs and mimic the keys the firmware
//! exports, sitting roughly in `[0, 1]`. Output is a pure function of `t`,
//! so tests and benches can rely on it.

use crate::frame::Frame;

/// Keys every demo frame carries
pub const DEMO_KEYS: &[&str] = &[
    "mic_rms",
    "mic_sc",
    "tof_motion",
    "tof_near",
    "lux",
    "flicker",
    "motion",
];

fn wob(freq: f64, t: f64) -> f64 {
    0.5 + 0.5 * (freq * t).sin() * (0.7 * freq * t).cos()
}

/// Demo frame at `t` seconds, timestamped in milliseconds
pub fn demo_frame(t: f64) -> Frame {
    let burst = if wob(2.3, t) > 0.65 { 1.0 } else { 0.0 };

    Frame::new()
        .with("mic_rms", 0.12 + 0.1 * wob(1.7, t))
        .with("mic_sc", 0.40 + 0.3 * wob(0.9, t))
        .with("tof_motion", (0.5 - wob(2.3, t)).abs() * 2.0)
        .with("tof_near", wob(0.5, t))
        .with("lux", 0.3 + 0.6 * wob(0.1, t))
        .with("flicker", wob(3.1, t))
        .with("motion", burst)
        .with_timestamp((t * 1000.0).round() as i64)
}

/// Endless demo frames at a fixed step
#[derive(Debug, Clone)]
pub struct DemoFrames {
    t: f64,
    step: f64,
}

impl DemoFrames {
    /// Start at `start` seconds, advancing `step` seconds per frame
    pub fn new(start: f64, step: f64) -> Self {
        Self { t: start, step }
    }

    /// Frames at `hz` starting from zero
    pub fn at_rate(hz: f64) -> Self {
        Self::new(0.0, 1.0 / hz)
    }
}

impl Iterator for DemoFrames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = demo_frame(self.t);
        self.t += self.step;
        Some(frame)
    }
}
