//! Bidirectional mapping between the canonical value and the ruler's scroll
//! offset, plus tick-strip generation.
//!
//! Rendering cost must not scale with sub-unit resolution: a kind whose
//! domain spans thousands of tenths renders one tick per whole display unit
//! and carries sub-unit resolution entirely through the scroll arithmetic
//! (at the default 8 px per internal unit, a weight tick lands every 80 px
//! while 8 px still moves the value by 0.1 kg).

use serde::{Deserialize, Serialize};

use crate::domain::{MeasurementKind, ValueDomain};

/// Pure scroll<->value arithmetic over one domain.
///
/// `pitch_px` is pixels per *internal unit*. With `center_offset_px == 0`
/// the two directions are mutual inverses over the whole domain; a host
/// embedding an unpadded strip passes its real viewport-center offset and
/// accepts saturation at the low end, still clamped.
#[derive(Debug, Clone, Copy)]
pub struct ScaleMapping {
    domain: ValueDomain,
    pitch_px: f64,
    center_offset_px: f64,
}

impl ScaleMapping {
    pub fn new(domain: ValueDomain, pitch_px: f64, center_offset_px: f64) -> Self {
        ScaleMapping {
            domain,
            pitch_px,
            center_offset_px,
        }
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    pub fn pitch_px(&self) -> f64 {
        self.pitch_px
    }

    /// Scroll offset -> internal value, clamped and step-rounded.
    pub fn value_at(&self, offset_px: f64) -> i32 {
        let raw = self.domain.min as f64 + (offset_px + self.center_offset_px) / self.pitch_px;
        self.domain.snap(raw).unwrap_or(self.domain.min)
    }

    /// Internal value -> scroll offset. Never negative.
    pub fn offset_for(&self, value: i32) -> f64 {
        ((value - self.domain.min) as f64 * self.pitch_px - self.center_offset_px).max(0.0)
    }
}

/// Visual weight of one rendered tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickClass {
    Minor,
    Mid,
    Major,
}

/// One rendered tick on the strip. Only majors carry a label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Internal value at this tick.
    pub value: i32,
    pub offset_px: f64,
    pub class: TickClass,
    pub label: Option<String>,
}

/// Per-kind tick layout: how many internal units between rendered ticks and
/// the modulus rules that promote a tick to mid or major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSpec {
    /// Internal units between rendered ticks.
    pub stride: i32,
    /// Values divisible by this render as labeled majors.
    pub major_every: i32,
    /// Values divisible by this (but not `major_every`) render as mids.
    pub mid_every: i32,
}

impl TickSpec {
    /// Glucose: major every 10 mg/dL, mid every 5. HbA1c: major at whole
    /// percents, mid at halves. Weight: one tick per kg, major every 5 kg,
    /// mid every 1 kg.
    pub fn for_kind(kind: MeasurementKind) -> Self {
        match kind {
            MeasurementKind::Glucose => TickSpec {
                stride: 1,
                major_every: 10,
                mid_every: 5,
            },
            MeasurementKind::Hba1c => TickSpec {
                stride: 1,
                major_every: 10,
                mid_every: 5,
            },
            MeasurementKind::Weight => TickSpec {
                stride: 10,
                major_every: 50,
                mid_every: 10,
            },
        }
    }

    fn classify(&self, value: i32) -> TickClass {
        if value % self.major_every == 0 {
            TickClass::Major
        } else if value % self.mid_every == 0 {
            TickClass::Mid
        } else {
            TickClass::Minor
        }
    }
}

/// Generate the full tick strip for a mapping. One entry per `stride`
/// internal units, majors labeled at display precision.
pub fn tick_strip(mapping: &ScaleMapping, spec: &TickSpec) -> Vec<Tick> {
    let domain = *mapping.domain();
    let mut ticks = Vec::with_capacity((domain.span() / spec.stride + 1) as usize);
    let mut value = domain.min;
    while value <= domain.max {
        let class = spec.classify(value);
        let label = if class == TickClass::Major {
            Some(domain.format(value))
        } else {
            None
        };
        ticks.push(Tick {
            value,
            offset_px: (value - domain.min) as f64 * mapping.pitch_px(),
            class,
            label,
        });
        value += spec.stride;
    }
    ticks
}
