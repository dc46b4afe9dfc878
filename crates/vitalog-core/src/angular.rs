//! Bidirectional mapping between the canonical value and the gauge's
//! pointer angle.

use crate::domain::ValueDomain;

/// Pure angle<->value arithmetic over one domain.
///
/// Angles are degrees with 0 straight up and clockwise positive. The sweep
/// is the configured arc (default -135..135); pointer angles outside it are
/// clamped to the nearest end before mapping.
#[derive(Debug, Clone, Copy)]
pub struct AngularMapping {
    domain: ValueDomain,
    sweep_min_deg: f64,
    sweep_max_deg: f64,
}

impl AngularMapping {
    pub fn new(domain: ValueDomain, sweep_min_deg: f64, sweep_max_deg: f64) -> Self {
        AngularMapping {
            domain,
            sweep_min_deg,
            sweep_max_deg,
        }
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    pub fn sweep_deg(&self) -> (f64, f64) {
        (self.sweep_min_deg, self.sweep_max_deg)
    }

    /// Pointer coordinate -> angle in degrees relative to the pivot.
    /// `atan2(dx, pivot_y - y)`: straight up is 0, clockwise positive.
    pub fn pointer_angle(pivot_x: f64, pivot_y: f64, x: f64, y: f64) -> f64 {
        let dx = x - pivot_x;
        let dy = pivot_y - y;
        dx.atan2(dy).to_degrees()
    }

    /// Angle -> internal value: clamp to the sweep, then map linearly over
    /// the domain and round to the step.
    pub fn value_at(&self, angle_deg: f64) -> i32 {
        let angle = angle_deg.clamp(self.sweep_min_deg, self.sweep_max_deg);
        let frac = (angle - self.sweep_min_deg) / (self.sweep_max_deg - self.sweep_min_deg);
        let raw = self.domain.min as f64 + frac * self.domain.span() as f64;
        self.domain.snap(raw).unwrap_or(self.domain.min)
    }

    /// Internal value -> angle. Inverse of [`value_at`] up to step rounding.
    pub fn angle_for(&self, value: i32) -> f64 {
        let frac = (value - self.domain.min) as f64 / self.domain.span() as f64;
        self.sweep_min_deg + frac * (self.sweep_max_deg - self.sweep_min_deg)
    }

    /// Full pointer -> value path used by taps and drags.
    pub fn value_for_pointer(&self, pivot_x: f64, pivot_y: f64, x: f64, y: f64) -> i32 {
        self.value_at(Self::pointer_angle(pivot_x, pivot_y, x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MeasurementKind;

    fn glucose_mapping() -> AngularMapping {
        AngularMapping::new(MeasurementKind::Glucose.domain(), -135.0, 135.0)
    }

    #[test]
    fn pointer_straight_up_is_midpoint() {
        let m = glucose_mapping();
        // Pointer directly above the pivot: 0 degrees, centered in the
        // symmetric sweep, so the domain midpoint.
        let v = m.value_for_pointer(150.0, 150.0, 150.0, 30.0);
        assert_eq!(v, 220);
    }

    #[test]
    fn sweep_ends_map_to_domain_ends() {
        let m = glucose_mapping();
        assert_eq!(m.value_at(-135.0), 40);
        assert_eq!(m.value_at(135.0), 400);
        // Outside the sweep clamps silently.
        assert_eq!(m.value_at(-179.0), 40);
        assert_eq!(m.value_at(179.0), 400);
    }

    #[test]
    fn angle_value_roundtrip() {
        let m = glucose_mapping();
        for v in [40, 100, 220, 333, 400] {
            assert_eq!(m.value_at(m.angle_for(v)), v);
        }
    }

    #[test]
    fn pointer_angle_quadrants() {
        // Right of pivot: +90. Left: -90. Below: 180 magnitude.
        let a = AngularMapping::pointer_angle(0.0, 0.0, 10.0, 0.0);
        assert!((a - 90.0).abs() < 1e-9);
        let a = AngularMapping::pointer_angle(0.0, 0.0, -10.0, 0.0);
        assert!((a + 90.0).abs() < 1e-9);
        let a = AngularMapping::pointer_angle(0.0, 0.0, 0.0, 10.0);
        assert!((a.abs() - 180.0).abs() < 1e-9);
    }
}
