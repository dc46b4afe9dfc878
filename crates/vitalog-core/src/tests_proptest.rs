use proptest::prelude::*;

/// Property-based suite for the mapping and synchronization invariants.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angular::AngularMapping;
    use crate::bands::BandTable;
    use crate::config::CaptureConfig;
    use crate::domain::MeasurementKind;
    use crate::logger::ReadingLogger;
    use crate::model::{Channel, ValueModel};
    use crate::scale::ScaleMapping;
    use crate::submit::NoHistory;

    fn kind_strategy() -> impl Strategy<Value = MeasurementKind> {
        prop_oneof![
            Just(MeasurementKind::Glucose),
            Just(MeasurementKind::Hba1c),
            Just(MeasurementKind::Weight),
        ]
    }

    // =========================================================================
    // Round-trip laws: value -> view -> value is the identity over the domain
    // =========================================================================
    proptest! {
        #[test]
        fn scale_roundtrip((kind, frac) in (kind_strategy(), 0.0f64..=1.0)) {
            let domain = kind.domain();
            let v = domain.snap(domain.min as f64 + frac * domain.span() as f64).unwrap();
            let m = ScaleMapping::new(domain, 8.0, 0.0);
            prop_assert_eq!(m.value_at(m.offset_for(v)), v);
        }

        #[test]
        fn angular_roundtrip((kind, frac) in (kind_strategy(), 0.0f64..=1.0)) {
            let domain = kind.domain();
            let v = domain.snap(domain.min as f64 + frac * domain.span() as f64).unwrap();
            let m = AngularMapping::new(domain, -135.0, 135.0);
            prop_assert_eq!(m.value_at(m.angle_for(v)), v);
        }
    }

    // =========================================================================
    // Commit invariant: any candidate lands in-domain, step-aligned, and
    // within one step of the clamped candidate
    // =========================================================================
    proptest! {
        #[test]
        fn commit_stays_in_domain((kind, candidate) in (kind_strategy(), -1e6f64..1e6)) {
            let domain = kind.domain();
            let mut model = ValueModel::new(domain, kind.default_seed());
            let commit = model.commit(candidate);

            prop_assert!(domain.contains(commit.value));
            prop_assert!(domain.is_aligned(commit.value));

            let clamped = candidate.clamp(domain.min as f64, domain.max as f64);
            prop_assert!(
                (commit.value as f64 - clamped).abs() <= domain.step as f64,
                "{} landed at {} (more than one step away)", candidate, commit.value
            );
        }

        #[test]
        fn non_finite_is_dropped(kind in kind_strategy()) {
            let mut model = ValueModel::new(kind.domain(), kind.default_seed());
            for candidate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                let before = model.value();
                let commit = model.commit(candidate);
                prop_assert!(!commit.changed);
                prop_assert_eq!(model.value(), before);
            }
        }
    }

    // =========================================================================
    // Fan-out consistency: after any channel write, every derived view
    // inverts back to the committed value
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn views_invert_to_committed_value(
            (kind, candidate) in (kind_strategy(), -5000.0f64..5000.0)
        ) {
            let config = CaptureConfig::default();
            let mut logger = ReadingLogger::open(kind, &config, &NoHistory);
            let commit = logger.write(candidate, Channel::Step);

            let ruler = logger.ruler();
            prop_assert_eq!(ruler.mapping().value_at(ruler.offset_px()), commit.value);

            let gauge = logger.gauge();
            prop_assert_eq!(gauge.mapping().value_at(gauge.angle_deg()), commit.value);

            prop_assert_eq!(
                logger.entry_text(),
                kind.domain().format(commit.value)
            );
        }
    }

    // =========================================================================
    // Band tables: total and non-overlapping over every kind's domain
    // =========================================================================
    proptest! {
        #[test]
        fn classify_total_and_non_overlapping((kind, frac) in (kind_strategy(), 0.0f64..=1.0)) {
            let domain = kind.domain();
            let v = domain.snap(domain.min as f64 + frac * domain.span() as f64).unwrap();
            let table = BandTable::builtin(kind);
            let band = table.classify(v);

            prop_assert!(v <= band.upper);
            // Non-overlap: the value is above every earlier band's bound.
            for earlier in table.bands().iter().take_while(|b| b.upper != band.upper) {
                prop_assert!(v > earlier.upper);
            }
        }
    }
}
