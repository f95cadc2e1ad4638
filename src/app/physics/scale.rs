/// Square-root radius scale: the share of disc area between `range.0` and
/// `range.1` equals the share of magnitude between `domain.0` and `domain.1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct SqrtScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl SqrtScale {
    pub(in crate::app) fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub(in crate::app) fn radius(&self, magnitude: Option<f64>) -> f32 {
        match magnitude {
            Some(value) => radius(value, self.domain.0, self.domain.1, self.range.0, self.range.1),
            None => self.range.0.max(0.0),
        }
    }

    pub(in crate::app) fn range(&self) -> (f32, f32) {
        self.range
    }
}

pub(in crate::app) fn radius(
    magnitude: f64,
    domain_min: f64,
    domain_max: f64,
    range_min: f32,
    range_max: f32,
) -> f32 {
    let range_min = if range_min.is_finite() { range_min.max(0.0) } else { 0.0 };
    let range_max = if range_max.is_finite() {
        range_max.max(range_min)
    } else {
        range_min
    };

    let span = domain_max - domain_min;
    if !magnitude.is_finite()
        || !span.is_finite()
        || !domain_min.is_finite()
        || magnitude <= 0.0
        || span <= 0.0
    {
        return range_min;
    }

    let fraction = ((magnitude - domain_min) / span).clamp(0.0, 1.0);
    let min_sq = f64::from(range_min) * f64::from(range_min);
    let max_sq = f64::from(range_max) * f64::from(range_max);
    let area = min_sq + (fraction * (max_sq - min_sq));

    (area.sqrt() as f32).clamp(range_min, range_max)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn endpoints_map_to_range_endpoints() {
        assert_eq!(radius(1e9, 1e9, 4e9, 10.0, 40.0), 10.0);
        assert_eq!(radius(4e9, 1e9, 4e9, 10.0, 40.0), 40.0);
    }

    #[test]
    fn area_is_linear_in_magnitude_from_zero() {
        let small = radius(1e9, 0.0, 4e9, 0.0, 40.0);
        let large = radius(4e9, 0.0, 4e9, 0.0, 40.0);
        assert!(((large / small).powi(2) - 4.0).abs() < 1e-4);
        assert!((small - 20.0).abs() < 1e-4);
    }

    #[test]
    fn interior_radius_interpolates_area_not_root_magnitude() {
        let mid = radius(2.5e9, 1e9, 4e9, 10.0, 40.0);
        assert!((mid - 850.0_f32.sqrt()).abs() < 1e-3, "{mid}");
    }

    #[test]
    fn degenerate_inputs_clamp_to_minimum() {
        assert_eq!(radius(5.0, 5.0, 5.0, 6.0, 90.0), 6.0);
        assert_eq!(radius(0.0, 1.0, 10.0, 6.0, 90.0), 6.0);
        assert_eq!(radius(-3.0, 1.0, 10.0, 6.0, 90.0), 6.0);
        assert_eq!(radius(f64::NAN, 1.0, 10.0, 6.0, 90.0), 6.0);
        assert_eq!(radius(5.0, 10.0, 1.0, 6.0, 90.0), 6.0);
        assert_eq!(SqrtScale::new((1.0, 10.0), (6.0, 90.0)).radius(None), 6.0);
    }

    #[test]
    fn collapsed_range_still_respects_minimum() {
        assert_eq!(radius(7.0, 1.0, 10.0, 6.0, 2.0), 6.0);
    }

    proptest! {
        #[test]
        fn monotonic_and_bounded(
            a in 1.0f64..1e13,
            b in 1.0f64..1e13,
            lo in 1.0f64..1e6,
            width in 1.0f64..1e13,
            range_min in 0.5f32..20.0,
            extra in 0.0f32..300.0,
        ) {
            let (m1, m2) = if a <= b { (a, b) } else { (b, a) };
            let range_max = range_min + extra;
            let r1 = radius(m1, lo, lo + width, range_min, range_max);
            let r2 = radius(m2, lo, lo + width, range_min, range_max);

            prop_assert!(r1 <= r2, "r({m1})={r1} > r({m2})={r2}");
            prop_assert!(r1 >= range_min && r1 <= range_max);
            prop_assert!(r2 >= range_min && r2 <= range_max);
        }
    }
}
