//! Property-based tests for interpolation, clamping and curves.
//!
//! Run with: cargo test -p roomlens-core --test properties

mod common;

use proptest::prelude::*;
use roomlens_core::transform::TransformCache;
use roomlens_core::{clamp01, lerp, Frame};
use serde_json::json;

use common::{isolated_mapper, spec};

fn any_float() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1e6..1e6f64,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(0.0),
        Just(1.0),
    ]
}

fn transform_spec() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("identity".to_string()),
        Just("clamp01".to_string()),
        (-120.0..-1.0f64).prop_map(|floor| format!("log10_clamp(floor_db={})", floor)),
        (-1.0..2.0f64, -2.0..10.0f64)
            .prop_map(|(threshold, slope)| format!("softclip({}, slope={})", threshold, slope)),
        (prop::collection::vec(0.1..500.0f64, 1..4), -1.0..5.0f64).prop_map(|(centers, k)| {
            let centers: Vec<String> = centers.iter().map(f64::to_string).collect();
            format!("inverse_exp(centers=[{}], k={})", centers.join(", "), k)
        }),
    ]
}

proptest! {
    #[test]
    fn lerp_hits_endpoints(lo in -1e4..1e4f64, hi in -1e4..1e4f64) {
        prop_assert_eq!(lerp(lo, hi, 0.0), lo);
        prop_assert!((lerp(lo, hi, 1.0) - hi).abs() <= 1e-9 * hi.abs().max(1.0));
    }

    #[test]
    fn lerp_is_monotonic(lo in -1e4..1e4f64, hi in -1e4..1e4f64, a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
        let (t0, t1) = if a <= b { (a, b) } else { (b, a) };
        let (v0, v1) = (lerp(lo, hi, t0), lerp(lo, hi, t1));
        if hi >= lo {
            prop_assert!(v0 <= v1);
        } else {
            prop_assert!(v0 >= v1);
        }
    }

    #[test]
    fn clamp01_is_idempotent(x in any_float()) {
        let once = clamp01(x);
        prop_assert!((0.0..=1.0).contains(&once));
        prop_assert_eq!(clamp01(once), once);
    }

    #[test]
    fn cached_curves_are_deterministic(spec in transform_spec(), x in -10.0..1000.0f64) {
        let cache = TransformCache::new();
        let first = cache.resolve(Some(spec.as_str()), "prop.feature").unwrap();
        let second = cache.resolve(Some(spec.as_str()), "prop.feature").unwrap();
        let (a, b) = (first.apply(x), second.apply(x));
        prop_assert!(a == b || (a.is_nan() && b.is_nan()));
    }

    #[test]
    fn axis_values_stay_in_range(
        spec_text in transform_spec(),
        x in any_float(),
        lo in -100.0..100.0f64,
        hi in -100.0..100.0f64,
    ) {
        let spec = spec(json!({
            "sensors": {"mic": {"enabled": true, "features": {
                "rms": {"transform": spec_text, "map_to": {"axis": "out", "range": [lo, hi]}}
            }}}
        }));
        let axes = isolated_mapper().apply(&Frame::new().with("mic_rms", x), &spec).unwrap();
        let value = axes["out"];
        prop_assert!(value >= lo.min(hi) - 1e-9 && value <= lo.max(hi) + 1e-9);
    }

    #[test]
    fn disabled_sensor_never_writes(keys in prop::collection::vec(("[a-z_]{1,8}", -5.0..5.0f64), 0..8)) {
        let spec = spec(json!({
            "sensors": {"mic": {"enabled": false, "features": {
                "rms": {"map_to": {"axis": "out"}}
            }}}
        }));
        let frame: Frame = keys.into_iter().collect();
        prop_assert!(isolated_mapper().apply(&frame, &spec).unwrap().is_empty());
    }
}

#[test]
fn log10_clamp_minus_thirty_db_is_half() {
    let curve = TransformCache::new().resolve(Some("log10_clamp"), "mic.rms").unwrap();
    assert!((curve.apply(10f64.powf(-30.0 / 20.0)) - 0.5).abs() < 1e-9);
    assert_eq!(curve.apply(0.0), 0.0);
    assert_eq!(curve.apply(-1.0), 0.0);
    assert_eq!(curve.apply(1.0), 1.0);
}

#[test]
fn softclip_passes_below_and_eases_above() {
    let curve = TransformCache::new()
        .resolve(Some("softclip(threshold=0.5, slope=6)"), "tof.motion_energy")
        .unwrap();
    assert_eq!(curve.apply(0.3), 0.3);
    let eased = curve.apply(0.9);
    assert!(eased > 0.5 && eased < 0.9, "got {}", eased);
}

#[test]
fn inverse_exp_scores_decrease_past_centers() {
    let curve = TransformCache::new()
        .resolve(Some("inverse_exp(centers=[50, 120], k=1.2)"), "light.flicker_hz")
        .unwrap();
    let (near, mid, far) = (curve.apply(30.0), curve.apply(80.0), curve.apply(160.0));
    assert!(near > mid && mid > far);
    assert_eq!(far, 0.0);
}
