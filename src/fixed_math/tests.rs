use super::*;

fn clamp_raw(value: i64) -> i64 {
    value.clamp(i32::MIN as i64, i32::MAX as i64)
}

/// Exact real value of a fixed-point number (f32 would drop low bits).
fn real(value: FixedNum) -> f64 {
    value.to_bits() as f64 / 65536.0
}

#[test]
fn test_add_sub_saturate_at_range_limits() {
    assert_eq!(FixedNum::MAX + FixedNum::ONE, FixedNum::MAX);
    assert_eq!(FixedNum::MIN - FixedNum::ONE, FixedNum::MIN);
    assert_eq!(FixedNum::MIN + FixedNum::MIN, FixedNum::MIN);
    assert_eq!(FixedNum::MAX - FixedNum::MIN, FixedNum::MAX);
    assert_eq!(-FixedNum::MIN, FixedNum::MAX, "Negating MIN must saturate, not wrap");
}

#[test]
fn test_mul_saturates_with_correct_sign() {
    let two = FixedNum::from_int(2);
    assert_eq!(FixedNum::MAX * two, FixedNum::MAX);
    assert_eq!(FixedNum::MIN * two, FixedNum::MIN);
    assert_eq!(FixedNum::MAX * -two, FixedNum::MIN);
    assert_eq!(FixedNum::from_int(300) * FixedNum::from_int(300), FixedNum::MAX);
}

#[test]
fn test_div_by_zero_is_deterministic_saturation() {
    assert_eq!(FixedNum::ONE / FixedNum::ZERO, FixedNum::MAX);
    assert_eq!(-FixedNum::ONE / FixedNum::ZERO, FixedNum::MIN);
    assert_eq!(FixedNum::ZERO / FixedNum::ZERO, FixedNum::ZERO);
}

#[test]
fn test_div_by_tiny_value_saturates() {
    assert_eq!(FixedNum::from_int(100) / FixedNum::DELTA, FixedNum::MAX);
    assert_eq!(FixedNum::from_int(-100) / FixedNum::DELTA, FixedNum::MIN);
}

#[test]
fn test_exact_binary_fractions_round_trip() {
    let a = FixedNum::from_num(1.5);
    let b = FixedNum::from_num(2.25);
    assert_eq!(a * b, FixedNum::from_num(3.375));
    assert_eq!(b / a, FixedNum::from_num(1.5));
    assert_eq!(a + b, FixedNum::from_num(3.75));
    assert_eq!(a - b, FixedNum::from_num(-0.75));
}

#[test]
fn test_from_num_saturates_out_of_range_floats() {
    assert_eq!(FixedNum::from_num(1.0e9_f32), FixedNum::MAX);
    assert_eq!(FixedNum::from_num(-1.0e9_f32), FixedNum::MIN);
}

#[test]
fn test_floor_int_rounds_towards_negative_infinity() {
    assert_eq!(FixedNum::from_num(3.75).floor_int(), 3);
    assert_eq!(FixedNum::from_num(-0.25).floor_int(), -1);
    assert_eq!(FixedNum::from_int(-4).floor_int(), -4);
}

#[test]
fn test_random_ops_match_wide_reference_within_one_ulp() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for _ in 0..20_000 {
        let a_bits = rng.i32(..);
        let b_bits = rng.i32(..);
        let a = FixedNum::from_bits(a_bits);
        let b = FixedNum::from_bits(b_bits);
        let (a64, b64) = (a_bits as i64, b_bits as i64);

        assert_eq!((a + b).to_bits() as i64, clamp_raw(a64 + b64), "add {a_bits} {b_bits}");
        assert_eq!((a - b).to_bits() as i64, clamp_raw(a64 - b64), "sub {a_bits} {b_bits}");

        let mul_ref = clamp_raw((a64 * b64) >> FixedNum::FRAC_BITS);
        let mul_got = (a * b).to_bits() as i64;
        assert!((mul_got - mul_ref).abs() <= 1, "mul {a_bits} {b_bits}: got {mul_got}, want {mul_ref}");

        if b_bits != 0 {
            let div_ref = clamp_raw((a64 << FixedNum::FRAC_BITS) / b64);
            let div_got = (a / b).to_bits() as i64;
            assert!((div_got - div_ref).abs() <= 1, "div {a_bits} {b_bits}: got {div_got}, want {div_ref}");
        }
    }
}

#[test]
fn test_small_range_ops_track_real_arithmetic() {
    // Values in the solver's working range (positions, velocities, densities)
    let mut rng = fastrand::Rng::with_seed(42);
    let ulp = 1.0 / 65536.0;

    for _ in 0..5_000 {
        let a = rng.f32() * 256.0 - 128.0;
        let b = rng.f32() * 16.0 - 8.0;
        let fa = FixedNum::from_num(a);
        let fb = FixedNum::from_num(b);
        let (ra, rb) = (real(fa), real(fb));

        assert!((real(fa + fb) - (ra + rb)).abs() <= ulp);
        assert!((real(fa * fb) - (ra * rb)).abs() <= ulp);
        if rb.abs() > 0.01 {
            assert!((real(fa / fb) - (ra / rb)).abs() <= ulp);
        }
    }
}

#[test]
fn test_approx_magnitude_zero_and_axes() {
    assert_eq!(approx_magnitude(FixedNum::ZERO, FixedNum::ZERO), FixedNum::ZERO);

    let ten = FixedNum::from_int(10);
    let along_x = approx_magnitude(ten, FixedNum::ZERO);
    let along_y = approx_magnitude(FixedNum::ZERO, -ten);
    assert_eq!(along_x, along_y, "Estimator must be symmetric in sign and axis");
}

#[test]
fn test_approx_magnitude_relative_error_is_bounded() {
    let mut worst = 0.0_f64;

    // Dense quarter-pixel sweep over a panel-sized square
    for ix in -256..=256 {
        for iy in -256..=256 {
            let dx = ix as f64 * 0.25;
            let dy = iy as f64 * 0.25;
            let exact = (dx * dx + dy * dy).sqrt();
            if exact < 1.0 {
                continue;
            }
            let estimate = real(approx_magnitude(FixedNum::from_num(dx), FixedNum::from_num(dy)));
            let rel = ((estimate - exact) / exact).abs();
            worst = worst.max(rel);
        }
    }

    assert!(worst <= 0.05, "Worst relative error {:.4} exceeds 5%", worst);
}

#[test]
fn test_approx_magnitude_is_monotonic_along_rays() {
    let directions = [(1, 0), (0, 1), (1, 1), (3, 1), (1, 3), (-2, 5), (7, -4), (-1, -1)];

    for (ux, uy) in directions {
        let mut last = FixedNum::ZERO;
        for step in 0..400 {
            let k = FixedNum::from_num(step as f32 * 0.1);
            let estimate = approx_magnitude(FixedNum::from_int(ux) * k, FixedNum::from_int(uy) * k);
            assert!(estimate >= last, "Estimate decreased along ray ({ux}, {uy}) at step {step}");
            last = estimate;
        }
    }
}

#[test]
fn test_approx_magnitude_is_monotonic_per_component() {
    let mut rng = fastrand::Rng::with_seed(99);

    for _ in 0..2_000 {
        let dy = FixedNum::from_num(rng.f32() * 64.0 - 32.0);
        let dx = FixedNum::from_num(rng.f32() * 32.0);
        let grow = FixedNum::from_num(rng.f32() * 8.0);

        let before = approx_magnitude(dx, dy);
        let after = approx_magnitude(dx + grow, dy);
        assert!(after >= before, "Growing |dx| must never shrink the estimate");

        let after_y = approx_magnitude(dy, dx + grow);
        assert!(after_y >= approx_magnitude(dy, dx), "Growing |dy| must never shrink the estimate");
    }
}

#[test]
fn test_approx_magnitude_saturates_instead_of_wrapping() {
    assert_eq!(approx_magnitude(FixedNum::MAX, FixedNum::MAX), FixedNum::MAX);
    assert_eq!(approx_magnitude(FixedNum::MIN, FixedNum::MIN), FixedNum::MAX);
}

#[test]
fn test_vec2_dot_and_perp() {
    let a = FixedVec2::from_ints(3, 4);
    let b = FixedVec2::from_ints(-2, 1);
    assert_eq!(a.dot(b), FixedNum::from_int(-2));
    assert_eq!(a.perp(), FixedVec2::from_ints(-4, 3));
    assert_eq!(a.dot(a.perp()), FixedNum::ZERO);
}

#[test]
fn test_vec2_division_by_zero_saturates_componentwise() {
    let v = FixedVec2::from_ints(5, -5) / FixedNum::ZERO;
    assert_eq!(v.x, FixedNum::MAX);
    assert_eq!(v.y, FixedNum::MIN);
}
