//! End-to-end checks of the spectral derivative operators

mod common;

use std::collections::{BTreeSet, HashMap};
use std::f64::consts::PI;

use common::*;
use rft_core::diff::{self, apply_operator};
use rft_core::transform::ft;
use rft_core::{Axis, Direction, GridHeader, Order, RftContext, SpectralGrid, SpectralOperator};

#[test]
fn test_roundtrip_reproduces_field() {
    for &(nx, ny, nz) in &[(4, 4, 4), (8, 6, 10), (5, 7, 3), (16, 1, 9)] {
        let header = GridHeader::new(nx, ny, nz, 0.3, 0.7, 1.1).unwrap();
        let field = rough_field(header.dim(), 7);
        let mut ctx = RftContext::with_field(header, &field).unwrap();

        assert_eq!(ft(&mut ctx, -1), Some(Direction::Forward));
        assert_eq!(ft(&mut ctx, 1), Some(Direction::Backward));

        let err = relative_error(ctx.real(), &field);
        assert!(err < 1e-10, "{}x{}x{}: round trip relative error {}", nx, ny, nz, err);
    }
}

#[test]
fn test_invalid_direction_leaves_buffers_untouched() {
    let header = GridHeader::cube(4, 4, 6).unwrap();
    let mut ctx = RftContext::with_field(header, &rough_field(header.dim(), 3)).unwrap();
    ft(&mut ctx, -1);

    let real_before: Vec<u64> = ctx.real().iter().map(|v| v.to_bits()).collect();
    let spec_before = ctx.spectrum().to_vec();

    for isign in [0, 2, -3, 100] {
        assert_eq!(ft(&mut ctx, isign), None);
    }

    let real_after: Vec<u64> = ctx.real().iter().map(|v| v.to_bits()).collect();
    assert_eq!(real_after, real_before);
    assert_eq!(ctx.spectrum(), spec_before.as_slice());
}

#[test]
fn test_first_derivative_is_linear() {
    let header = GridHeader::new(6, 4, 8, 0.5, 1.0, 0.25).unwrap();
    let f = rough_field(header.dim(), 11);
    let g = rough_field(header.dim(), 23);
    let (a, b) = (2.5, -0.75);

    let mut ctx = RftContext::with_field(header, &f).unwrap();
    diff::diff_x(&mut ctx);
    let df = ctx.real().to_vec();

    ctx.load_field(&g).unwrap();
    diff::diff_x(&mut ctx);
    let dg = ctx.real().to_vec();

    let combo: Vec<f64> = f.iter().zip(g.iter()).map(|(u, v)| a * u + b * v).collect();
    ctx.load_field(&combo).unwrap();
    diff::diff_x(&mut ctx);

    let expected: Vec<f64> = df.iter().zip(dg.iter()).map(|(u, v)| a * u + b * v).collect();
    let err = max_abs_diff(ctx.real(), &expected);
    assert!(err < 1e-10, "linearity violated, max error {}", err);
}

#[test]
fn test_sine_derivatives_along_each_axis() {
    let header = GridHeader::new(16, 12, 8, 0.2, 0.5, 1.0).unwrap();
    let (dkx, dky, dkz) = header.freq_spacing();

    let cases = [
        (Axis::X, 3.0 * dkx),
        (Axis::Y, 2.0 * dky),
        (Axis::Z, 1.0 * dkz),
    ];

    for &(axis, k0) in &cases {
        let pick = move |p: [f64; 3]| match axis {
            Axis::X => p[0],
            Axis::Y => p[1],
            Axis::Z => p[2],
        };

        let mut ctx = context_with(header, |p| (k0 * pick(p)).sin());
        diff::diff(&mut ctx, axis, Order::First);
        let expected = sample(&ctx, |p| k0 * (k0 * pick(p)).cos());
        let err = max_abs_diff(ctx.real(), &expected);
        assert!(err < 1e-10 * k0.max(1.0), "{:?} first derivative error {}", axis, err);

        let mut ctx = context_with(header, |p| (k0 * pick(p)).sin());
        diff::diff(&mut ctx, axis, Order::Second);
        let expected = sample(&ctx, |p| -k0 * k0 * (k0 * pick(p)).sin());
        let err = max_abs_diff(ctx.real(), &expected);
        assert!(err < 1e-9 * (k0 * k0).max(1.0), "{:?} second derivative error {}", axis, err);
    }
}

#[test]
fn test_named_operators_match_parametrized() {
    let header = GridHeader::new(6, 6, 6, 0.4, 0.4, 0.4).unwrap();
    let field = sample(&RftContext::new(header).unwrap(), smooth_periodic(&header));

    let cases = [
        (Axis::X, Order::First),
        (Axis::X, Order::Second),
        (Axis::Y, Order::First),
        (Axis::Y, Order::Second),
        (Axis::Z, Order::First),
        (Axis::Z, Order::Second),
    ];

    for (axis, order) in cases {
        let mut a = RftContext::with_field(header, &field).unwrap();
        match (axis, order) {
            (Axis::X, Order::First) => diff::diff_x(&mut a),
            (Axis::X, Order::Second) => diff::diff_xx(&mut a),
            (Axis::Y, Order::First) => diff::diff_y(&mut a),
            (Axis::Y, Order::Second) => diff::diff_yy(&mut a),
            (Axis::Z, Order::First) => diff::diff_z(&mut a),
            (Axis::Z, Order::Second) => diff::diff_zz(&mut a),
        }
        let mut b = RftContext::with_field(header, &field).unwrap();
        apply_operator(&mut b, SpectralOperator::Partial(axis, order));
        assert_eq!(a.real(), b.real(), "{:?} {:?}", axis, order);
    }
}

#[test]
fn test_smooth_field_gradient() {
    let header = GridHeader::new(8, 10, 12, 0.25, 0.3, 0.2).unwrap();
    let (dkx, dky, dkz) = header.freq_spacing();
    let f = smooth_periodic(&header);

    let mut ctx = context_with(header, &f);
    diff::diff_y(&mut ctx);

    let expected = sample(&ctx, |[x, y, z]| {
        -2.0 * dky * (dkx * x).sin() * (2.0 * dky * y).sin()
            + 0.25 * dky * (dky * y - 2.0 * dkz * z).cos()
    });
    let err = max_abs_diff(ctx.real(), &expected);
    assert!(err < 1e-10, "d/dy of smooth field, max error {}", err);
}

#[test]
fn test_laplace_equals_sum_of_second_derivatives() {
    for &(nx, ny, nz) in &[(6, 8, 10), (5, 4, 7), (4, 4, 4)] {
        let header = GridHeader::new(nx, ny, nz, 0.5, 0.8, 1.3).unwrap();
        let field = rough_field(header.dim(), 5);

        let mut ctx = RftContext::with_field(header, &field).unwrap();
        diff::laplace(&mut ctx);
        let lap = ctx.real().to_vec();

        let mut sum = vec![0.0; header.dim()];
        for axis in Axis::ALL {
            ctx.load_field(&field).unwrap();
            diff::diff(&mut ctx, axis, Order::Second);
            for (s, v) in sum.iter_mut().zip(ctx.real().iter()) {
                *s += v;
            }
        }

        let scale = lap.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
        let err = max_abs_diff(&lap, &sum);
        assert!(err < 1e-11 * scale, "{}x{}x{}: laplace decomposition error {}", nx, ny, nz, err);
    }
}

#[test]
fn test_laplace_of_gaussian_is_accurate() {
    // Narrow Gaussian in a large box, effectively periodic and band-limited
    let header = GridHeader::new(32, 32, 32, 0.25, 0.25, 0.25).unwrap();
    let s2 = 0.3_f64;
    let mut ctx = context_with(header, |[x, y, z]| (-(x * x + y * y + z * z) / (2.0 * s2)).exp());
    diff::laplace(&mut ctx);

    let expected = sample(&ctx, |[x, y, z]| {
        let r2 = x * x + y * y + z * z;
        (r2 / (s2 * s2) - 3.0 / s2) * (-r2 / (2.0 * s2)).exp()
    });
    let err = max_abs_diff(ctx.real(), &expected);
    assert!(err < 1e-6, "laplacian of gaussian, max error {}", err);
}

#[test]
fn test_frequency_mapping_is_injective_up_to_last_axis_fold() {
    for &(nx, ny, nz) in &[(4, 6, 8), (3, 5, 7), (4, 4, 1), (2, 3, 2)] {
        let header = GridHeader::cube(nx, ny, nz).unwrap();
        let ctx = RftContext::new(header).unwrap();
        let mapper = ctx.mapper();
        let (dkx, dky, dkz) = header.freq_spacing();

        let mut counts: HashMap<(i64, i64, i64), usize> = HashMap::new();
        for l in 0..ctx.dim_fs() {
            let k = mapper.frequency_at(l);
            let key = (
                (k[0] / dkx).round() as i64,
                (k[1] / dky).round() as i64,
                (k[2] / dkz).round() as i64,
            );
            *counts.entry(key).or_insert(0) += 1;
        }

        // Only the top packed z bin folds onto kz = 0
        let rz = header.red_dim();
        for (&(_, _, kz), &n) in &counts {
            let expected = if kz == 0 && rz > 1 { 2 } else { 1 };
            assert_eq!(n, expected, "{}x{}x{}: multiplicity of kz={}", nx, ny, nz, kz);
        }
        let expected_distinct = if rz > 1 { ctx.dim_fs() - nx * ny } else { ctx.dim_fs() };
        assert_eq!(counts.len(), expected_distinct);

        // x and y cover the full signed range
        let kxs: BTreeSet<i64> = counts.keys().map(|k| k.0).collect();
        let lo = -((nx / 2) as i64);
        assert_eq!(kxs, (lo..lo + nx as i64).collect::<BTreeSet<i64>>());
    }
}

#[test]
fn test_linear_ramp_on_four_point_grid() {
    // f = x on 4x4x4, unit spacing, shifts (2, 2, 2): x ∈ {-2, -1, 0, 1}.
    // A ramp is a sawtooth once wrapped, so the spectral derivative is
    // [-π/2, π/2, π/2, -π/2] along x rather than 1: residual π/2 - 1 at the
    // interior samples and 1 + π/2 at the wrap-around samples.
    let header = GridHeader::cube(4, 4, 4).unwrap();
    assert_eq!(header.shifts(), (2, 2, 2));

    let mut ctx = context_with(header, |[x, _, _]| x);
    diff::diff_x(&mut ctx);

    let profile = [-PI / 2.0, PI / 2.0, PI / 2.0, -PI / 2.0];
    let mapper = ctx.mapper();
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                let v = ctx.real()[mapper.real_index(i, j, k)];
                assert!(
                    (v - profile[i]).abs() < 1e-12,
                    "({}, {}, {}): expected {}, got {}",
                    i, j, k, profile[i], v
                );
            }
        }
    }

    // Mean of a periodic derivative vanishes
    let mean: f64 = ctx.real().iter().sum::<f64>() / ctx.dim() as f64;
    assert!(mean.abs() < 1e-12);
    let worst = ctx.real().iter().map(|v| (v - 1.0).abs()).fold(0.0, f64::max);
    assert!((worst - (1.0 + PI / 2.0)).abs() < 1e-12);
}

#[test]
fn test_repeated_operator_is_stable() {
    let header = GridHeader::new(8, 8, 8, 0.5, 0.5, 0.5).unwrap();
    let (dkx, _, _) = header.freq_spacing();
    let mut ctx = context_with(header, |[x, _, _]| (dkx * x).sin());

    // Four first derivatives bring sin back to dk^4 · sin
    for _ in 0..4 {
        diff::diff_x(&mut ctx);
    }
    let expected = sample(&ctx, |[x, _, _]| dkx.powi(4) * (dkx * x).sin());
    let err = max_abs_diff(ctx.real(), &expected);
    assert!(err < 1e-10, "fourth derivative error {}", err);
}

#[test]
fn test_contexts_are_independent_across_threads() {
    let header = GridHeader::new(8, 8, 8, 0.5, 0.5, 0.5).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|seed| {
            std::thread::spawn(move || {
                let field = rough_field(header.dim(), seed);
                let mut ctx = RftContext::with_field(header, &field).unwrap();
                diff::laplace(&mut ctx);
                (field, ctx.into_field())
            })
        })
        .collect();

    for h in handles {
        let (field, lap) = h.join().unwrap();
        let mut ctx = RftContext::with_field(header, &field).unwrap();
        diff::laplace(&mut ctx);
        assert!(max_abs_diff(ctx.real(), &lap) < 1e-12);
    }
}
