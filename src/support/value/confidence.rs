/// Returns the two-sided standard normal quantile for a confidence level.
///
/// For example, `z_score(0.95)` is approximately `1.96`.
/// Levels outside `(0, 1)` return `NaN`.
///
/// Uses Acklam's rational approximation of the inverse normal CDF, which is
/// accurate to about `1.15e-9` relative error.
#[must_use]
pub fn z_score(confidence_level: f64) -> f64 {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return f64::NAN;
    }
    inverse_normal_cdf(0.5 + confidence_level / 2.0)
}

fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn common_confidence_levels() {
        assert_relative_eq!(z_score(0.6827), 1.0, epsilon = 1e-3);
        assert_relative_eq!(z_score(0.90), 1.644_853_6, epsilon = 1e-6);
        assert_relative_eq!(z_score(0.95), 1.959_964, epsilon = 1e-6);
        assert_relative_eq!(z_score(0.99), 2.575_829, epsilon = 1e-6);
        assert_relative_eq!(z_score(0.999), 3.290_527, epsilon = 1e-5);
    }

    #[test]
    fn out_of_range_levels() {
        assert!(z_score(0.0).is_nan());
        assert!(z_score(1.0).is_nan());
        assert!(z_score(-0.5).is_nan());
        assert!(z_score(f64::NAN).is_nan());
    }
}
