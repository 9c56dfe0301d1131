use std::f64::consts::PI;

/// Confidence schedule `2 * ln(n_points * pi^2 * k^2 / (6 * tolerance))`
/// where `k` is the active set size (taken as 1 before the first round).
///
/// Non decreasing in `k`.
pub fn confidence_beta(n_points: usize, tolerance: f64, k: usize) -> f64 {
    let k = k.max(1) as f64;
    2. * (n_points as f64 * PI * PI * k * k / (6. * tolerance)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_initial_beta() {
        let expected = 2. * (100. * PI * PI / (6. * 0.01)).ln();
        assert_abs_diff_eq!(confidence_beta(100, 0.01, 1), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(confidence_beta(100, 0.01, 0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_beta_grows_with_rounds() {
        let mut previous = confidence_beta(400, 0.05, 1);
        for k in 2..200 {
            let beta = confidence_beta(400, 0.05, k);
            assert!(beta >= previous);
            previous = beta;
        }
        // 2 ln(k^2) increment
        assert_abs_diff_eq!(
            confidence_beta(400, 0.05, 10) - confidence_beta(400, 0.05, 1),
            4. * 10f64.ln(),
            epsilon = 1e-12
        );
    }
}
