#![allow(clippy::needless_range_loop)]

/// Mean of the non-NaN values in `data`, together with how many there were.
/// An input with no usable values has a mean of `0.0` and a count of `0`.
#[inline]
pub fn mean(data: &[f64]) -> (f64, u64) {
    let mut sum = 0.0;
    let mut count = 0;
    for i in 0..data.len() {
        let d = data[i];
        if !d.is_nan() {
            count += 1;
            sum += d;
        }
    }
    if count == 0 {
        (0.0, 0)
    } else {
        (sum / count as f64, count)
    }
}

/// Variance of the non-NaN values with `ddof` delta degrees of freedom.
/// Returns `(mean, variance)`; the variance is `0.0` when `count <= ddof`.
#[inline]
pub fn variance(data: &[f64], ddof: usize) -> (f64, f64) {
    let (m, count) = mean(data);
    let mut sum = 0.0;
    for i in 0..data.len() {
        let d = data[i];
        if !d.is_nan() {
            sum += (d - m).powi(2);
        }
    }
    let ddof = ddof as u64;
    if count <= ddof {
        return (m, 0.0);
    }
    (m, sum / (count - ddof) as f64)
}

/// Population central moment of order `k` about the mean.
pub fn central_moment(data: &[f64], k: i32) -> f64 {
    let (m, count) = mean(data);
    if count == 0 {
        return 0.0;
    }
    data.iter()
        .filter(|d| !d.is_nan())
        .map(|d| (d - m).powi(k))
        .sum::<f64>()
        / count as f64
}

/// Sample skewness, `m3 / m2^1.5` with population moments.
pub fn skew(data: &[f64]) -> f64 {
    let m2 = central_moment(data, 2);
    let m3 = central_moment(data, 3);
    m3 / m2.powf(1.5)
}

/// Sample kurtosis, `m4 / m2^2`. This is the plain (non-excess) kurtosis, so a
/// normal sample sits near 3.
pub fn kurtosis(data: &[f64]) -> f64 {
    let m2 = central_moment(data, 2);
    let m4 = central_moment(data, 4);
    m4 / m2.powi(2)
}

/// Quantile of already sorted, NaN-free data using linear interpolation
/// between the closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&q));
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        },
    }
}

/// Copy of the finite values of `data`, sorted ascending.
pub fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut v = data
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .collect::<Vec<_>>();
    v.sort_by(f64::total_cmp);
    v
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    macro_rules! assert_float_eq {
        ($a:expr, $b:expr, $tol:expr) => {
            assert!(($a - $b).abs() < $tol, "{:.22} != {:.22}", $a, $b);
        };
    }

    macro_rules! float_eq {
        ($a:expr, $b:expr) => {
            assert_float_eq!($a, $b, 1e-12);
        };
    }

    #[test]
    fn test_mean() {
        let (m, n) = mean(&[1.0, 2.0, 3.0, 4.0]);
        float_eq!(m, 2.5);
        assert_eq!(n, 4);
    }

    #[test]
    fn test_mean_nan() {
        let (m, n) = mean(&[1.0, f64::NAN, 3.0]);
        float_eq!(m, 2.0);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), (0.0, 0));
        assert_eq!(mean(&[f64::NAN]), (0.0, 0));
    }

    #[test]
    fn test_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let (m, v) = variance(&data, 0);
        float_eq!(m, 5.0);
        float_eq!(v, 4.0);
        let (_, v) = variance(&data, 1);
        float_eq!(v, 32.0 / 7.0);
    }

    #[test]
    fn test_variance_too_few() {
        let (m, v) = variance(&[3.0], 1);
        float_eq!(m, 3.0);
        float_eq!(v, 0.0);
    }

    #[test]
    fn test_skew_symmetric() {
        float_eq!(skew(&[1.0, 2.0, 3.0, 4.0, 5.0]), 0.0);
    }

    #[test]
    fn test_kurtosis() {
        // m2 = 2, m4 = 6.8
        float_eq!(kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]), 1.7);
    }

    #[test]
    fn test_quantile_sorted() {
        let data = [1.0, 2.0, 3.0, 4.0];
        float_eq!(quantile_sorted(&data, 0.0), 1.0);
        float_eq!(quantile_sorted(&data, 0.25), 1.75);
        float_eq!(quantile_sorted(&data, 0.5), 2.5);
        float_eq!(quantile_sorted(&data, 1.0), 4.0);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn test_sorted_finite() {
        assert_eq!(
            sorted_finite(&[3.0, f64::NAN, 1.0, f64::INFINITY, 2.0]),
            vec![1.0, 2.0, 3.0]
        );
    }
}
