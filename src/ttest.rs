use std::fmt;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use crate::{calc, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Variance {
    /// Student's test with a pooled variance estimate.
    Pooled,
    /// Welch's test with the Welch-Satterthwaite degrees of freedom.
    Welch,
}

/// Independent two-sample t-test of `a` against `b`.
#[derive(Debug, Clone, Serialize)]
pub struct TTest {
    statistic: f64,
    df: f64,
    p_value: f64,
    mean_a: f64,
    mean_b: f64,
    variance: Variance,
}

impl TTest {
    #[tracing::instrument(skip(a, b))]
    pub fn independent(a: &[f64], b: &[f64], variance: Variance) -> Result<Self, Error> {
        let (mean_a, var_a) = calc::variance(a, 1);
        let (mean_b, var_b) = calc::variance(b, 1);
        let n_a = calc::mean(a).1 as f64;
        let n_b = calc::mean(b).1 as f64;
        for n in [n_a, n_b] {
            if n < 2.0 {
                return Err(Error::InsufficientData {
                    needed: 2,
                    got: n as usize,
                });
            }
        }
        let (se, df) = match variance {
            Variance::Pooled => {
                let df = n_a + n_b - 2.0;
                let pooled = ((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / df;
                ((pooled * (1.0 / n_a + 1.0 / n_b)).sqrt(), df)
            },
            Variance::Welch => {
                let va = var_a / n_a;
                let vb = var_b / n_b;
                let df = (va + vb).powi(2) / (va.powi(2) / (n_a - 1.0) + vb.powi(2) / (n_b - 1.0));
                ((va + vb).sqrt(), df)
            },
        };
        if se == 0.0 {
            return Err(Error::ZeroVariance);
        }
        let statistic = (mean_a - mean_b) / se;
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| Error::Distribution(e.to_string()))?;
        let p_value = 2.0 * dist.sf(statistic.abs());
        debug!("t = {}, df = {}, p = {}", statistic, df, p_value);
        Ok(Self {
            statistic,
            df,
            p_value,
            mean_a,
            mean_b,
            variance,
        })
    }

    #[inline]
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    #[inline]
    pub fn df(&self) -> f64 {
        self.df
    }

    #[inline]
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    #[inline]
    pub fn mean_a(&self) -> f64 {
        self.mean_a
    }

    #[inline]
    pub fn mean_b(&self) -> f64 {
        self.mean_b
    }

    #[inline]
    pub fn variance(&self) -> Variance {
        self.variance
    }

    /// Whether the difference is significant at level `alpha`.
    #[inline]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

impl fmt::Display for TTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.variance {
            Variance::Pooled => "Student",
            Variance::Welch => "Welch",
        };
        write!(
            f,
            "{} t-test: t = {:.4}, df = {:.2}, p = {:.4e}",
            name, self.statistic, self.df, self.p_value
        )
    }
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
            assert_float_eq!($a, $b, 1e-9);
        };
    }

    #[test]
    fn test_pooled() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let t = TTest::independent(&a, &b, Variance::Pooled).unwrap();
        float_eq!(t.statistic(), -1.8973665961010275);
        float_eq!(t.df(), 8.0);
        assert_float_eq!(t.p_value(), 0.09434977284243774, 1e-7);
        float_eq!(t.mean_a(), 3.0);
        float_eq!(t.mean_b(), 6.0);
        assert!(!t.is_significant(0.05));
        assert!(t.is_significant(0.1));
    }

    #[test]
    fn test_welch() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let t = TTest::independent(&a, &b, Variance::Welch).unwrap();
        float_eq!(t.statistic(), -1.8973665961010275);
        float_eq!(t.df(), 5.882352941176471);
        assert_float_eq!(t.p_value(), 0.10753119493062718, 1e-7);
    }

    #[test]
    fn test_symmetric() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let ab = TTest::independent(&a, &b, Variance::Pooled).unwrap();
        let ba = TTest::independent(&b, &a, Variance::Pooled).unwrap();
        float_eq!(ab.statistic(), -ba.statistic());
        float_eq!(ab.p_value(), ba.p_value());
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            TTest::independent(&[], &[1.0, 2.0], Variance::Pooled),
            Err(Error::InsufficientData { needed: 2, got: 0 })
        ));
        assert!(matches!(
            TTest::independent(&[1.0, 2.0], &[3.0], Variance::Welch),
            Err(Error::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn test_zero_variance() {
        assert!(matches!(
            TTest::independent(&[1.0, 1.0], &[1.0, 1.0, 1.0], Variance::Pooled),
            Err(Error::ZeroVariance)
        ));
    }

    #[test]
    fn test_display() {
        let t = TTest::independent(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], Variance::Pooled).unwrap();
        assert!(t.to_string().starts_with("Student t-test: t = -3.6742, df = 4.00, p = "));
    }
}
