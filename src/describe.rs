use std::fmt;

use serde::Serialize;

use crate::{calc, Error};

/// Count, location and spread of a numeric series. Non-finite values are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    count: usize,
    mean: f64,
    std: f64,
    min: f64,
    q1: f64,
    median: f64,
    q3: f64,
    max: f64,
}

impl Describe {
    pub fn new(data: &[f64]) -> Result<Self, Error> {
        let sorted = calc::sorted_finite(data);
        if sorted.is_empty() {
            return Err(Error::InsufficientData { needed: 1, got: 0 });
        }
        let (mean, var) = calc::variance(&sorted, 1);
        Ok(Self {
            count: sorted.len(),
            mean,
            // a single observation has no sample spread
            std: if sorted.len() > 1 { var.sqrt() } else { f64::NAN },
            min: sorted[0],
            q1: calc::quantile_sorted(&sorted, 0.25),
            median: calc::quantile_sorted(&sorted, 0.5),
            q3: calc::quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[inline]
    pub fn std(&self) -> f64 {
        self.std
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn q1(&self) -> f64 {
        self.q1
    }

    #[inline]
    pub fn median(&self) -> f64 {
        self.median
    }

    #[inline]
    pub fn q3(&self) -> f64 {
        self.q3
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count  {:>10}", self.count)?;
        writeln!(f, "mean   {:>10.4}", self.mean)?;
        writeln!(f, "std    {:>10.4}", self.std)?;
        writeln!(f, "min    {:>10.4}", self.min)?;
        writeln!(f, "25%    {:>10.4}", self.q1)?;
        writeln!(f, "50%    {:>10.4}", self.median)?;
        writeln!(f, "75%    {:>10.4}", self.q3)?;
        write!(f, "max    {:>10.4}", self.max)
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
            assert_float_eq!($a, $b, 1e-12);
        };
    }

    #[test]
    fn test_describe() {
        let d = Describe::new(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(d.count(), 5);
        float_eq!(d.mean(), 3.0);
        float_eq!(d.std(), 2.5_f64.sqrt());
        float_eq!(d.min(), 1.0);
        float_eq!(d.q1(), 2.0);
        float_eq!(d.median(), 3.0);
        float_eq!(d.q3(), 4.0);
        float_eq!(d.max(), 5.0);
        float_eq!(d.iqr(), 2.0);
    }

    #[test]
    fn test_describe_single() {
        let d = Describe::new(&[7.0]).unwrap();
        assert_eq!(d.count(), 1);
        float_eq!(d.median(), 7.0);
        assert!(d.std().is_nan());
    }

    #[test]
    fn test_describe_empty() {
        assert!(matches!(
            Describe::new(&[]),
            Err(Error::InsufficientData { needed: 1, got: 0 })
        ));
        assert!(matches!(
            Describe::new(&[f64::NAN]),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_describe_display() {
        let d = Describe::new(&[1.0, 2.0]).unwrap();
        let s = d.to_string();
        let lines = s
            .lines()
            .map(|l| l.split_whitespace().collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], ["count", "2"]);
        assert_eq!(lines[1], ["mean", "1.5000"]);
        assert_eq!(lines[7], ["max", "2.0000"]);
    }
}
