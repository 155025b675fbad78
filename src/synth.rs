use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::{Error, Frame};

/// Parameters of `y = slope * x + intercept + N(0, noise_sd)` for
/// `x = 0, 1, ..., n - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub noise_sd: f64,
    pub seed: u64,
}

impl Default for Linear {
    fn default() -> Self {
        Self {
            n: 100,
            slope: 0.5,
            intercept: -20.0,
            noise_sd: 1.0,
            seed: 12345,
        }
    }
}

impl Linear {
    /// Draw the sample as a frame with columns `x` and `y`. The same seed always
    /// gives the same sample.
    pub fn generate(&self) -> Result<Frame, Error> {
        if !(self.noise_sd >= 0.0 && self.noise_sd.is_finite()) {
            return Err(Error::Distribution(format!(
                "noise standard deviation must be finite and non-negative, got {}",
                self.noise_sd
            )));
        }
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        let noise = Normal::new(0.0, self.noise_sd)
            .map_err(|e| Error::Distribution(e.to_string()))?;
        let xs = (0..self.n).map(|x| x as f64).collect::<Vec<_>>();
        let ys = xs
            .iter()
            .zip(noise.sample_iter(&mut rng))
            .map(|(x, e)| self.slope * x + self.intercept + e)
            .collect::<Vec<_>>();
        Frame::from_columns([("x", xs), ("y", ys)])
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::{Formula, Lm};

    #[test]
    fn test_deterministic() {
        let a = Linear::default().generate().unwrap();
        let b = Linear::default().generate().unwrap();
        assert_eq!(a, b);
        let c = Linear {
            seed: 1,
            ..Default::default()
        }
        .generate()
        .unwrap();
        assert_ne!(a.column("y").unwrap(), c.column("y").unwrap());
    }

    #[test]
    fn test_shape() {
        let frame = Linear::default().generate().unwrap();
        assert_eq!(frame.nrows(), 100);
        assert_eq!(frame.colnames(), ["x", "y"]);
        assert_eq!(frame.column("x").unwrap()[99], 99.0);
    }

    #[test]
    fn test_invalid_sd() {
        for noise_sd in [-1.0, f64::NAN, f64::INFINITY] {
            let linear = Linear {
                noise_sd,
                ..Default::default()
            };
            assert!(
                matches!(linear.generate(), Err(Error::Distribution(_))),
                "{noise_sd}"
            );
        }
    }

    #[test]
    fn test_fit_recovers_line() {
        let frame = Linear::default().generate().unwrap();
        let formula: Formula = "y ~ x".parse().unwrap();
        let m = Lm::from_formula(&formula, &frame).unwrap();
        // standard errors are about 0.0035 and 0.2
        assert!((m.slopes()[0].coef() - 0.5).abs() < 0.02);
        assert!((m.intercept().unwrap().coef() + 20.0).abs() < 1.0);
        assert!(m.r2() > 0.99);
        let (lo, hi) = m.slopes()[0].conf_int();
        assert!(lo < m.slopes()[0].coef() && m.slopes()[0].coef() < hi);
    }

    #[test]
    fn test_noiseless() {
        let frame = Linear {
            noise_sd: 0.0,
            ..Default::default()
        }
        .generate()
        .unwrap();
        let m = Lm::from_formula(&"y ~ x".parse().unwrap(), &frame).unwrap();
        assert!((m.slopes()[0].coef() - 0.5).abs() < 1e-9);
        assert!((m.intercept().unwrap().coef() + 20.0).abs() < 1e-9);
    }
}
