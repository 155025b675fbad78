use serde::Serialize;
use tracing::debug;

use crate::calc;

/// Normality and autocorrelation checks on regression residuals.
#[derive(Debug, Clone, Serialize)]
pub struct ResidualDiagnostics {
    omnibus: f64,
    omnibus_p: f64,
    skew: f64,
    kurtosis: f64,
    durbin_watson: f64,
    jarque_bera: f64,
    jarque_bera_p: f64,
}

impl ResidualDiagnostics {
    pub fn new(residuals: &[f64]) -> Self {
        let (omnibus, omnibus_p) = omnibus(residuals);
        let (jarque_bera, jarque_bera_p) = jarque_bera(residuals);
        Self {
            omnibus,
            omnibus_p,
            skew: calc::skew(residuals),
            kurtosis: calc::kurtosis(residuals),
            durbin_watson: durbin_watson(residuals),
            jarque_bera,
            jarque_bera_p,
        }
    }

    pub fn omnibus(&self) -> f64 {
        self.omnibus
    }

    pub fn omnibus_p(&self) -> f64 {
        self.omnibus_p
    }

    pub fn skew(&self) -> f64 {
        self.skew
    }

    pub fn kurtosis(&self) -> f64 {
        self.kurtosis
    }

    pub fn durbin_watson(&self) -> f64 {
        self.durbin_watson
    }

    pub fn jarque_bera(&self) -> f64 {
        self.jarque_bera
    }

    pub fn jarque_bera_p(&self) -> f64 {
        self.jarque_bera_p
    }
}

// the chi-squared survival function with two degrees of freedom is exp(-x / 2)
#[inline(always)]
fn chi2_2_sf(x: f64) -> f64 {
    (-x / 2.0).exp()
}

/// D'Agostino's z statistic for skewness. Needs at least 8 observations.
pub fn skew_test(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if data.len() < 8 {
        return f64::NAN;
    }
    let b2 = calc::skew(data);
    let y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    delta * (y / alpha + ((y / alpha).powi(2) + 1.0).sqrt()).ln()
}

/// Anscombe and Glynn's z statistic for kurtosis. Needs at least 5
/// observations.
pub fn kurtosis_test(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if data.len() < 5 {
        return f64::NAN;
    }
    if data.len() < 20 {
        debug!("kurtosis test is only valid for n >= 20, got {}", data.len());
    }
    let b2 = calc::kurtosis(data);
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let varb2 =
        24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / varb2.sqrt();
    let sqrtbeta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrtbeta1 * (2.0 / sqrtbeta1 + (1.0 + 4.0 / sqrtbeta1.powi(2)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

/// Omnibus K² normality statistic and its p-value.
pub fn omnibus(data: &[f64]) -> (f64, f64) {
    let k2 = skew_test(data).powi(2) + kurtosis_test(data).powi(2);
    (k2, chi2_2_sf(k2))
}

/// Jarque-Bera statistic and its p-value.
pub fn jarque_bera(data: &[f64]) -> (f64, f64) {
    let n = data.len() as f64;
    let s = calc::skew(data);
    let k = calc::kurtosis(data);
    let jb = n / 6.0 * (s.powi(2) + (k - 3.0).powi(2) / 4.0);
    (jb, chi2_2_sf(jb))
}

pub fn durbin_watson(residuals: &[f64]) -> f64 {
    let diff = residuals
        .windows(2)
        .map(|w| (w[1] - w[0]).powi(2))
        .sum::<f64>();
    diff / residuals.iter().map(|r| r.powi(2)).sum::<f64>()
}
