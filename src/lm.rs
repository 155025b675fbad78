use std::fmt;

use faer::{
    linalg::solvers::{DenseSolveCore, Solve},
    ColRef, Mat, MatRef, Side,
};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use tracing::{debug, warn};

use crate::{coef::Coef, diagnostics::ResidualDiagnostics, Error, Formula, Frame};

/// An ordinary least squares fit.
#[derive(Debug, Clone, Serialize)]
pub struct Lm {
    response: String,
    // the last element is the intercept when the model has one
    coefs: Vec<Coef>,
    predicted: Vec<f64>,
    residuals: Vec<f64>,
    r2: f64,
    adj_r2: f64,
    f: f64,
    f_p: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    condition_number: f64,
    diagnostics: ResidualDiagnostics,
    n: u64,
    m: u64,
    add_intercept: bool,
}

impl Lm {
    /// Fit `ys` on the columns of `xs`, appending a column of ones when
    /// `add_intercept` is set.
    #[tracing::instrument(skip(xs, ys, colnames))]
    pub fn fit(
        xs: MatRef<'_, f64>,
        ys: &[f64],
        add_intercept: bool,
        colnames: Option<&[String]>,
    ) -> Result<Self, Error> {
        let n = ys.len();
        let ncols = xs.ncols();
        if xs.nrows() != n {
            return Err(Error::UnequalColumnLengths(xs.nrows().min(n) + 1));
        }
        let p = ncols + add_intercept as usize;
        if n <= p {
            return Err(Error::InsufficientData {
                needed: p + 1,
                got: n,
            });
        }
        let x = Mat::from_fn(
            n,
            p,
            #[inline(always)]
            |i, j| if j < ncols { xs[(i, j)] } else { 1.0 },
        );
        let y = ColRef::from_slice(ys);

        let xtx = x.transpose() * &x;
        let xty = x.transpose() * y;
        let eigenvalues = xtx.self_adjoint_eigenvalues(Side::Lower)?;
        let lambda_max = eigenvalues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lambda_min = eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
        if lambda_min <= lambda_max * f64::EPSILON * p as f64 {
            warn!("Smallest eigenvalue of X'X is {}", lambda_min);
            return Err(Error::SingularDesign);
        }
        let llt = xtx.llt(Side::Lower).map_err(|_| Error::SingularDesign)?;
        let betas = llt.solve(xty);
        let xtx_inv = llt.inverse();
        debug!("Calculated betas");

        let predicted_col = &x * &betas;
        let predicted = (0..n).map(|i| predicted_col[i]).collect::<Vec<_>>();
        let residuals = ys
            .iter()
            .zip(predicted.iter())
            .map(|(y, p)| y - p)
            .collect::<Vec<_>>();

        let df_resid = (n - p) as f64;
        let df_model = ncols as f64;
        let rss = residuals.iter().map(|r| r.powi(2)).sum::<f64>();
        // models without an intercept are judged against zero, not the mean
        let tss = if add_intercept {
            let mean = ys.iter().sum::<f64>() / n as f64;
            ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>()
        } else {
            ys.iter().map(|y| y.powi(2)).sum::<f64>()
        };
        let r2 = 1.0 - rss / tss;
        let adj_r2 = calculate_adj_r2(r2, n, ncols, add_intercept);
        let sigma2 = rss / df_resid;

        let (f, f_p) = if ncols > 0 {
            let f = ((tss - rss) / df_model) / sigma2;
            let dist = FisherSnedecor::new(df_model, df_resid)
                .map_err(|e| Error::Distribution(e.to_string()))?;
            (f, upper_tail(f, |f| dist.sf(f)))
        } else {
            (f64::NAN, f64::NAN)
        };

        let nf = n as f64;
        let log_likelihood =
            -nf / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (rss / nf).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * p as f64;
        let bic = -2.0 * log_likelihood + p as f64 * nf.ln();

        let t_dist =
            StudentsT::new(0.0, 1.0, df_resid).map_err(|e| Error::Distribution(e.to_string()))?;
        let t_crit = t_dist.inverse_cdf(0.975);
        let inference = |j: usize| {
            let coef = betas[j];
            let std_err = (sigma2 * xtx_inv[(j, j)]).sqrt();
            let t = coef / std_err;
            let p = 2.0 * upper_tail(t.abs(), |t| t_dist.sf(t));
            let conf_int = (coef - t_crit * std_err, coef + t_crit * std_err);
            (coef, std_err, t, p, conf_int)
        };
        let mut coefs = (0..ncols)
            .map(|j| {
                let (coef, std_err, t, p, conf_int) = inference(j);
                let label = colnames
                    .and_then(|c| c.get(j).cloned())
                    .unwrap_or_else(|| format!("x[{}]", j));
                Coef::new(label, coef, std_err, t, p, conf_int)
            })
            .collect::<Vec<_>>();
        if add_intercept {
            let (coef, std_err, t, p, conf_int) = inference(ncols);
            coefs.push(Coef::new_intercept(coef, std_err, t, p, conf_int));
        }

        Ok(Lm {
            response: "y".to_string(),
            coefs,
            diagnostics: ResidualDiagnostics::new(&residuals),
            predicted,
            residuals,
            r2,
            adj_r2,
            f,
            f_p,
            log_likelihood,
            aic,
            bic,
            condition_number: (lambda_max / lambda_min).sqrt(),
            n: n as u64,
            m: ncols as u64,
            add_intercept,
        })
    }

    /// Fit the model described by `formula` on the columns of `frame`.
    pub fn from_formula(formula: &Formula, frame: &Frame) -> Result<Self, Error> {
        let ys = frame.column(formula.response())?;
        let cols = formula
            .terms()
            .iter()
            .map(|t| frame.column(t))
            .collect::<Result<Vec<_>, _>>()?;
        let xs = Mat::from_fn(ys.len(), cols.len(), |i, j| cols[j][i]);
        let mut lm = Self::fit(
            xs.as_ref(),
            ys,
            formula.intercept(),
            Some(formula.terms()),
        )?;
        lm.response = formula.response().to_string();
        Ok(lm)
    }

    pub fn coefs(&self) -> &[Coef] {
        &self.coefs
    }

    pub fn slopes(&self) -> &[Coef] {
        if self.add_intercept {
            &self.coefs[..self.coefs.len() - 1]
        } else {
            &self.coefs
        }
    }

    pub fn intercept(&self) -> Option<&Coef> {
        if self.add_intercept {
            self.coefs.last()
        } else {
            None
        }
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn predicted(&self) -> &[f64] {
        &self.predicted
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn r2(&self) -> f64 {
        self.r2
    }

    pub fn adj_r2(&self) -> f64 {
        self.adj_r2
    }

    pub fn f_statistic(&self) -> f64 {
        self.f
    }

    pub fn f_p(&self) -> f64 {
        self.f_p
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    pub fn condition_number(&self) -> f64 {
        self.condition_number
    }

    pub fn diagnostics(&self) -> &ResidualDiagnostics {
        &self.diagnostics
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn m(&self) -> u64 {
        self.m
    }

    pub fn df_resid(&self) -> u64 {
        self.n - self.m - self.add_intercept as u64
    }

    /// Predicted response for one row of regressors, in fit order.
    pub fn predict(&self, x: &[f64]) -> Result<f64, Error> {
        let slopes = self.slopes();
        if x.len() != slopes.len() {
            return Err(Error::ColumnCountMismatch {
                expected: slopes.len(),
                got: x.len(),
            });
        }
        let intercept = self.intercept().map(Coef::coef).unwrap_or(0.0);
        Ok(slopes
            .iter()
            .zip(x)
            .fold(intercept, |v, (c, x)| v + c.coef() * x))
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }
}

// a perfect fit gives infinite statistics and an empty one NaN
#[inline(always)]
fn upper_tail(x: f64, sf: impl Fn(f64) -> f64) -> f64 {
    if x.is_nan() {
        f64::NAN
    } else if x.is_infinite() {
        0.0
    } else {
        sf(x)
    }
}

// NaN when there are no residual degrees of freedom
pub(crate) fn calculate_adj_r2(r2: f64, n: usize, m: usize, add_intercept: bool) -> f64 {
    let k = add_intercept as usize;
    match n.checked_sub(m + k) {
        Some(df) if df > 0 => 1.0 - (1.0 - r2) * n.saturating_sub(k) as f64 / df as f64,
        _ => f64::NAN,
    }
}

/// Text report of a fitted [`Lm`].
pub struct Summary<'a>(&'a Lm);

const WIDTH: usize = 78;

fn num(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x != 0.0 && (x.abs() >= 1e5 || x.abs() < 1e-3) {
        format!("{:.3e}", x)
    } else {
        format!("{:.3}", x)
    }
}

fn pair(
    f: &mut fmt::Formatter<'_>,
    l1: &str,
    v1: impl fmt::Display,
    l2: &str,
    v2: impl fmt::Display,
) -> fmt::Result {
    writeln!(f, "{:<20}{:>19}   {:<20}{:>16}", l1, v1.to_string(), l2, v2.to_string())
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lm = self.0;
        let d = &lm.diagnostics;
        let heavy = "=".repeat(WIDTH);
        writeln!(f, "{:^width$}", "OLS Regression Results", width = WIDTH)?;
        writeln!(f, "{heavy}")?;
        pair(f, "Dep. Variable:", &lm.response, "R-squared:", num(lm.r2))?;
        pair(f, "Model:", "OLS", "Adj. R-squared:", num(lm.adj_r2))?;
        pair(f, "Method:", "Least Squares", "F-statistic:", num(lm.f))?;
        pair(f, "No. Observations:", lm.n, "Prob (F-statistic):", num(lm.f_p))?;
        pair(f, "Df Residuals:", lm.df_resid(), "Log-Likelihood:", num(lm.log_likelihood))?;
        pair(f, "Df Model:", lm.m, "AIC:", num(lm.aic))?;
        pair(f, "Covariance Type:", "nonrobust", "BIC:", num(lm.bic))?;
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "{:<11}{:>10}{:>11}{:>11}{:>11}{:>12}{:>12}",
            "", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
        )?;
        writeln!(f, "{}", "-".repeat(WIDTH))?;
        let ordered = lm.intercept().into_iter().chain(lm.slopes());
        for c in ordered {
            let label = c.label().chars().take(10).collect::<String>();
            writeln!(
                f,
                "{:<11}{:>10.4}{:>11.3}{:>11.3}{:>11.3}{:>12.3}{:>12.3}",
                label,
                c.coef(),
                c.std_err(),
                c.t(),
                c.p(),
                c.conf_int().0,
                c.conf_int().1
            )?;
        }
        writeln!(f, "{heavy}")?;
        pair(f, "Omnibus:", num(d.omnibus()), "Durbin-Watson:", num(d.durbin_watson()))?;
        pair(
            f,
            "Prob(Omnibus):",
            num(d.omnibus_p()),
            "Jarque-Bera (JB):",
            num(d.jarque_bera()),
        )?;
        pair(f, "Skew:", num(d.skew()), "Prob(JB):", num(d.jarque_bera_p()))?;
        pair(f, "Kurtosis:", num(d.kurtosis()), "Cond. No.", num(lm.condition_number))?;
        write!(f, "{heavy}")
    }
}
