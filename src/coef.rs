use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Coef {
    label: String,
    coef: f64,
    std_err: f64,
    t: f64,
    p: f64,
    conf_int: (f64, f64),
    intercept: bool,
}

impl Coef {
    pub fn new(
        label: impl ToString,
        coef: f64,
        std_err: f64,
        t: f64,
        p: f64,
        conf_int: (f64, f64),
    ) -> Self {
        Coef {
            label: label.to_string(),
            coef,
            std_err,
            t,
            p,
            conf_int,
            intercept: false,
        }
    }

    pub fn new_intercept(coef: f64, std_err: f64, t: f64, p: f64, conf_int: (f64, f64)) -> Self {
        Coef {
            intercept: true,
            ..Self::new("Intercept", coef, std_err, t, p, conf_int)
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn coef(&self) -> f64 {
        self.coef
    }

    pub fn std_err(&self) -> f64 {
        self.std_err
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    /// Lower and upper bound of the 95% confidence interval.
    pub fn conf_int(&self) -> (f64, f64) {
        self.conf_int
    }

    pub fn intercept(&self) -> bool {
        self.intercept
    }
}
