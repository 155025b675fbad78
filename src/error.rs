#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("design matrix is singular")]
    SingularDesign,
    #[error("both groups have zero variance")]
    ZeroVariance,
    #[error("invalid formula: {0}")]
    InvalidFormula(String),
    #[error("column name {0} not found")]
    ColumnNameNotFound(String),
    #[error("column index {0} out of bounds")]
    ColumnIndexOutOfBounds(usize),
    #[error("unequal column lengths at {0}")]
    UnequalColumnLengths(usize),
    #[error("expected {expected} columns, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },
    #[error("invalid group flag {value} in row {row}")]
    InvalidFlag { value: f64, row: usize },
    #[error("parse float error on line {line}: {source}")]
    ParseFloat {
        line: usize,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
    #[error("http status {status} fetching {url}")]
    HttpStatus { status: u16, url: String },
    #[error("distribution error: {0}")]
    Distribution(String),
    #[error("plot error: {0}")]
    Plot(String),
    #[error("eigen error")]
    Eigen(faer::linalg::evd::EvdError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<faer::linalg::evd::EvdError> for Error {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn from(err: faer::linalg::evd::EvdError) -> Self {
        Error::Eigen(err)
    }
}
