use std::{path::PathBuf, str::FromStr, time::Duration};

use tracing::debug;

use crate::{DataSource, Error, Variance};

/// How the demos write their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Run settings, read from `LMDEMO_*` environment variables.
///
/// | variable                 | default       |
/// |--------------------------|---------------|
/// | `LMDEMO_SEED`            | `12345`       |
/// | `LMDEMO_N`               | `100`         |
/// | `LMDEMO_DATA`            | `embedded`    |
/// | `LMDEMO_TIMEOUT_SECS`    | `30`          |
/// | `LMDEMO_ALPHA`           | `0.05`        |
/// | `LMDEMO_WELCH`           | `false`       |
/// | `LMDEMO_BOXPLOT`         | `boxplot.svg` |
/// | `LMDEMO_FORMAT`          | `text`        |
/// | `LMDEMO_REPORT_NEGATIVE` | `false`       |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub seed: u64,
    pub n: usize,
    /// `LMDEMO_DATA`: an `http(s)://` URL, a file path, or `embedded`. The
    /// default reads the bundled copy of the energy data set and makes no
    /// network request; set a URL to fetch it with one HTTP GET instead.
    pub data: DataSource,
    pub timeout: Duration,
    pub alpha: f64,
    pub variance: Variance,
    /// `None` skips rendering.
    pub boxplot: Option<PathBuf>,
    pub format: Format,
    /// Also print a line when the difference is not significant.
    pub report_negative: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 12345,
            n: 100,
            data: DataSource::Embedded,
            timeout: Duration::from_secs(30),
            alpha: 0.05,
            variance: Variance::Pooled,
            boxplot: Some(PathBuf::from("boxplot.svg")),
            format: Format::Text,
            report_negative: false,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, Error> {
    value.trim().parse().map_err(|_| Error::InvalidConfig {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::InvalidConfig {
            key,
            value: value.to_string(),
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(v) = lookup("LMDEMO_SEED") {
            config.seed = parse("LMDEMO_SEED", &v)?;
        }
        if let Some(v) = lookup("LMDEMO_N") {
            config.n = parse("LMDEMO_N", &v)?;
            if config.n < 3 {
                return Err(Error::InvalidConfig {
                    key: "LMDEMO_N",
                    value: v,
                });
            }
        }
        if let Some(v) = lookup("LMDEMO_DATA") {
            config.data = v.parse().unwrap_or_default();
        }
        if let Some(v) = lookup("LMDEMO_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse("LMDEMO_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("LMDEMO_ALPHA") {
            config.alpha = parse("LMDEMO_ALPHA", &v)?;
            if !(config.alpha > 0.0 && config.alpha < 1.0) {
                return Err(Error::InvalidConfig {
                    key: "LMDEMO_ALPHA",
                    value: v,
                });
            }
        }
        if let Some(v) = lookup("LMDEMO_WELCH") {
            if parse_bool("LMDEMO_WELCH", &v)? {
                config.variance = Variance::Welch;
            }
        }
        if let Some(v) = lookup("LMDEMO_BOXPLOT") {
            let v = v.trim();
            config.boxplot = if v.eq_ignore_ascii_case("none") {
                None
            } else {
                let path = PathBuf::from(v);
                if !path.extension().is_some_and(|e| e == "svg") {
                    return Err(Error::InvalidConfig {
                        key: "LMDEMO_BOXPLOT",
                        value: v.to_string(),
                    });
                }
                Some(path)
            };
        }
        if let Some(v) = lookup("LMDEMO_FORMAT") {
            config.format = parse("LMDEMO_FORMAT", &v)?;
        }
        if let Some(v) = lookup("LMDEMO_REPORT_NEGATIVE") {
            config.report_negative = parse_bool("LMDEMO_REPORT_NEGATIVE", &v)?;
        }
        debug!("{:?}", config);
        Ok(config)
    }
}
