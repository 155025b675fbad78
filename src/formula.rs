use std::{fmt, str::FromStr};

use crate::Error;

/// A model formula of the form `y ~ x1 + x2`. A `- 1` or `+ 0` term drops the
/// intercept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    response: String,
    terms: Vec<String>,
    intercept: bool,
}

impl Formula {
    #[inline]
    pub fn response(&self) -> &str {
        &self.response
    }

    #[inline]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[inline]
    pub fn intercept(&self) -> bool {
        self.intercept
    }
}

impl FromStr for Formula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lhs, rhs) = s
            .split_once('~')
            .ok_or_else(|| Error::InvalidFormula(format!("missing '~' in {s:?}")))?;
        let response = lhs.trim();
        if !is_name(response) {
            return Err(Error::InvalidFormula(format!("bad response {response:?}")));
        }
        let mut terms = Vec::new();
        let mut intercept = true;
        // a leading sign is implicitly '+'
        let mut sign = '+';
        let mut rest = rhs.trim();
        if rest.is_empty() {
            return Err(Error::InvalidFormula("empty right-hand side".to_string()));
        }
        loop {
            let end = rest.find(['+', '-']).unwrap_or(rest.len());
            let term = rest[..end].trim();
            match (sign, term) {
                ('+', "1") => intercept = true,
                ('+', "0") | ('-', "1") => intercept = false,
                ('+', t) if is_name(t) => {
                    if !terms.iter().any(|x| x == t) {
                        terms.push(t.to_string());
                    }
                },
                ('-', t) if is_name(t) => terms.retain(|x| x != t),
                (_, t) => return Err(Error::InvalidFormula(format!("bad term {t:?}"))),
            }
            if end == rest.len() {
                break;
            }
            sign = rest[end..].chars().next().unwrap_or('+');
            rest = &rest[end + 1..];
        }
        if terms.is_empty() && !intercept {
            return Err(Error::InvalidFormula("model has no terms".to_string()));
        }
        Ok(Self {
            response: response.to_string(),
            terms,
            intercept,
        })
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ ", self.response)?;
        if self.terms.is_empty() {
            return write!(f, "1");
        }
        write!(f, "{}", self.terms.join(" + "))?;
        if !self.intercept {
            write!(f, " - 1")?;
        }
        Ok(())
    }
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}
