pub mod boxplot;
mod calc;
mod coef;
mod config;
pub mod demo;
mod describe;
mod diagnostics;
mod error;
mod fetch;
mod formula;
mod frame;
mod lm;
pub mod synth;
mod ttest;

pub use crate::{
    calc::*, coef::*, config::*, describe::*, diagnostics::*, error::*, fetch::*, formula::*,
    frame::*, lm::*, ttest::*,
};
