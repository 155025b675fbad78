//! The three walkthroughs run by the binary: fit a line to synthetic data,
//! fetch and split the energy expenditure data set, and compare its groups.
//!
//! Each step writes its report to any [`Write`] so the output can be captured.

use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    boxplot::{self, PlotConfig},
    synth::Linear,
    Config, Describe, Error, Format, Formula, Frame, GroupMean, Groups, Header, Lm, TTest,
};

pub const VALUE_COLUMN: &str = "expend";
pub const FLAG_COLUMN: &str = "obese";

/// Fit `y ~ x` to seeded synthetic data and print the regression report.
pub fn regression_demo(config: &Config, out: &mut impl Write) -> Result<Lm, Error> {
    let frame = Linear {
        n: config.n,
        seed: config.seed,
        ..Default::default()
    }
    .generate()?;
    let formula: Formula = "y ~ x".parse()?;
    let lm = Lm::from_formula(&formula, &frame)?;
    info!(
        "Fitted {} on {} observations, r2 = {}",
        formula,
        lm.n(),
        lm.r2()
    );
    match config.format {
        Format::Text => writeln!(out, "{}\n", lm.summary())?,
        Format::Json => {
            serde_json::to_writer(&mut *out, &lm)?;
            writeln!(out)?;
        },
    }
    Ok(lm)
}

/// Load the two-column data set, name its columns and split it on the flag.
pub fn fetch_demo(config: &Config) -> Result<(Frame, Groups), Error> {
    let text = config.data.read_to_string(config.timeout)?;
    let mut frame = Frame::from_csv_reader(text.as_bytes(), Header::Auto)?;
    frame.set_colnames(vec![VALUE_COLUMN.to_string(), FLAG_COLUMN.to_string()])?;
    let groups = frame.partition_by_flag(VALUE_COLUMN, FLAG_COLUMN)?;
    info!(
        "Loaded {} rows from {}: {} lean, {} obese",
        frame.nrows(),
        config.data,
        groups.lean.len(),
        groups.obese.len()
    );
    if groups.lean.is_empty() || groups.obese.is_empty() {
        warn!("One of the groups is empty");
    }
    Ok((frame, groups))
}

/// Everything the group comparison computes.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub group_means: Vec<GroupMean>,
    pub lean: Describe,
    pub obese: Describe,
    pub ttest: TTest,
    pub alpha: f64,
    pub significant: bool,
}

/// Print the group means, draw the boxplot, and test lean against obese.
pub fn comparison_demo(
    config: &Config,
    frame: &Frame,
    groups: &Groups,
    out: &mut impl Write,
) -> Result<Comparison, Error> {
    let group_means = frame.group_by_mean(FLAG_COLUMN)?;
    let lean = Describe::new(&groups.lean)?;
    let obese = Describe::new(&groups.obese)?;

    if let Some(path) = &config.boxplot {
        boxplot::render(
            path,
            &[("lean", &groups.lean), ("obese", &groups.obese)],
            &PlotConfig {
                title: Some("Energy expenditure by group".to_string()),
                y_label: Some(VALUE_COLUMN.to_string()),
                ..Default::default()
            },
        )?;
        info!("Wrote boxplot to {}", path.display());
    }

    let ttest = TTest::independent(&groups.lean, &groups.obese, config.variance)?;
    let significant = ttest.is_significant(config.alpha);
    let comparison = Comparison {
        group_means,
        lean,
        obese,
        ttest,
        alpha: config.alpha,
        significant,
    };

    match config.format {
        Format::Text => write_comparison(config, &comparison, out)?,
        Format::Json => {
            serde_json::to_writer(&mut *out, &comparison)?;
            writeln!(out)?;
        },
    }
    Ok(comparison)
}

fn write_comparison(config: &Config, c: &Comparison, out: &mut impl Write) -> Result<(), Error> {
    writeln!(out, "Mean by group")?;
    let names = c
        .group_means
        .first()
        .map(|g| g.means.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
        .unwrap_or_default();
    write!(out, "{:<8}", FLAG_COLUMN)?;
    for name in &names {
        write!(out, "{:>12}", name)?;
    }
    writeln!(out)?;
    for g in &c.group_means {
        write!(out, "{:<8}", g.key)?;
        for (_, mean) in &g.means {
            write!(out, "{:>12.6}", mean)?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    writeln!(out, "lean\n{}\n", c.lean)?;
    writeln!(out, "obese\n{}\n", c.obese)?;
    writeln!(out, "{}", c.ttest)?;
    if c.significant {
        writeln!(
            out,
            "The difference in mean {} between lean and obese is statistically significant (p = {:.4} < {})",
            VALUE_COLUMN,
            c.ttest.p_value(),
            c.alpha
        )?;
    } else if config.report_negative {
        writeln!(
            out,
            "No statistically significant difference in mean {} between lean and obese (p = {:.4} >= {})",
            VALUE_COLUMN,
            c.ttest.p_value(),
            c.alpha
        )?;
    }
    Ok(())
}

/// Run all three demos in order. The first failure ends the run.
pub fn run(config: &Config, out: &mut impl Write) -> Result<(), Error> {
    regression_demo(config, out)?;
    let (frame, groups) = fetch_demo(config)?;
    comparison_demo(config, &frame, &groups, out)?;
    out.flush()?;
    Ok(())
}
