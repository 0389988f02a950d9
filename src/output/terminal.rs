//! Terminal output formatting with colors and box drawing.

use bsvar_core::{Matrix, SddrResult};
use colored::Colorize;

use crate::gibbs::{RunStatus, SamplerOutput};

/// Format a sampler run for human-readable terminal output.
///
/// Shows the run status, posterior means of `B` and the hyperparameters, and
/// the smallest effective sample size as a mixing indicator.
pub fn format_summary(output: &SamplerOutput) -> String {
    let header = match output.status {
        RunStatus::Completed => format!("{} {}", "\u{2713}".green().bold(), "COMPLETED".green().bold()),
        RunStatus::Cancelled { completed_sweeps } => format!(
            "{} {}",
            "\u{26A0}".yellow().bold(),
            format!("CANCELLED after {} sweeps", completed_sweeps).yellow().bold()
        ),
    };

    let mut panel = Panel::open();
    panel
        .line(&header)
        .rule()
        .line(&format!("Draws: {}", output.posterior.len()))
        .line(&format!("Seed: {}", output.seed));

    let Some(summary) = output.posterior.summary() else {
        return panel.close();
    };

    panel.rule().line(&"Posterior mean of B:".bold().to_string());
    for row in matrix_rows(&summary.mean_b) {
        panel.line(&row);
    }

    let h = summary.mean_hyper;
    panel
        .rule()
        .line(&"Hyperparameters:".bold().to_string())
        .line(&format!(
            "  \u{03B3}_B {:.4}  \u{03B3}_A {:.4}",
            h.b_shrinkage, h.a_shrinkage
        ))
        .line(&format!(
            "  s_B {:.4}  s_A {:.4}  s {:.4}",
            h.b_scale, h.a_scale, h.global_scale
        ));

    let ess = summary.min_ess();
    let ess_text = format!("Min ESS: {:.0}", ess);
    let ess_text = match ess {
        e if e < 100.0 => ess_text.red(),
        e if e < 400.0 => ess_text.yellow(),
        _ => ess_text.green(),
    };
    panel.rule().line(&ess_text.to_string());
    panel.close()
}

/// Format a Savage–Dickey result for human-readable terminal output.
pub fn format_sddr(result: &SddrResult) -> String {
    let verdict = if result.log_sddr > 0.0 {
        "Evidence for diagonal B".green().bold()
    } else {
        "Evidence against diagonal B".red().bold()
    };

    let mut panel = Panel::open();
    panel.line(&verdict.to_string()).rule().line(&format!(
        "log SDDR: {:.3} (s.e. {:.3})",
        result.log_sddr, result.standard_error
    ));
    for eq in &result.equations {
        panel.line(&format!(
            "  equation {}: {:.3} ({} tested)",
            eq.equation, eq.log_sddr, eq.restrictions_tested
        ));
    }
    let draws = format!("Draws: {}", result.draws);
    if result.reliable {
        panel.line(&draws);
    } else {
        panel.line(&format!("{} {}", draws, "(unreliable)".yellow()));
    }
    panel.close()
}

fn matrix_rows(m: &Matrix) -> Vec<String> {
    m.row_iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>9.4}", v)).collect();
            format!("  {}", cells.join(" "))
        })
        .collect()
}

/// Inner width of a panel, in visible characters.
const PANEL_WIDTH: usize = 60;

/// Fixed-width box of text lines separated by horizontal rules.
struct Panel {
    text: String,
}

impl Panel {
    fn open() -> Self {
        let mut panel = Self { text: String::new() };
        panel.border('\u{250C}', '\u{2510}');
        panel
    }

    fn border(&mut self, left: char, right: char) -> &mut Self {
        self.text.push(left);
        self.text.push_str(&"\u{2500}".repeat(PANEL_WIDTH));
        self.text.push(right);
        self.text.push('\n');
        self
    }

    fn rule(&mut self) -> &mut Self {
        self.border('\u{251C}', '\u{2524}')
    }

    /// Add a content line, padded by its visible width so colour codes do
    /// not break the right edge.
    fn line(&mut self, content: &str) -> &mut Self {
        let padding = (PANEL_WIDTH - 2).saturating_sub(visible_width(content));
        self.text.push_str("\u{2502} ");
        self.text.push_str(content);
        self.text.push_str(&" ".repeat(padding));
        self.text.push_str(" \u{2502}\n");
        self
    }

    fn close(mut self) -> String {
        self.border('\u{2514}', '\u{2518}');
        self.text
    }
}

/// Printed width of `s`, skipping SGR escape sequences (`ESC [ ... m`).
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (false, _) => width += 1,
            (true, 'm') => in_escape = false,
            (true, _) => {}
        }
    }
    width
}
