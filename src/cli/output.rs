//! Output formatting for koddi-healthcheck.
//!
//! Provides terminal, JSON, JUnit XML and HTML report formatters, plus the
//! live progress observer used by the CLI.
//!
//! # Graceful Degradation
//!
//! - Non-TTY output: color disabled via NO_COLOR or --no-color
//! - Multi-line details: the terminal table shows the first line only
//! - Markup in details: escaped for XML and HTML
//! - Empty reports: produce valid output with zero checks
//!
//! No function in this module will panic.

use std::io::Write;

use console::{pad_str, style, Alignment, StyledObject};

use crate::checks::CheckKind;
use crate::cli::args::OutputFormat;
use crate::engine::orchestrator::RunObserver;
use crate::engine::result::{HealthReport, Verdict};
use crate::{CheckResult, Status};

/// Widest detail cell in the terminal table, ellipsis included
pub const DETAILS_WIDTH: usize = 60;

const RULE: &str = "------------------------------------------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a health report into a string
    fn format(&self, report: &HealthReport) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool) -> Self {
        TerminalFormatter { color, verbose }
    }

    fn paint<D>(&self, styled: StyledObject<D>) -> StyledObject<D> {
        styled.force_styling(self.color)
    }

    fn status_cell(&self, status: Status, width: usize) -> String {
        let padded = pad_str(status.as_str_upper(), width, Alignment::Left, None).into_owned();
        let styled = match status {
            Status::Pass => style(padded).green(),
            Status::Warn => style(padded).yellow(),
            Status::Fail => style(padded).red().bold(),
            Status::Skipped => style(padded).dim(),
        };
        self.paint(styled).to_string()
    }

    fn verdict_label(&self, verdict: Verdict) -> String {
        let styled = match verdict {
            Verdict::Pass => style("PASS").green().bold(),
            Verdict::Fail => style("FAIL").red().bold(),
        };
        self.paint(styled).to_string()
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &HealthReport) -> String {
        let mut output = String::new();
        let ctx = &report.context;

        // Header
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!("{}\n", self.paint(style("Koddi Ads health check").bold())));
        output.push_str(&format!(
            "Member group: {}  Advertiser: {}  Client: {}\n",
            ctx.member_group_id, ctx.advertiser_id, ctx.client_name
        ));
        output.push_str(&format!(
            "Generated: {}\n",
            ctx.generated_at.format("%Y-%m-%dT%H:%M:%SZ")
        ));
        output.push_str(RULE);
        output.push_str("\n\n");

        // Summary table
        output.push_str(&format!(
            "{}{}{}{}\n",
            pad_str("Check #", 8, Alignment::Left, None),
            pad_str("Name", 30, Alignment::Left, None),
            pad_str("Status", 12, Alignment::Left, None),
            "Details"
        ));
        for check in &report.checks {
            output.push_str(&format!(
                "{}{}{}{}\n",
                pad_str(&check.number.to_string(), 8, Alignment::Left, None),
                pad_str(&check.name, 30, Alignment::Left, None),
                self.status_cell(check.status, 12),
                summarize_details(&check.details)
            ));
        }
        output.push('\n');

        if self.verbose {
            output.push_str("DETAILS\n");
            for check in &report.checks {
                let timing = if check.status == Status::Skipped {
                    String::new()
                } else {
                    format!(" ({}ms)", check.duration_ms)
                };
                output.push_str(&format!(
                    "  {}. {} [{}]{}\n",
                    check.number,
                    check.name,
                    check.status.as_str_upper(),
                    timing
                ));
                for line in check.details.lines() {
                    output.push_str(&format!("      {}\n", line));
                }
            }
            output.push('\n');
        }

        // Summary
        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "{} passed  {} warning(s)  {} failed  {} skipped\n",
            summary.passed, summary.warned, summary.failed, summary.skipped
        ));
        output.push_str(&format!(
            "Overall: {}  Total time: {:.1}s\n",
            self.verdict_label(report.overall),
            ctx.total_duration_ms as f64 / 1000.0
        ));
        output.push_str(RULE);

        output
    }
}

/// First line of `details`, cut to [`DETAILS_WIDTH`] characters
pub fn summarize_details(details: &str) -> String {
    let first = details.lines().next().unwrap_or("");
    if first.chars().count() <= DETAILS_WIDTH {
        return first.to_string();
    }
    let kept: String = first.chars().take(DETAILS_WIDTH - 3).collect();
    format!("{}...", kept)
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &HealthReport) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize report");
            format!(r#"{{"checks":[],"overall":"{}"}}"#, report.overall)
        })
    }
}

/// JUnit XML formatter
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }
}

impl Default for JunitFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JunitFormatter {
    fn format(&self, report: &HealthReport) -> String {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let summary = report.summary();
        let time = report.context.total_duration_ms as f64 / 1000.0;
        output.push_str(&format!(
            "<testsuites tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
            summary.total, summary.failed, summary.skipped, time
        ));
        output.push_str(&format!(
            "  <testsuite name=\"koddi-healthcheck\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\" timestamp=\"{}\">\n",
            summary.total,
            summary.failed,
            summary.skipped,
            time,
            report.context.generated_at.format("%Y-%m-%dT%H:%M:%S")
        ));

        for check in &report.checks {
            output.push_str(&format!(
                "    <testcase name=\"{}. {}\" classname=\"koddi-healthcheck.{}\" time=\"{:.3}\">\n",
                check.number,
                escape_xml(&check.name),
                escape_xml(&client_class(&report.context.client_name)),
                check.duration_ms as f64 / 1000.0
            ));

            match check.status {
                Status::Pass => {
                    output.push_str(&format!(
                        "      <system-out>{}</system-out>\n",
                        escape_xml(&check.details)
                    ));
                }
                Status::Warn => {
                    output.push_str(&format!(
                        "      <system-out>WARNING: {}</system-out>\n",
                        escape_xml(&check.details)
                    ));
                }
                Status::Fail => {
                    output.push_str(&format!(
                        "      <failure message=\"{}\">{}</failure>\n",
                        escape_xml(check.headline()),
                        escape_xml(&check.details)
                    ));
                }
                Status::Skipped => {
                    output.push_str(&format!(
                        "      <skipped message=\"{}\" />\n",
                        escape_xml(&check.details)
                    ));
                }
            }

            output.push_str("    </testcase>\n");
        }

        output.push_str("  </testsuite>\n");
        output.push_str("</testsuites>");
        output
    }
}

fn client_class(client_name: &str) -> String {
    client_name.replace('.', "_")
}

/// Standalone HTML page formatter
pub struct HtmlFormatter;

impl HtmlFormatter {
    pub fn new() -> Self {
        HtmlFormatter
    }

    fn card(check: &CheckResult) -> String {
        let (class, icon) = match check.status {
            Status::Pass => ("pass", "&#10003;"),
            Status::Warn => ("warn", "!"),
            Status::Fail => ("fail", "&#10007;"),
            Status::Skipped => ("skipped", "&#8211;"),
        };

        let mut card = format!(
            "<section class=\"card {}\">\n<h3><span class=\"icon\">{}</span> {}. {} <span class=\"badge\">{}</span></h3>\n",
            class,
            icon,
            check.number,
            escape_html(&check.name),
            check.status.as_str_upper()
        );

        let headline = escape_html(check.headline());
        if check.details.lines().count() > 1 {
            card.push_str(&format!(
                "<details><summary>{}</summary><pre>{}</pre></details>\n",
                headline,
                escape_html(&check.details)
            ));
        } else {
            card.push_str(&format!("<p>{}</p>\n", headline));
        }
        card.push_str("</section>\n");
        card
    }
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

const HTML_STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#1f2933}\
.tiles{display:flex;gap:1rem;margin:1rem 0}\
.tile{flex:1;border-radius:6px;padding:0.75rem;background:#f5f7fa;text-align:center}\
.tile strong{display:block;font-size:1.6rem}\
.banner{padding:0.75rem 1rem;border-radius:6px;font-weight:bold;margin:1rem 0}\
.banner.pass{background:#e3f9e5;color:#05400a}.banner.fail{background:#ffe3e3;color:#610404}\
.card{border-left:6px solid #9aa5b1;border-radius:4px;padding:0.25rem 1rem;margin:0.75rem 0;background:#fafbfc}\
.card.pass{border-color:#3ebd93}.card.warn{border-color:#f0b429}.card.fail{border-color:#e12d39}.card.skipped{border-color:#9aa5b1;opacity:0.8}\
.badge{font-size:0.75rem;padding:0.1rem 0.4rem;border-radius:3px;background:#e4e7eb}\
pre{white-space:pre-wrap;background:#f0f4f8;padding:0.5rem;border-radius:4px}";

impl OutputFormatter for HtmlFormatter {
    fn format(&self, report: &HealthReport) -> String {
        let ctx = &report.context;
        let summary = report.summary();
        let mut output = String::new();

        output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        output.push_str(&format!(
            "<title>Koddi Ads health check: {}</title>\n<style>{}</style>\n</head>\n<body>\n",
            escape_html(&ctx.client_name),
            HTML_STYLE
        ));

        output.push_str("<header>\n<h1>Koddi Ads health check</h1>\n");
        output.push_str(&format!(
            "<p>Member group <b>{}</b> &middot; Advertiser <b>{}</b> &middot; Client <b>{}</b> &middot; {}</p>\n</header>\n",
            ctx.member_group_id,
            ctx.advertiser_id,
            escape_html(&ctx.client_name),
            ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str("<div class=\"tiles\">\n");
        for (label, count) in [
            ("Passed", summary.passed),
            ("Warnings", summary.warned),
            ("Failed", summary.failed),
            ("Skipped", summary.skipped),
        ] {
            output.push_str(&format!(
                "<div class=\"tile\"><strong>{}</strong>{}</div>\n",
                count, label
            ));
        }
        output.push_str("</div>\n");

        let banner = match report.overall {
            Verdict::Pass => "All checks passed",
            Verdict::Fail => "One or more checks failed",
        };
        output.push_str(&format!(
            "<div class=\"banner {}\">Overall: {}</div>\n",
            report.overall, banner
        ));

        for check in &report.checks {
            output.push_str(&Self::card(check));
        }

        let json = JsonFormatter::new(true).format(report);
        output.push_str(&format!(
            "<details>\n<summary>Raw JSON</summary>\n<pre>{}</pre>\n</details>\n",
            escape_html(&json)
        ));
        output.push_str("</body>\n</html>\n");

        output
    }
}

/// Escape text for XML attributes and content
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c => result.push(c),
        }
    }
    result
}

/// Escape text for HTML content
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}

/// Get a formatter based on the output format
pub fn get_formatter(format: OutputFormat, color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TerminalFormatter::new(color, verbose)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Junit => Box::new(JunitFormatter::new()),
        OutputFormat::Html => Box::new(HtmlFormatter::new()),
    }
}

/// Prints one progress line per check to a writer (stderr in the CLI)
pub struct TerminalProgress<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TerminalProgress<W> {
    pub fn new(out: W, color: bool) -> Self {
        TerminalProgress { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RunObserver for TerminalProgress<W> {
    fn on_check_started(&mut self, kind: CheckKind) {
        let _ = write!(
            self.out,
            "[{}/{}] {} ... ",
            kind.number(),
            CheckKind::ALL.len(),
            kind.name()
        );
        let _ = self.out.flush();
    }

    fn on_check_finished(&mut self, result: &CheckResult) {
        let label = result.status.as_str_upper();
        let styled = match result.status {
            Status::Pass => style(label).green(),
            Status::Warn => style(label).yellow(),
            Status::Fail => style(label).red().bold(),
            Status::Skipped => style(label).dim(),
        }
        .force_styling(self.color);

        let _ = if result.status == Status::Skipped {
            writeln!(self.out, "{}", styled)
        } else {
            writeln!(self.out, "{} ({}ms)", styled, result.duration_ms)
        };
    }
}
