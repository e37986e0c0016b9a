//! Output formatting tests.
//!
//! Render reports produced by real orchestrator runs through every
//! formatter.

use koddi_healthcheck::cli::args::OutputFormat;
use koddi_healthcheck::cli::output::{
    get_formatter, HtmlFormatter, JsonFormatter, JunitFormatter, OutputFormatter, TerminalFormatter,
};
use koddi_healthcheck::engine::orchestrator::Orchestrator;
use koddi_healthcheck::engine::result::HealthReport;
use koddi_healthcheck::http::{ApiResponse, Method};
use serde_json::{json, Value};

use crate::mocks::{envelope_err, envelope_ok, test_config, MockTransport};

fn healthy_report() -> HealthReport {
    Orchestrator::new(&test_config(), &MockTransport::healthy()).run_silent()
}

/// Login rejected, auction down: 2 failures, 5 skips
fn failing_report() -> HealthReport {
    let transport = MockTransport::healthy()
        .on(
            Method::Post,
            "/session/login",
            envelope_err(401, "E401", "bad <credentials> & \"quotes\""),
        )
        .on(
            Method::Post,
            "/auction-engine/winning_ads",
            Ok(ApiResponse::new(503, "")),
        );
    Orchestrator::new(&test_config(), &transport).run_silent()
}

fn campaign_heavy_report() -> HealthReport {
    let campaigns: Vec<_> = (0..3)
        .map(|i| json!({"name": format!("Campaign with a deliberately long descriptive name {}", i), "status": "active"}))
        .collect();
    let transport = MockTransport::healthy().on(
        Method::Post,
        "/campaigns_report",
        envelope_ok(json!({"campaigns": campaigns, "total": 3})),
    );
    Orchestrator::new(&test_config(), &transport).run_silent()
}

#[test]
fn test_json_document_contract() {
    let out = JsonFormatter::new(true).format(&failing_report());
    let value: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["overall"], "fail");
    let checks = value["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 7);
    for (i, check) in checks.iter().enumerate() {
        let object = check.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(check["check"], i as u64 + 1);
        assert!(check["name"].is_string());
        assert!(check["details"].as_str().map(|d| !d.is_empty()).unwrap_or(false));
    }
    assert_eq!(checks[1]["status"], "skipped");
    assert_eq!(checks[1]["details"], "Skipped — authentication failed");
    assert_eq!(checks[6]["status"], "fail");
}

#[test]
fn test_json_compact() {
    let out = JsonFormatter::new(false).format(&healthy_report());
    assert!(!out.contains('\n'));
    assert!(out.ends_with(r#""overall":"pass"}"#));
}

#[test]
fn test_terminal_table_truncates_details() {
    let report = campaign_heavy_report();
    let out = TerminalFormatter::new(false, false).format(&report);

    // The campaign list lines only appear in verbose mode
    assert!(out.contains("Found 3 campaign(s)"));
    assert!(!out.contains("Campaign with a deliberately long"));

    for line in out.lines().filter(|l| l.starts_with("2 ")) {
        let details = &line[50..];
        assert!(details.chars().count() <= 60, "too long: {}", details);
    }
    assert!(out.contains("..."));
    assert!(out.contains("7 passed  0 warning(s)  0 failed  0 skipped"));
}

#[test]
fn test_terminal_verbose_lists_campaigns() {
    let out = TerminalFormatter::new(false, true).format(&campaign_heavy_report());
    assert!(out.contains("Campaign with a deliberately long descriptive name 2"));
    assert!(out.contains("3. Campaigns Report [PASS]"));
}

#[test]
fn test_terminal_failing_summary() {
    let out = TerminalFormatter::new(false, false).format(&failing_report());
    assert!(out.contains("0 passed  0 warning(s)  2 failed  5 skipped"));
    assert!(out.contains("Overall: FAIL"));
    assert!(out.contains("SKIPPED"));
}

#[test]
fn test_junit_marks_failures_and_skips() {
    let out = JunitFormatter::new().format(&failing_report());

    assert!(out.contains("tests=\"7\" failures=\"2\" errors=\"0\" skipped=\"5\""));
    assert_eq!(out.matches("<failure ").count(), 2);
    assert_eq!(out.matches("<skipped ").count(), 5);
    assert!(out.contains("bad &lt;credentials&gt; &amp; &quot;quotes&quot;"));
    assert!(out.contains("<testcase name=\"7. Winning Ads (Test Auction)\""));
}

#[test]
fn test_html_report() {
    let out = HtmlFormatter::new().format(&failing_report());

    assert!(out.starts_with("<!DOCTYPE html>"));
    assert!(out.trim_end().ends_with("</html>"));
    assert!(!out.contains("bad <credentials>"));
    assert!(out.contains("bad &lt;credentials&gt;"));
    assert!(out.contains("Overall: One or more checks failed"));
    assert_eq!(out.matches("<section class=\"card").count(), 7);
    assert!(out.contains("class=\"card skipped\""));
    assert!(out.contains("&quot;overall&quot;: &quot;fail&quot;"));
}

#[test]
fn test_get_formatter_selects_format() {
    let report = healthy_report();

    let json = get_formatter(OutputFormat::Json, false, false).format(&report);
    assert!(serde_json::from_str::<Value>(&json).is_ok());

    let junit = get_formatter(OutputFormat::Junit, false, false).format(&report);
    assert!(junit.starts_with("<?xml"));

    let html = get_formatter(OutputFormat::Html, false, false).format(&report);
    assert!(html.starts_with("<!DOCTYPE html>"));

    let text = get_formatter(OutputFormat::Text, false, false).format(&report);
    assert!(text.contains("Koddi Ads health check"));
}
