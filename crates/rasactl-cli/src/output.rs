//! Terminal output: boxes, tables and one-line messages.

use colored::{Color, Colorize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use rasactl_core::PodSummary;
use rasactl_core::ReleaseInfo;
use rasactl_orchestrator::{InstallSummary, ListRow, StatusReport};

pub const NOTHING_TO_SHOW: &str = "Nothing to show, use the start command to create a new project";

/// Login created by the chart on first install.
const DEFAULT_USER: &str = "me";

/// Frame `lines` in a rounded box.
pub fn render_box(lines: &[String]) -> String {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let rule = "─".repeat(width + 2);

    let mut out = format!("╭{rule}╮\n");
    for line in lines {
        let pad = " ".repeat(width - line.chars().count());
        out.push_str(&format!("│ {line}{pad} │\n"));
    }
    out.push_str(&format!("╰{rule}╯"));
    out
}

pub fn print_box(lines: &[String], color: Color) {
    println!("{}", render_box(lines).color(color));
}

pub fn summary_lines(name: &str, summary: &InstallSummary) -> Vec<String> {
    vec![
        format!("Rasa X for the {name} deployment is ready!"),
        String::new(),
        format!("URL: {}", summary.url),
        format!("Rasa X version: {}", summary.version.rasa_x),
        format!("Rasa production version: {}", summary.version.production),
        format!("Rasa worker version: {}", summary.version.worker),
        format!("User: {DEFAULT_USER}"),
        format!("Password: {}", summary.password),
    ]
}

pub fn unreachable_hint_lines(url: &str) -> Vec<String> {
    vec![
        format!("{url} is not reachable from this host."),
        "Rasa X runs, but you may need a port-forward or an ingress".to_string(),
        "to open it in the browser.".to_string(),
    ]
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn nothing_to_show() {
    println!("{NOTHING_TO_SHOW}");
}

/// Print an error and its causes on one line.
pub fn error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "Error:".red().bold());
}

// ── Tables ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct ListLine {
    #[tabled(rename = "CURRENT")]
    current: &'static str,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
    #[tabled(rename = "RASA PRODUCTION")]
    production: String,
    #[tabled(rename = "RASA WORKER")]
    worker: String,
    #[tabled(rename = "ENTERPRISE")]
    enterprise: &'static str,
    #[tabled(rename = "VERSION")]
    version: String,
}

fn enterprise_label(enterprise: bool) -> &'static str {
    if enterprise { "active" } else { "inactive" }
}

pub fn list_table(rows: &[ListRow]) -> String {
    let lines = rows.iter().map(|row| ListLine {
        current: if row.current { "*" } else { "" },
        name: row.name.clone(),
        status: row.state.label(),
        production: row.production.clone(),
        worker: row.worker.clone(),
        enterprise: enterprise_label(row.enterprise),
        version: row.version.clone(),
    });
    Table::new(lines).with(Style::blank()).to_string()
}

pub fn status_lines(report: &StatusReport) -> Vec<String> {
    let project = report
        .project_path
        .as_ref()
        .map_or_else(|| "not defined".to_string(), |p| p.display().to_string());
    vec![
        format!("Name: {}", report.name),
        format!("Status: {}", report.state.label()),
        format!("Rasa X version: {}", report.version),
        format!("Rasa worker version: {}", report.worker_version),
        format!("Project path: {project}"),
    ]
}

#[derive(Tabled)]
struct ReleaseLine {
    #[tabled(rename = "RELEASE")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "REVISION")]
    revision: u32,
    #[tabled(rename = "CHART")]
    chart: String,
}

pub fn release_table(release: &ReleaseInfo) -> String {
    let line = ReleaseLine {
        name: release.name.clone(),
        status: release.status.clone(),
        revision: release.revision,
        chart: format!("{}-{}", release.chart_name, release.chart_version),
    };
    Table::new([line]).with(Style::blank()).to_string()
}

#[derive(Tabled)]
struct PodLine {
    #[tabled(rename = "POD")]
    name: String,
    #[tabled(rename = "CONDITION")]
    condition: String,
    #[tabled(rename = "PHASE")]
    phase: String,
}

pub fn pods_table(pods: &[PodSummary]) -> String {
    let lines = pods.iter().map(|pod| PodLine {
        name: pod.name.clone(),
        condition: pod.condition.clone(),
        phase: pod.phase.clone(),
    });
    Table::new(lines).with(Style::blank()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasactl_core::VersionInfo;
    use rasactl_orchestrator::DeploymentState;
    use std::path::PathBuf;

    #[test]
    fn box_pads_to_widest_line() {
        let rendered = render_box(&["ab".to_string(), "abcd".to_string()]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "╭──────╮");
        assert_eq!(lines[1], "│ ab   │");
        assert_eq!(lines[2], "│ abcd │");
        assert_eq!(lines[3], "╰──────╯");
    }

    #[test]
    fn summary_mentions_url_and_password() {
        let summary = InstallSummary {
            url: "http://demo.rasactl.local.io".to_string(),
            version: VersionInfo {
                production: "2.8.1".to_string(),
                worker: "2.8.1".to_string(),
                rasa_x: "0.42.0".to_string(),
                enterprise: false,
            },
            password: "rasaxlocal".to_string(),
        };
        let lines = summary_lines("demo", &summary);
        assert!(lines.contains(&"URL: http://demo.rasactl.local.io".to_string()));
        assert!(lines.contains(&"Password: rasaxlocal".to_string()));
        assert!(lines[0].contains("demo"));
    }

    #[test]
    fn list_table_marks_current() {
        let rows = vec![
            ListRow::recorded("demo", true, DeploymentState::Running, None),
            ListRow::recorded("other", false, DeploymentState::Stopped, None),
        ];
        let table = list_table(&rows);
        assert!(table.contains("NAME"));
        assert!(table.contains("RASA WORKER"));
        let demo = table.lines().find(|l| l.contains("demo")).unwrap();
        assert!(demo.contains('*'));
        assert!(demo.contains("Running"));
        let other = table.lines().find(|l| l.contains("other")).unwrap();
        assert!(!other.contains('*'));
        assert!(other.contains("inactive"));
    }

    #[test]
    fn status_lines_show_project_path() {
        let mut report = StatusReport {
            name: "demo".to_string(),
            state: DeploymentState::Stopped,
            version: "0.42.0".to_string(),
            worker_version: "0.0.0".to_string(),
            project_path: None,
            details: None,
        };
        assert_eq!(status_lines(&report)[4], "Project path: not defined");

        report.project_path = Some(PathBuf::from("/home/me/bot"));
        let lines = status_lines(&report);
        assert_eq!(lines.last().unwrap(), "Project path: /home/me/bot");
    }

    #[test]
    fn pods_table_lists_each_pod() {
        let pods = vec![
            PodSummary {
                name: "rasa-x-0".to_string(),
                condition: "Ready".to_string(),
                phase: "Running".to_string(),
            },
            PodSummary {
                name: "rasa-x-db-0".to_string(),
                condition: "ContainersNotReady".to_string(),
                phase: "Pending".to_string(),
            },
        ];
        let table = pods_table(&pods);
        assert!(table.contains("CONDITION"));
        assert!(table.contains("rasa-x-db-0"));
        assert!(table.contains("ContainersNotReady"));
    }
}
