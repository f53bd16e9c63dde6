//! Cloud and SaaS service health.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use dotkit_config::schema::{ServiceEntry, ServiceKind};
use dotkit_core::{Fetcher, Result};

use crate::argos::{ArgosItem, ArgosMenu, footer};
use crate::waybar::WaybarOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Operational,
    Degraded,
    Major,
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "operational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Major => "major",
            ServiceStatus::Unknown => "unknown",
        }
    }

    /// Traffic-light icon used in the Argos menu.
    pub fn argos_icon(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "🟢",
            ServiceStatus::Degraded => "🟡",
            ServiceStatus::Major => "🔴",
            ServiceStatus::Unknown => "⚪",
        }
    }

    pub fn waybar_icon(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "✅",
            other => other.argos_icon(),
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ServiceStatus::Operational => "#2ecc71",
            ServiceStatus::Degraded => "#f39c12",
            ServiceStatus::Major => "#e74c3c",
            ServiceStatus::Unknown => "#95a5a6",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a status endpoint's response to a status.
///
/// Each kind has its own fallback when the fetch fails: AWS and GCP assume
/// operational, statuspage and Azure report unknown.
pub fn classify(kind: ServiceKind, body: Result<String>) -> ServiceStatus {
    match kind {
        ServiceKind::Statuspage => body.map(|b| statuspage(&b)).unwrap_or(ServiceStatus::Unknown),
        ServiceKind::Aws => body.map(|b| aws(&b)).unwrap_or(ServiceStatus::Operational),
        ServiceKind::Gcp => body.map(|b| gcp(&b)).unwrap_or(ServiceStatus::Operational),
        ServiceKind::Azure => body.map(|b| azure(&b)).unwrap_or(ServiceStatus::Unknown),
    }
}

/// statuspage.io `status.indicator`.
fn statuspage(body: &str) -> ServiceStatus {
    let Ok(data) = serde_json::from_str::<Value>(body) else {
        return ServiceStatus::Unknown;
    };
    let Some(status) = data.get("status") else {
        return ServiceStatus::Unknown;
    };
    match status.get("indicator").and_then(Value::as_str).unwrap_or("none") {
        "none" => ServiceStatus::Operational,
        "minor" => ServiceStatus::Degraded,
        "major" | "critical" => ServiceStatus::Major,
        _ => ServiceStatus::Unknown,
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

/// AWS `data.json`: a list of services, each with a `current` incident list.
fn aws(body: &str) -> ServiceStatus {
    let Ok(Value::Array(services)) = serde_json::from_str::<Value>(body) else {
        return ServiceStatus::Operational;
    };
    let affected = services
        .iter()
        .any(|s| s.get("current").is_some_and(is_truthy));
    if affected { ServiceStatus::Degraded } else { ServiceStatus::Operational }
}

/// GCP `incidents.json`: an incident without an `end` is ongoing.
fn gcp(body: &str) -> ServiceStatus {
    let Ok(Value::Array(incidents)) = serde_json::from_str::<Value>(body) else {
        return ServiceStatus::Operational;
    };
    let ongoing = incidents
        .iter()
        .filter(|i| i.is_object())
        .any(|i| !i.get("end").is_some_and(is_truthy));
    if ongoing { ServiceStatus::Degraded } else { ServiceStatus::Operational }
}

/// Azure's HTML status page, scanned for keywords.
fn azure(body: &str) -> ServiceStatus {
    let page = body.to_lowercase();
    if page.contains("healthy") || page.contains("good") {
        ServiceStatus::Operational
    } else if page.contains("issue") || page.contains("problem") {
        ServiceStatus::Degraded
    } else {
        ServiceStatus::Operational
    }
}

/// Worst status wins; all operational is operational; anything else is unknown.
pub fn overall<'a>(statuses: impl IntoIterator<Item = &'a ServiceStatus>) -> ServiceStatus {
    let statuses: Vec<&ServiceStatus> = statuses.into_iter().collect();
    if statuses.iter().any(|s| **s == ServiceStatus::Major) {
        ServiceStatus::Major
    } else if statuses.iter().any(|s| **s == ServiceStatus::Degraded) {
        ServiceStatus::Degraded
    } else if statuses.iter().all(|s| **s == ServiceStatus::Operational) {
        ServiceStatus::Operational
    } else {
        ServiceStatus::Unknown
    }
}

/// A checked service.
#[derive(Debug, Clone)]
pub struct ServiceReport {
    pub service: ServiceEntry,
    pub status: ServiceStatus,
}

/// Check every service concurrently, keeping configured order.
pub async fn check_all(fetcher: &dyn Fetcher, services: &[ServiceEntry]) -> Vec<ServiceReport> {
    let checks = services.iter().map(|svc| async move {
        let body = fetcher.get_text(&svc.api).await;
        if let Err(ref e) = body {
            debug!(service = %svc.name, error = %e, "status fetch failed");
        }
        let status = classify(svc.kind, body);
        ServiceReport {
            service: svc.clone(),
            status,
        }
    });
    futures::future::join_all(checks).await
}

pub fn render_argos(reports: &[ServiceReport], time: &str) -> String {
    let worst = overall(reports.iter().map(|r| &r.status));
    let mut menu = ArgosMenu::new()
        .text(format!("{} ☁️", worst.argos_icon()))
        .separator()
        .item(ArgosItem::new("Service Health Monitor").size(14))
        .separator();
    for r in reports {
        menu.push(
            ArgosItem::new(format!("{} {}", r.status.argos_icon(), r.service.name))
                .href(&r.service.page)
                .color(r.status.color()),
        );
    }
    footer(&mut menu, "Last checked", time, "#7f8c8d", 10);
    menu.render()
}

pub fn render_waybar(reports: &[ServiceReport]) -> WaybarOutput {
    let tooltip: Vec<String> = reports
        .iter()
        .map(|r| format!("{} {}: {}", r.status.waybar_icon(), r.service.name, r.status))
        .collect();
    let bad = reports
        .iter()
        .filter(|r| r.status != ServiceStatus::Operational)
        .count();
    if bad == 0 {
        WaybarOutput::new("✅", tooltip.join("\n")).with_class("normal")
    } else {
        WaybarOutput::new(format!("🟡 {bad}"), tooltip.join("\n")).with_class("warning")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotkit_core::DotkitError;

    fn fail() -> Result<String> {
        Err(DotkitError::http("x", "timeout"))
    }

    #[test]
    fn test_statuspage_indicators() {
        let ok = |b: &str| classify(ServiceKind::Statuspage, Ok(b.to_string()));
        assert_eq!(ok(r#"{"status":{"indicator":"none"}}"#), ServiceStatus::Operational);
        assert_eq!(ok(r#"{"status":{"indicator":"minor"}}"#), ServiceStatus::Degraded);
        assert_eq!(ok(r#"{"status":{"indicator":"major"}}"#), ServiceStatus::Major);
        assert_eq!(ok(r#"{"status":{"indicator":"critical"}}"#), ServiceStatus::Major);
        assert_eq!(ok(r#"{"status":{}}"#), ServiceStatus::Operational);
        assert_eq!(ok(r#"{"page":{}}"#), ServiceStatus::Unknown);
        assert_eq!(ok("<html>"), ServiceStatus::Unknown);
        assert_eq!(classify(ServiceKind::Statuspage, fail()), ServiceStatus::Unknown);
    }

    #[test]
    fn test_aws() {
        let ok = |b: &str| classify(ServiceKind::Aws, Ok(b.to_string()));
        assert_eq!(ok(r#"[{"service":"ec2","current":[]}]"#), ServiceStatus::Operational);
        assert_eq!(ok(r#"[{"service":"ec2","current":[{"x":1}]}]"#), ServiceStatus::Degraded);
        assert_eq!(ok("{}"), ServiceStatus::Operational);
        assert_eq!(classify(ServiceKind::Aws, fail()), ServiceStatus::Operational);
    }

    #[test]
    fn test_gcp() {
        let ok = |b: &str| classify(ServiceKind::Gcp, Ok(b.to_string()));
        assert_eq!(ok(r#"[{"id":"a","end":"2024-01-01"}]"#), ServiceStatus::Operational);
        assert_eq!(ok(r#"[{"id":"a","end":"2024-01-01"},{"id":"b"}]"#), ServiceStatus::Degraded);
        assert_eq!(ok(r#"[{"id":"b","end":null}]"#), ServiceStatus::Degraded);
        assert_eq!(classify(ServiceKind::Gcp, fail()), ServiceStatus::Operational);
    }

    #[test]
    fn test_azure() {
        let ok = |b: &str| classify(ServiceKind::Azure, Ok(b.to_string()));
        assert_eq!(ok("All services HEALTHY"), ServiceStatus::Operational);
        assert_eq!(ok("Known issue in West Europe"), ServiceStatus::Degraded);
        assert_eq!(ok("<html></html>"), ServiceStatus::Operational);
        assert_eq!(classify(ServiceKind::Azure, fail()), ServiceStatus::Unknown);
    }

    #[test]
    fn test_overall() {
        use ServiceStatus::*;
        assert_eq!(overall(&[Operational, Degraded, Major]), Major);
        assert_eq!(overall(&[Operational, Unknown, Degraded]), Degraded);
        assert_eq!(overall(&[Operational, Operational]), Operational);
        assert_eq!(overall(&[Operational, Unknown]), Unknown);
    }
}
