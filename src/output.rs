// Rendering of secrets and listings as text or JSON

use chrono::{DateTime, Local, Utc};
use colored::Colorize;

use crate::error::Error;
use crate::secret::{Secret, SecretMetadata};

/// Show a listing tip when a plain table gets longer than this.
const TIP_THRESHOLD: usize = 10;

pub fn secret_json(secret: &Secret) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(secret)?)
}

pub fn list_json(secrets: &[SecretMetadata]) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(secrets)?)
}

pub fn secret_text(secret: &Secret) -> String {
    let version = secret.version.to_string();
    let rows = [
        ("Name", secret.name.cyan().to_string()),
        ("Value", secret.value.green().to_string()),
        ("Type", secret.kind.clone()),
        ("Version", version),
    ];

    let mut out = format!("\n{}\n", "Secret".bold());
    for (label, value) in rows {
        out.push_str(&format!("  {} {}\n", format!("{:<8}", label).dimmed(), value));
    }

    if !secret.tags.is_empty() {
        let key_width = secret.tags.keys().map(|k| k.len()).max().unwrap_or(3).max(3);
        out.push_str(&format!("\n{}\n", "Tags".bold()));
        for (key, value) in &secret.tags {
            out.push_str(&format!("  {:<key_width$}  {}\n", key, value));
        }
    }
    out
}

/// Plain table of a listing. Names are shown relative to `base`.
pub fn list_text(secrets: &[SecretMetadata], base: &str, now: DateTime<Utc>, show_tip: bool) -> String {
    let title = if base == "/" {
        "All Secrets".to_string()
    } else {
        format!("Secrets at {}", base)
    };

    let rows: Vec<[String; 4]> = secrets
        .iter()
        .map(|s| {
            [
                display_name(&s.name, base).to_string(),
                s.kind.clone(),
                s.version.to_string(),
                s.last_modified
                    .map(|t| time_ago(t, now))
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let width = |col: usize, header: &str| {
        rows.iter()
            .map(|r| r[col].len())
            .max()
            .unwrap_or(0)
            .max(header.len())
    };
    let name_width = width(0, "NAME");
    let type_width = width(1, "TYPE");
    let version_width = width(2, "VERSION");

    let mut out = format!("\n{}\n\n", title.bold());
    out.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:<version_width$}  {}\n",
        "NAME", "TYPE", "VERSION", "LAST MODIFIED"
    ));
    out.push_str(&format!(
        "{:-<name_width$}  {:-<type_width$}  {:-<version_width$}  {}\n",
        "", "", "", "-------------"
    ));
    for [name, kind, version, modified] in &rows {
        out.push_str(&format!(
            "{}  {:<type_width$}  {:<version_width$}  {}\n",
            format!("{:<name_width$}", name).cyan(),
            kind,
            version,
            modified
        ));
    }

    out.push_str(&format!("\nTotal: {} secret(s)\n", secrets.len()));
    if show_tip && secrets.len() > TIP_THRESHOLD {
        out.push_str(&format!(
            "{}\n",
            "Tip: Use 'lockr list -i' for interactive fuzzy search".dimmed()
        ));
    }
    out
}

/// Details of an entry picked from the interactive list.
pub fn details_text(secret: &SecretMetadata) -> String {
    let mut out = format!("\n{} {}\n\n", "Selected:".bold(), secret.name.cyan());
    out.push_str(&format!("  Type:     {}\n", secret.kind));
    out.push_str(&format!("  Version:  {}\n", secret.version));
    if let Some(modified) = secret.last_modified {
        out.push_str(&format!(
            "  Modified: {}\n",
            modified.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ));
    }
    out.push_str(&format!("\n{}\n", "To read the value:".dimmed()));
    out.push_str(&format!("  lockr read {}\n", secret.name));
    out
}

/// `name` relative to the listed path, or unchanged when that would be empty.
pub fn display_name<'a>(name: &'a str, base: &str) -> &'a str {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return name;
    }
    match name.strip_prefix(base).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    }
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    let plural = |n: i64, unit: &str, units: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {units} ago")
        }
    };

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        plural(diff.num_minutes(), "min", "mins")
    } else if diff.num_hours() < 24 {
        plural(diff.num_hours(), "hour", "hours")
    } else if diff.num_days() < 30 {
        plural(diff.num_days(), "day", "days")
    } else {
        then.with_timezone(&Local).format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn meta(name: &str, minutes_ago: Option<i64>, now: DateTime<Utc>) -> SecretMetadata {
        SecretMetadata {
            name: name.to_string(),
            kind: "SecureString".to_string(),
            version: 4,
            last_modified: minutes_ago.map(|m| now - Duration::minutes(m)),
            description: None,
            tier: None,
        }
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(20), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 min ago");
        assert_eq!(time_ago(now - Duration::minutes(42), now), "42 mins ago");
        assert_eq!(time_ago(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(time_ago(now - Duration::days(1), now), "1 day ago");
        assert_eq!(time_ago(now - Duration::days(29), now), "29 days ago");

        let old = time_ago(now - Duration::days(90), now);
        assert!(old.ends_with(", 2024"), "{old}");
    }

    #[test]
    fn display_names_are_relative_to_base() {
        assert_eq!(display_name("/app/prod/key", "/app/prod"), "key");
        assert_eq!(display_name("/app/prod/nested/key", "/app/prod"), "nested/key");
        assert_eq!(display_name("/app/prod", "/app/prod"), "/app/prod");
        assert_eq!(display_name("/app/key", "/"), "/app/key");
        assert_eq!(display_name("/other/key", "/app"), "/other/key");
        assert_eq!(display_name("/app2/key", "/app"), "/app2/key");
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        assert_eq!(display_name("/app/key", "/app/"), "key");
        assert_eq!(display_name("/app/nested/key", "/app//"), "nested/key");
        assert_eq!(display_name("/app2/key", "/app/"), "/app2/key");
    }

    #[test]
    fn list_table_has_every_row() {
        let now = Utc::now();
        let secrets = vec![
            meta("/app/a", Some(5), now),
            meta("/app/b", None, now),
        ];
        let out = list_text(&secrets, "/app", now, true);

        assert!(out.contains("Secrets at /app"));
        assert!(out.contains("LAST MODIFIED"));
        assert!(out.contains("5 mins ago"));
        assert!(out.contains("Total: 2 secret(s)"));
        assert!(!out.contains("Tip:"));
    }

    #[test]
    fn long_listing_shows_tip_unless_interactive() {
        let now = Utc::now();
        let secrets: Vec<_> = (0..11).map(|i| meta(&format!("/k{i}"), None, now)).collect();

        assert!(list_text(&secrets, "/", now, true).contains("Tip:"));
        assert!(!list_text(&secrets, "/", now, false).contains("Tip:"));
        assert!(list_text(&secrets, "/", now, true).contains("All Secrets"));
    }

    #[test]
    fn secret_text_lists_tags() {
        let secret = Secret {
            name: "/app/key".into(),
            value: "hunter2".into(),
            kind: "SecureString".into(),
            version: 7,
            tags: BTreeMap::from([("owner".to_string(), "platform".to_string())]),
        };
        let out = secret_text(&secret);

        assert!(out.contains("hunter2"));
        assert!(out.contains("Tags"));
        assert!(out.contains("owner"));
        assert!(out.contains("platform"));
    }

    #[test]
    fn secret_json_contract() {
        let secret = Secret {
            name: "/app/key".into(),
            value: "v".into(),
            kind: "SecureString".into(),
            version: 3,
            tags: BTreeMap::from([("owner".to_string(), "x".to_string())]),
        };
        let parsed: serde_json::Value = serde_json::from_str(&secret_json(&secret).unwrap()).unwrap();

        assert_eq!(parsed["name"], "/app/key");
        assert_eq!(parsed["value"], "v");
        assert_eq!(parsed["type"], "SecureString");
        assert_eq!(parsed["version"], 3);
        assert_eq!(parsed["tags"]["owner"], "x");
    }

    #[test]
    fn list_json_keeps_order_and_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let secrets = vec![meta("/b", Some(0), now), meta("/a", None, now)];
        let parsed: serde_json::Value = serde_json::from_str(&list_json(&secrets).unwrap()).unwrap();

        assert_eq!(parsed[0]["name"], "/b");
        assert_eq!(parsed[0]["last_modified"], "2024-06-01T12:00:00Z");
        assert_eq!(parsed[1]["name"], "/a");
        assert!(parsed[1].get("last_modified").is_none());
    }
}
