use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Bar color for a 0-100 usage percentage.
pub fn usage_color(pct: f64) -> &'static str {
    if pct < 30.0 {
        "#059669"
    } else if pct < 70.0 {
        "#d97706"
    } else {
        "#dc2626"
    }
}

/// Same thresholds as [`usage_color`], as rgba for chart fills and borders.
pub fn usage_rgba(pct: f64, alpha: f64) -> String {
    let (r, g, b) = if pct < 30.0 {
        (5, 150, 105)
    } else if pct < 70.0 {
        (217, 119, 6)
    } else {
        (220, 38, 38)
    };
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

/// Network rate as shown in the containers table.
pub fn rate_short(bytes_per_sec: f64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    if bytes_per_sec >= MIB {
        format!("{:.1} MB/s", bytes_per_sec / MIB)
    } else if bytes_per_sec >= KIB {
        format!("{:.1} KB/s", bytes_per_sec / KIB)
    } else {
        format!("{} B/s", bytes_per_sec.max(0.0).round() as u64)
    }
}

/// Network rate as shown on the monitoring page: 1024-based units, two
/// decimals with trailing zeros trimmed.
pub fn rate_scaled(bytes_per_sec: f64) -> String {
    if bytes_per_sec <= 0.0 {
        return "0 B/s".to_string();
    }
    let units = ["B/s", "KB/s", "MB/s", "GB/s"];
    let mut exp = 0;
    let mut scaled = bytes_per_sec;
    while scaled >= 1024.0 && exp < units.len() - 1 {
        scaled /= 1024.0;
        exp += 1;
    }
    let mut num = format!("{:.2}", scaled);
    if num.contains('.') {
        num = num.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", num, units[exp])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub class: &'static str,
    pub icon: &'static str,
}

/// Arrow and class for a change value like "+12%" or "-3".
pub fn metric_change(value: &str) -> Change {
    let v = value.trim();
    let numeric: Option<f64> = v
        .trim_end_matches('%')
        .trim_start_matches('+')
        .trim()
        .parse()
        .ok();
    if v.starts_with('+') || numeric.is_some_and(|n| n > 0.0) {
        Change {
            class: "metric-change positive",
            icon: "fas fa-arrow-up",
        }
    } else if v.starts_with('-') || numeric.is_some_and(|n| n < 0.0) {
        Change {
            class: "metric-change negative",
            icon: "fas fa-arrow-down",
        }
    } else {
        Change {
            class: "metric-change neutral",
            icon: "fas fa-minus",
        }
    }
}

/// Short relative time for event rows.
pub fn time_ago(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let mins = (now - then).num_minutes();
    if mins < 1 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{} min ago", mins)
    } else if mins < 24 * 60 {
        format!("{} h ago", mins / 60)
    } else {
        format!("{} d ago", mins / (24 * 60))
    }
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.to_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(ts, f).ok())
        .map(|n| n.and_utc())
}

/// Backend timestamp rendered in the console's local time. Unparseable input
/// is shown as is.
pub fn local_datetime(ts: &str) -> String {
    match parse_timestamp(ts) {
        Some(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => ts.to_string(),
    }
}

pub fn human_time(ts: Option<&str>) -> String {
    let t = match ts.filter(|s| !s.is_empty()).and_then(parse_timestamp) {
        Some(t) => t,
        None => return "never".to_string(),
    };

    let d = Utc::now() - t;
    let secs = d.num_seconds();

    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        let m = d.num_minutes();
        if m == 1 {
            "1 minute ago".to_string()
        } else {
            format!("{} minutes ago", m)
        }
    } else if secs < 86400 {
        let h = d.num_hours();
        if h == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", h)
        }
    } else if secs < 30 * 86400 {
        let days = d.num_days();
        if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else {
        t.format("%b %e, %Y").to_string()
    }
}

/// Compact number formatting for card values: integers lose the ".0".
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn usage_thresholds() {
        assert_eq!(usage_color(0.0), "#059669");
        assert_eq!(usage_color(29.9), "#059669");
        assert_eq!(usage_color(30.0), "#d97706");
        assert_eq!(usage_color(69.9), "#d97706");
        assert_eq!(usage_color(70.0), "#dc2626");
        assert_eq!(usage_rgba(85.0, 0.8), "rgba(220, 38, 38, 0.8)");
    }

    #[test]
    fn short_rates() {
        assert_eq!(rate_short(0.0), "0 B/s");
        assert_eq!(rate_short(512.0), "512 B/s");
        assert_eq!(rate_short(2048.0), "2.0 KB/s");
        assert_eq!(rate_short(1_572_864.0), "1.5 MB/s");
    }

    #[test]
    fn scaled_rates_trim_zeros() {
        assert_eq!(rate_scaled(0.0), "0 B/s");
        assert_eq!(rate_scaled(1024.0), "1 KB/s");
        assert_eq!(rate_scaled(1536.0), "1.5 KB/s");
        assert_eq!(rate_scaled(1_258_291.2), "1.2 MB/s");
        assert_eq!(rate_scaled(500.0), "500 B/s");
    }

    #[test]
    fn change_direction() {
        assert_eq!(metric_change("+12%").icon, "fas fa-arrow-up");
        assert_eq!(metric_change("3").class, "metric-change positive");
        assert_eq!(metric_change("-2").class, "metric-change negative");
        assert_eq!(metric_change("0%").icon, "fas fa-minus");
        assert_eq!(metric_change("").class, "metric-change neutral");
    }

    #[test]
    fn relative_times() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - chrono::Duration::minutes(5), now), "5 min ago");
        assert_eq!(time_ago(now - chrono::Duration::hours(3), now), "3 h ago");
        assert_eq!(time_ago(now - chrono::Duration::days(2), now), "2 d ago");
    }

    #[test]
    fn timestamps_parse_with_or_without_zone() {
        assert!(parse_timestamp("2024-05-02T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-02T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-02 10:00:00").is_some());
        assert_eq!(local_datetime("yesterday"), "yesterday");
        assert_eq!(human_time(None), "never");
    }

    #[test]
    fn numbers_drop_integer_fraction() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(45.26), "45.3");
    }
}
