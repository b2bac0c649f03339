use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::helpers::parse_timestamp;
use crate::models::api::{Event, LogEntry};

// --- Highlighting ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub hit: bool,
}

/// Text split around search hits. Displays as escaped HTML with every hit
/// wrapped in `<mark class="search-highlight">`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighted {
    pub segments: Vec<Segment>,
}

impl Highlighted {
    pub fn plain(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self {
            segments: vec![Segment {
                text: text.to_string(),
                hit: false,
            }],
        }
    }
}

impl fmt::Display for Highlighted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            if seg.hit {
                write!(f, "<mark class=\"search-highlight\">{}</mark>", Escaped(&seg.text))?;
            } else {
                write!(f, "{}", Escaped(&seg.text))?;
            }
        }
        Ok(())
    }
}

struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#x27;")?,
                c => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Splits `text` around every case-insensitive occurrence of `term`. The term
/// is matched literally.
pub fn highlight(text: &str, term: &str) -> Highlighted {
    let needle: Vec<char> = term.chars().collect();
    if needle.is_empty() {
        return Highlighted::plain(text);
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i + needle.len() <= chars.len() {
        let hit = needle
            .iter()
            .enumerate()
            .all(|(j, n)| chars_eq_ignore_case(chars[i + j].1, *n));
        if !hit {
            i += 1;
            continue;
        }

        let start = chars[i].0;
        let end = chars
            .get(i + needle.len())
            .map(|(b, _)| *b)
            .unwrap_or(text.len());
        if start > plain_start {
            segments.push(Segment {
                text: text[plain_start..start].to_string(),
                hit: false,
            });
        }
        segments.push(Segment {
            text: text[start..end].to_string(),
            hit: true,
        });
        plain_start = end;
        i += needle.len();
    }

    if plain_start < text.len() {
        segments.push(Segment {
            text: text[plain_start..].to_string(),
            hit: false,
        });
    }
    Highlighted { segments }
}

// --- Time windows ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Hour,
    SixHours,
    Day,
    Week,
}

impl TimeWindow {
    /// Unknown values mean "no window".
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1h" => Some(TimeWindow::Hour),
            "6h" => Some(TimeWindow::SixHours),
            "24h" => Some(TimeWindow::Day),
            "7d" => Some(TimeWindow::Week),
            _ => None,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::Hour => Duration::hours(1),
            TimeWindow::SixHours => Duration::hours(6),
            TimeWindow::Day => Duration::hours(24),
            TimeWindow::Week => Duration::days(7),
        }
    }
}

/// Events carry only a time of day. It is taken as today at that time, or
/// yesterday when that would lie in the future.
pub fn event_time(time: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let t = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M"))
        .ok()?;
    let today = now.date().and_time(t);
    if today > now {
        Some(today - Duration::days(1))
    } else {
        Some(today)
    }
}

// --- Events ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub window: String,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub window: Option<TimeWindow>,
    pub search: String,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl EventFilter {
    pub fn from_query(q: &EventQuery) -> Self {
        Self {
            kind: non_empty(&q.kind),
            namespace: non_empty(&q.namespace),
            window: TimeWindow::parse(q.window.trim()),
            search: q.q.trim().to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_some() || self.namespace.is_some() || self.window.is_some() || !self.search.is_empty()
    }

    pub fn matches(&self, e: &Event, now: NaiveDateTime) -> bool {
        if self.kind.as_deref().is_some_and(|k| k != e.kind) {
            return false;
        }
        if self.namespace.as_deref().is_some_and(|ns| ns != e.namespace) {
            return false;
        }
        if let Some(window) = self.window {
            // unparseable times stay visible
            if let Some(t) = event_time(&e.time, now) {
                if now - t > window.duration() {
                    return false;
                }
            }
        }
        if !self.search.is_empty() {
            let haystack = format!(
                "{} {} {} {} {} {}",
                e.object, e.namespace, e.reason, e.message, e.source, e.kind
            )
            .to_lowercase();
            if !haystack.contains(&self.search.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, events: &'a [Event], now: NaiveDateTime) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches(e, now)).collect()
    }
}

/// Sorted unique namespaces plus the selection to show. A selection that is
/// no longer offered falls back to "all" (empty).
pub fn namespace_options(events: &[Event], current: &str) -> (Vec<String>, String) {
    let set: BTreeSet<&str> = events
        .iter()
        .map(|e| e.namespace.as_str())
        .filter(|ns| !ns.is_empty())
        .collect();
    let options: Vec<String> = set.into_iter().map(str::to_string).collect();
    let selected = if options.iter().any(|o| o == current) {
        current.to_string()
    } else {
        String::new()
    };
    (options, selected)
}

pub fn search_stats(term: &str, matched: usize, total: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        matched as f64 * 100.0 / total as f64
    };
    format!("\"{}\" results: {} (of {}, {:.1}%)", term, matched, total, pct)
}

// --- Logs ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilterQuery {
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub range: String,
}

#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub container: Option<String>,
    pub level: Option<String>,
    pub search: String,
    pub window: Option<TimeWindow>,
}

impl LogFilter {
    pub fn from_query(q: &LogFilterQuery) -> Self {
        Self {
            container: non_empty(&q.container),
            level: non_empty(&q.level),
            search: q.q.trim().to_lowercase(),
            window: TimeWindow::parse(q.range.trim()),
        }
    }

    pub fn matches(&self, entry: &LogEntry, now: DateTime<Utc>) -> bool {
        if self.container.as_deref().is_some_and(|c| c != entry.container()) {
            return false;
        }
        if self
            .level
            .as_deref()
            .is_some_and(|l| !l.eq_ignore_ascii_case(&entry.level))
        {
            return false;
        }
        if !self.search.is_empty() && !entry.message.to_lowercase().contains(&self.search) {
            return false;
        }
        if let (Some(window), Some(ts)) = (self.window, parse_timestamp(&entry.timestamp)) {
            if now - ts > window.duration() {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, entries: &'a [LogEntry], now: DateTime<Utc>) -> Vec<&'a LogEntry> {
        entries.iter().filter(|e| self.matches(e, now)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn ev(time: &str, kind: &str, ns: &str, object: &str, message: &str) -> Event {
        Event {
            time: time.into(),
            kind: kind.into(),
            namespace: ns.into(),
            object: object.into(),
            message: message.into(),
            reason: "Started".into(),
            source: "kubelet".into(),
            ..Default::default()
        }
    }

    #[test]
    fn highlight_marks_every_occurrence_and_escapes() {
        let h = highlight("Pod <web> restarted, POD ok", "pod");
        assert_eq!(
            h.to_string(),
            "<mark class=\"search-highlight\">Pod</mark> &lt;web&gt; restarted, \
             <mark class=\"search-highlight\">POD</mark> ok"
        );
        assert_eq!(highlight("a.b", ".").segments.len(), 3);
        assert_eq!(highlight("plain", "").to_string(), "plain");
        assert_eq!(highlight("", "x").to_string(), "");
    }

    #[test]
    fn filters_are_conjunctive() {
        let now = at(12, 0, 0);
        let events = vec![
            ev("11:50:00", "Warning", "default", "web-1", "Back-off restarting"),
            ev("11:55:00", "Normal", "default", "web-2", "Started container"),
            ev("11:58:00", "Warning", "kube-system", "dns-1", "Back-off restarting"),
        ];
        let f = EventFilter::from_query(&EventQuery {
            kind: "Warning".into(),
            namespace: "default".into(),
            ..Default::default()
        });
        let hits = f.apply(&events, now);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object, "web-1");
        assert!(f.is_active());
    }

    #[test]
    fn namespace_filter_matches_exactly() {
        let now = at(12, 0, 0);
        let events = vec![
            ev("11:00", "Normal", "kube-system", "a", ""),
            ev("11:00", "Normal", "kube", "b", ""),
        ];
        let f = EventFilter {
            namespace: Some("kube".into()),
            ..Default::default()
        };
        let hits = f.apply(&events, now);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object, "b");
    }

    #[test]
    fn window_wraps_future_times_to_yesterday() {
        let now = at(0, 30, 0);
        assert_eq!(event_time("23:50:00", now), Some(at(23, 50, 0) - Duration::days(1)));
        assert_eq!(event_time("00:10", now), Some(at(0, 10, 0)));
        assert_eq!(event_time("soon", now), None);

        let events = vec![
            ev("23:50:00", "Normal", "a", "late", ""),
            ev("00:20:00", "Normal", "a", "recent", ""),
            ev("n/a", "Normal", "a", "unparsed", ""),
        ];
        let f = EventFilter {
            window: TimeWindow::parse("1h"),
            ..Default::default()
        };
        let names: Vec<&str> = f.apply(&events, now).iter().map(|e| e.object.as_str()).collect();
        assert_eq!(names, ["late", "recent", "unparsed"]);

        let now = at(12, 0, 0);
        let names: Vec<&str> = f.apply(&events, now).iter().map(|e| e.object.as_str()).collect();
        assert_eq!(names, ["unparsed"]);
    }

    #[test]
    fn unknown_window_is_ignored() {
        assert_eq!(TimeWindow::parse("3h"), None);
        let f = EventFilter::from_query(&EventQuery {
            window: "3h".into(),
            ..Default::default()
        });
        assert!(!f.is_active());
    }

    #[test]
    fn search_covers_all_text_fields() {
        let now = at(12, 0, 0);
        let events = vec![ev("11:00", "Warning", "default", "web-1", "Back-off")];
        for term in ["WEB", "default", "started", "back-OFF", "kubelet", "warning"] {
            let f = EventFilter {
                search: term.into(),
                ..Default::default()
            };
            assert_eq!(f.apply(&events, now).len(), 1, "term {}", term);
        }
        let f = EventFilter {
            search: "nothing".into(),
            ..Default::default()
        };
        assert!(f.apply(&events, now).is_empty());
    }

    #[test]
    fn namespace_selection_resets_when_gone() {
        let events = vec![
            ev("1:00", "Normal", "prod", "a", ""),
            ev("1:00", "Normal", "default", "b", ""),
            ev("1:00", "Normal", "prod", "c", ""),
        ];
        let (opts, sel) = namespace_options(&events, "prod");
        assert_eq!(opts, ["default", "prod"]);
        assert_eq!(sel, "prod");
        let (_, sel) = namespace_options(&events, "staging");
        assert_eq!(sel, "");
    }

    #[test]
    fn search_stats_text() {
        assert_eq!(search_stats("web", 1, 3), "\"web\" results: 1 (of 3, 33.3%)");
        assert_eq!(search_stats("x", 0, 0), "\"x\" results: 0 (of 0, 0.0%)");
    }

    #[test]
    fn log_filters() {
        let now = Utc::now();
        let recent = (now - Duration::minutes(10)).to_rfc3339();
        let old = (now - Duration::hours(3)).to_rfc3339();
        let entries = vec![
            LogEntry {
                timestamp: recent.clone(),
                level: "ERROR".into(),
                message: "Disk full".into(),
                container_id: Some("db".into()),
                ..Default::default()
            },
            LogEntry {
                timestamp: old,
                level: "ERROR".into(),
                message: "disk slow".into(),
                container_id: Some("db".into()),
                ..Default::default()
            },
            LogEntry {
                timestamp: recent,
                level: "INFO".into(),
                message: "disk ok".into(),
                container_id: Some("web".into()),
                ..Default::default()
            },
        ];
        let f = LogFilter::from_query(&LogFilterQuery {
            container: "db".into(),
            level: "error".into(),
            q: "DISK".into(),
            range: "1h".into(),
        });
        let hits = f.apply(&entries, now);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message, "Disk full");
    }
}
