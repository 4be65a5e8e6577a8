//! Display helpers shared by the view builder and the HTML pages.

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w600_and_h900_bestv2";
pub const PLACEHOLDER_IMAGE: &str = "/assets/no-image.svg";

/// Labels used when a release date is unknown.
///
/// Search rows and detail pages historically disagreed on this, so both are
/// carried explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearLabels {
    pub search: String,
    pub detail: String,
}

impl Default for YearLabels {
    fn default() -> Self {
        Self {
            search: "unknown".to_string(),
            detail: String::new(),
        }
    }
}

pub fn resolve_image_path(path: Option<&str>) -> String {
    match non_empty(path) {
        Some(p) => format!("{IMAGE_BASE}{p}"),
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

pub fn resolve_year(release_date: Option<&str>, empty_label: &str) -> String {
    match non_empty(release_date) {
        Some(date) => date.split('-').next().unwrap_or(date).to_string(),
        None => empty_label.to_string(),
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// "2h 16m", "45m"; empty for unknown or zero runtimes.
pub fn format_runtime(minutes: Option<i64>) -> String {
    match minutes {
        Some(m) if m > 0 => {
            let (h, m) = (m / 60, m % 60);
            if h == 0 {
                format!("{m}m")
            } else {
                format!("{h}h {m}m")
            }
        }
        _ => String::new(),
    }
}

/// "$463,517,383"; TMDB reports 0 when revenue is unknown.
pub fn format_revenue(revenue: i64) -> String {
    if revenue <= 0 {
        return String::new();
    }
    let digits = revenue.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
