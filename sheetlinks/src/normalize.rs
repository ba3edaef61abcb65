//! Hyperlink target normalization

use regex::Regex;
use std::sync::OnceLock;

/// What normalization does with one hyperlink target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Replace the target with this bare filename
    Rewrite(String),
    /// No directory components to drop
    AlreadyBare,
    /// Web URL left as is
    KeptUrl,
    /// Target ends with a separator, there is no filename to keep
    NoFilename,
}

/// Final path component of `target`, `/` and `\` both being separators
pub fn bare_filename(target: &str) -> &str {
    match target.rfind(['/', '\\']) {
        Some(i) => &target[i + 1..],
        None => target,
    }
}

/// True for targets with a URI scheme other than `file:`.
///
/// One-letter schemes are drive letters (`C:\docs\a.xlsx`) and count as paths.
pub fn is_web_url(target: &str) -> bool {
    static SCHEME_PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = SCHEME_PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]+):").unwrap());

    re.captures(target.trim_start())
        .is_some_and(|caps| !caps[1].eq_ignore_ascii_case("file"))
}

pub fn classify_target(target: &str, rewrite_urls: bool) -> TargetOutcome {
    if !rewrite_urls && is_web_url(target) {
        return TargetOutcome::KeptUrl;
    }

    let filename = bare_filename(target);
    if filename.is_empty() {
        TargetOutcome::NoFilename
    } else if filename == target {
        TargetOutcome::AlreadyBare
    } else {
        TargetOutcome::Rewrite(filename.to_string())
    }
}

/// New target for `target`, or `None` when it stays as it is
pub fn normalize_target(target: &str, rewrite_urls: bool) -> Option<String> {
    match classify_target(target, rewrite_urls) {
        TargetOutcome::Rewrite(filename) => Some(filename),
        _ => None,
    }
}
