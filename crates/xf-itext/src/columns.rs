use std::sync::OnceLock;

use regex::Regex;
use xf_core::{ContentKind, LanguageRef, MediaForm};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColumnKey {
    pub content: ContentKind,
    pub language: LanguageRef,
}

fn column_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)^\s*(label|hint|media::[a-z-]+|image|audio|video)\s*(?:::(.*))?$")
            .expect("column regex must compile")
    })
}

pub fn parse_column(header: &str) -> Option<ColumnKey> {
    let caps = column_regex().captures(header)?;
    let head = caps.get(1)?.as_str().to_ascii_lowercase();

    let content = match head.as_str() {
        "label" => ContentKind::Label,
        "hint" => ContentKind::Hint,
        other => {
            let form = other.strip_prefix("media::").unwrap_or(other);
            ContentKind::Media(MediaForm::parse(form)?)
        }
    };

    let language = match caps.get(2).map(|m| m.as_str().trim()) {
        Some(name) if !name.is_empty() => LanguageRef::Named(name.to_string()),
        _ => LanguageRef::Implicit,
    };

    Some(ColumnKey { content, language })
}
