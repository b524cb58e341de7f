use xf_core::{ContentKind, Language, LanguageRef, SYNTHETIC_DEFAULT_LANGUAGE};

use crate::columns::parse_column;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    languages: Vec<Language>,
    implicit_name: String,
    default_inferred: bool,
}

impl LanguageTable {
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn default_language(&self) -> &Language {
        self.languages
            .iter()
            .find(|language| language.is_default)
            .unwrap_or(&self.languages[0])
    }

    pub fn default_inferred(&self) -> bool {
        self.default_inferred
    }

    pub fn resolve<'a>(&'a self, language: &'a LanguageRef) -> &'a str {
        match language {
            LanguageRef::Implicit => &self.implicit_name,
            LanguageRef::Named(name) => name,
        }
    }
}

#[derive(Debug, Default)]
struct LanguageScan {
    seen: Vec<String>,
    first_label_language: Option<String>,
}

impl LanguageScan {
    fn observe(mut self, name: &str, content: ContentKind) -> Self {
        if !self.seen.iter().any(|seen| seen == name) {
            self.seen.push(name.to_string());
        }
        if content == ContentKind::Label && self.first_label_language.is_none() {
            self.first_label_language = Some(name.to_string());
        }
        self
    }
}

pub fn build_language_table<'a, I>(columns: I, configured_default: Option<&str>) -> LanguageTable
where
    I: IntoIterator<Item = &'a str>,
{
    let implicit_name = configured_default
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(SYNTHETIC_DEFAULT_LANGUAGE)
        .to_string();

    let scan = columns
        .into_iter()
        .filter_map(parse_column)
        .fold(LanguageScan::default(), |scan, key| {
            let name = match &key.language {
                LanguageRef::Implicit => implicit_name.as_str(),
                LanguageRef::Named(name) => name.as_str(),
            };
            scan.observe(name, key.content)
        });

    let LanguageScan {
        mut seen,
        first_label_language,
    } = scan;

    // a declared implicit language always wins
    let (default_name, default_inferred) = if seen.contains(&implicit_name) {
        (implicit_name.clone(), false)
    } else if let Some(first_label) = first_label_language {
        (first_label, seen.len() > 1)
    } else if let Some(first) = seen.first() {
        (first.clone(), seen.len() > 1)
    } else {
        seen.push(implicit_name.clone());
        (implicit_name.clone(), false)
    };

    let languages = seen
        .into_iter()
        .map(|name| Language {
            is_default: name == default_name,
            name,
        })
        .collect();

    LanguageTable {
        languages,
        implicit_name,
        default_inferred,
    }
}
