use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;
use crate::value::{MediaForm, Value};

pub const SYNTHETIC_DEFAULT_LANGUAGE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Question,
    Group,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentKind {
    Label,
    Hint,
    Media(MediaForm),
}

impl ContentKind {
    pub fn node_suffix(self) -> &'static str {
        match self {
            Self::Label | Self::Media(_) => "label",
            Self::Hint => "hint",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LanguageRef {
    Implicit,
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    #[serde(default)]
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyElement {
    pub path: String,
    pub kind: ElementKind,
    #[serde(default)]
    pub list_name: Option<String>,
    #[serde(default)]
    pub choice_filter: String,
    #[serde(default)]
    pub cells: BTreeMap<String, String>,
}

impl SurveyElement {
    pub fn new(path: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            path: path.into(),
            kind,
            list_name: None,
            choice_filter: String::new(),
            cells: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    pub fn selecting(mut self, list_name: impl Into<String>, choice_filter: impl Into<String>) -> Self {
        self.list_name = Some(list_name.into());
        self.choice_filter = choice_filter.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    #[serde(default)]
    pub cells: BTreeMap<String, String>,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListClass {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceList {
    pub name: String,
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub class: Option<ListClass>,
}

impl ChoiceList {
    pub fn new(name: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Self {
            name: name.into(),
            options,
            class: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReference {
    pub question_path: String,
    pub choice_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedList {
    pub name: String,
    pub options: Vec<ChoiceOption>,
    pub references: Vec<ListReference>,
    pub class: ListClass,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormBundle {
    #[serde(default)]
    pub settings: FormSettings,
    #[serde(default)]
    pub survey_columns: Vec<String>,
    #[serde(default)]
    pub choice_columns: Vec<String>,
    #[serde(default)]
    pub elements: Vec<SurveyElement>,
    #[serde(default)]
    pub choice_lists: Vec<ChoiceList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    #[serde(default)]
    pub default_language: Option<String>,
    #[serde(default)]
    pub inline_untranslated_dynamic_lists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageValues {
    pub language: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItextNode {
    pub id: String,
    pub languages: Vec<LanguageValues>,
}

impl ItextNode {
    pub fn values_for(&self, language: &str) -> Option<&[Value]> {
        self.languages
            .iter()
            .find(|entry| entry.language == language)
            .map(|entry| entry.values.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub id: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub language: Language,
    pub entries: Vec<TextEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTable {
    pub translations: Vec<Translation>,
}

impl TranslationTable {
    pub fn languages(&self) -> impl Iterator<Item = &Language> {
        self.translations.iter().map(|translation| &translation.language)
    }

    pub fn default_language(&self) -> Option<&Language> {
        self.languages().find(|language| language.is_default)
    }

    pub fn translation(&self, language: &str) -> Option<&Translation> {
        self.translations
            .iter()
            .find(|translation| translation.language.name == language)
    }

    pub fn entry(&self, language: &str, id: &str) -> Option<&TextEntry> {
        self.translation(language)?
            .entries
            .iter()
            .find(|entry| entry.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.translations
            .iter()
            .any(|translation| translation.entries.iter().any(|entry| entry.id == id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineChoiceLabel {
    pub list: String,
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOutput {
    pub table: TranslationTable,
    pub diagnostics: Vec<Diagnostic>,
    pub inline_choice_labels: Vec<InlineChoiceLabel>,
}
