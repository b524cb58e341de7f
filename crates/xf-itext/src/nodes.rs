use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;
use xf_core::{
    ClassifiedList, CompileOptions, ContentKind, Diagnostic, InlineChoiceLabel, ItextError,
    ItextNode, LanguageValues, ListClass, MediaForm, SurveyElement, TextEntry, Translation,
    TranslationTable, Value,
};

use crate::classify::{referenced_list, Classification};
use crate::columns::parse_column;
use crate::languages::LanguageTable;
use crate::media::resolve_media;

const STATIC_INSTANCE_PREFIX: &str = "static_instance";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledNodes {
    pub nodes: Vec<ItextNode>,
    pub diagnostics: Vec<Diagnostic>,
    pub inline_choice_labels: Vec<InlineChoiceLabel>,
}

#[derive(Debug, Default)]
struct Slot {
    text: Option<String>,
    media: BTreeMap<MediaForm, Value>,
}

impl Slot {
    fn is_empty(&self) -> bool {
        self.text.is_none() && self.media.is_empty()
    }

    fn into_values(self) -> Vec<Value> {
        self.text
            .map(Value::text)
            .into_iter()
            .chain(self.media.into_values())
            .collect()
    }
}

#[derive(Debug, Default)]
struct CellContent {
    label: HashMap<String, Slot>,
    hint: HashMap<String, Slot>,
}

impl CellContent {
    fn collect(cells: &BTreeMap<String, String>, languages: &LanguageTable) -> Self {
        let mut content = Self::default();
        for (column, raw) in cells {
            let Some(key) = parse_column(column) else {
                continue;
            };
            let language = languages.resolve(&key.language).to_string();
            match key.content {
                ContentKind::Label | ContentKind::Hint => {
                    if raw.trim().is_empty() {
                        continue;
                    }
                    let slots = if key.content == ContentKind::Label {
                        &mut content.label
                    } else {
                        &mut content.hint
                    };
                    let slot = slots.entry(language).or_default();
                    if slot.text.is_none() {
                        slot.text = Some(raw.clone());
                    }
                }
                ContentKind::Media(form) => {
                    let Some(value) = resolve_media(raw, form) else {
                        continue;
                    };
                    content
                        .label
                        .entry(language)
                        .or_default()
                        .media
                        .entry(form)
                        .or_insert(value);
                }
            }
        }
        content
    }

    fn is_untranslated(&self, languages: &LanguageTable) -> bool {
        let default_name = &languages.default_language().name;
        self.hint.values().all(Slot::is_empty)
            && self.label.iter().all(|(language, slot)| {
                slot.is_empty() || (language == default_name && slot.media.is_empty())
            })
    }

    fn default_label(&self, languages: &LanguageTable) -> Option<&str> {
        self.label
            .get(&languages.default_language().name)
            .and_then(|slot| slot.text.as_deref())
    }
}

fn ordered_values(
    mut slots: HashMap<String, Slot>,
    languages: &LanguageTable,
) -> Vec<LanguageValues> {
    languages
        .languages()
        .iter()
        .filter_map(|language| {
            let slot = slots.remove(&language.name)?;
            if slot.is_empty() {
                return None;
            }
            Some(LanguageValues {
                language: language.name.clone(),
                values: slot.into_values(),
            })
        })
        .collect()
}

#[derive(Debug, Default)]
struct NodeSink {
    nodes: Vec<ItextNode>,
    owners: HashMap<String, String>,
}

impl NodeSink {
    fn emit(
        &mut self,
        id: String,
        owner: String,
        languages: Vec<LanguageValues>,
    ) -> Result<(), ItextError> {
        if languages.is_empty() {
            return Ok(());
        }
        if let Some(previous) = self.owners.get(&id) {
            return Err(ItextError::with_subject(
                "ITEXT_ID_COLLISION",
                format!(
                    "Itext id \"{}\" is produced by both {} and {}.",
                    id, previous, owner
                ),
                id,
            ));
        }
        self.owners.insert(id.clone(), owner);
        self.nodes.push(ItextNode { id, languages });
        Ok(())
    }

    fn emit_content(
        &mut self,
        id_base: &str,
        owner: &str,
        content: CellContent,
        languages: &LanguageTable,
    ) -> Result<(), ItextError> {
        let CellContent { label, hint } = content;
        self.emit(
            format!("{}:{}", id_base, ContentKind::Label.node_suffix()),
            owner.to_string(),
            ordered_values(label, languages),
        )?;
        self.emit(
            format!("{}:{}", id_base, ContentKind::Hint.node_suffix()),
            owner.to_string(),
            ordered_values(hint, languages),
        )
    }
}

fn compile_dynamic_list(
    list: &ClassifiedList,
    languages: &LanguageTable,
    options: &CompileOptions,
    sink: &mut NodeSink,
    inline_labels: &mut Vec<InlineChoiceLabel>,
) -> Result<(), ItextError> {
    let contents = list
        .options
        .iter()
        .map(|option| CellContent::collect(&option.cells, languages))
        .collect::<Vec<_>>();

    if options.inline_untranslated_dynamic_lists
        && contents
            .iter()
            .all(|content| content.is_untranslated(languages))
    {
        debug!(list = %list.name, "inlining untranslated filtered list labels");
        for (option, content) in list.options.iter().zip(&contents) {
            if let Some(label) = content.default_label(languages) {
                inline_labels.push(InlineChoiceLabel {
                    list: list.name.clone(),
                    value: option.value.clone(),
                    label: label.to_string(),
                });
            }
        }
        return Ok(());
    }

    for (option, content) in list.options.iter().zip(contents) {
        sink.emit(
            format!("{}-{}-{}", STATIC_INSTANCE_PREFIX, list.name, option.value),
            format!("option \"{}\" of list \"{}\"", option.value, list.name),
            ordered_values(content.label, languages),
        )?;
    }
    Ok(())
}

fn compile_static_family(
    question_path: &str,
    list: &ClassifiedList,
    languages: &LanguageTable,
    sink: &mut NodeSink,
) -> Result<(), ItextError> {
    for option in &list.options {
        let content = CellContent::collect(&option.cells, languages);
        sink.emit(
            format!("{}/{}:label", question_path, option.value),
            format!(
                "option \"{}\" of list \"{}\" under question \"{}\"",
                option.value, list.name, question_path
            ),
            ordered_values(content.label, languages),
        )?;
    }
    Ok(())
}

fn option_hint_diagnostics(lists: &[ClassifiedList]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for list in lists {
        for option in &list.options {
            let has_hint = option.cells.iter().any(|(column, value)| {
                !value.trim().is_empty()
                    && parse_column(column).is_some_and(|key| key.content == ContentKind::Hint)
            });
            if has_hint {
                diagnostics.push(Diagnostic::new(
                    "OPTION_HINT_IGNORED",
                    format!(
                        "Hint on option \"{}\" of list \"{}\" has no itext id and is skipped.",
                        option.value, list.name
                    ),
                    list.name.clone(),
                ));
            }
        }
    }
    diagnostics
}

pub fn compile_nodes(
    elements: &[SurveyElement],
    classification: &Classification,
    languages: &LanguageTable,
    options: &CompileOptions,
) -> Result<CompiledNodes, ItextError> {
    let mut sink = NodeSink::default();
    let mut inline_choice_labels = Vec::new();
    let mut emitted_dynamic = BTreeSet::new();

    for element in elements {
        let content = CellContent::collect(&element.cells, languages);
        sink.emit_content(
            &element.path,
            &format!("element \"{}\"", element.path),
            content,
            languages,
        )?;

        let Some(list_name) = referenced_list(element) else {
            continue;
        };
        let Some(list) = classification.get(list_name) else {
            return Err(ItextError::with_subject(
                "LIST_NOT_FOUND",
                format!(
                    "Question \"{}\" selects from unclassified choice list \"{}\".",
                    element.path, list_name
                ),
                element.path.clone(),
            ));
        };

        match list.class {
            ListClass::Static => {
                compile_static_family(&element.path, list, languages, &mut sink)?;
            }
            ListClass::Dynamic => {
                if emitted_dynamic.insert(list.name.as_str()) {
                    compile_dynamic_list(
                        list,
                        languages,
                        options,
                        &mut sink,
                        &mut inline_choice_labels,
                    )?;
                }
            }
        }
    }

    debug!(nodes = sink.nodes.len(), "compiled itext nodes");
    Ok(CompiledNodes {
        nodes: sink.nodes,
        diagnostics: option_hint_diagnostics(&classification.lists),
        inline_choice_labels,
    })
}

pub fn build_translation_table(nodes: &[ItextNode], languages: &LanguageTable) -> TranslationTable {
    let translations = languages
        .languages()
        .iter()
        .map(|language| Translation {
            language: language.clone(),
            entries: nodes
                .iter()
                .filter_map(|node| {
                    node.values_for(&language.name).map(|values| TextEntry {
                        id: node.id.clone(),
                        values: values.to_vec(),
                    })
                })
                .collect(),
        })
        .collect();

    TranslationTable { translations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_lists;
    use crate::languages::build_language_table;
    use xf_core::{ChoiceList, ChoiceOption, ElementKind};

    fn compile(
        columns: &[&str],
        elements: &[SurveyElement],
        lists: &[ChoiceList],
    ) -> Result<CompiledNodes, ItextError> {
        let languages = build_language_table(columns.iter().copied(), None);
        let classification = classify_lists(elements, lists)?;
        compile_nodes(elements, &classification, &languages, &CompileOptions::default())
    }

    fn ids(compiled: &CompiledNodes) -> Vec<&str> {
        compiled.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    #[test]
    fn label_values_follow_language_table_order_with_media_after_text() {
        let element = SurveyElement::new("/f/q", ElementKind::Question)
            .with_cell("media::video::en", "v.mp4")
            .with_cell("media::image::en", "i.png")
            .with_cell("label::fr", "Bonjour")
            .with_cell("label::en", "Hello")
            .with_cell("media::audio::en", "a.mp3");
        let compiled = compile(
            &["label::en", "label::fr", "media::image::en"],
            &[element],
            &[],
        )
        .expect("compile");

        assert_eq!(ids(&compiled), vec!["/f/q:label"]);
        let node = &compiled.nodes[0];
        let languages = node
            .languages
            .iter()
            .map(|entry| entry.language.as_str())
            .collect::<Vec<_>>();
        assert_eq!(languages, vec!["en", "fr"]);
        assert_eq!(
            node.values_for("en"),
            Some(
                &[
                    Value::text("Hello"),
                    Value::media(MediaForm::Image, "jr://images/i.png"),
                    Value::media(MediaForm::Audio, "jr://audio/a.mp3"),
                    Value::media(MediaForm::Video, "jr://video/v.mp4"),
                ][..]
            )
        );
        assert_eq!(node.values_for("fr"), Some(&[Value::text("Bonjour")][..]));
    }

    #[test]
    fn hint_gets_its_own_node_and_blank_cells_emit_nothing() {
        let elements = vec![
            SurveyElement::new("/f/g", ElementKind::Group)
                .with_cell("label", "Group")
                .with_cell("hint", "Fill all"),
            SurveyElement::new("/f/empty", ElementKind::Question)
                .with_cell("label", "  ")
                .with_cell("media::audio", "-"),
        ];
        let compiled = compile(&["label", "hint"], &elements, &[]).expect("compile");
        assert_eq!(ids(&compiled), vec!["/f/g:label", "/f/g:hint"]);
    }

    #[test]
    fn media_without_text_still_builds_label_entry() {
        let element = SurveyElement::new("/f/q", ElementKind::Question)
            .with_cell("label::en", "Listen")
            .with_cell("media::audio::fr", "ecoute.mp3");
        let compiled = compile(&["label::en", "media::audio::fr"], &[element], &[])
            .expect("compile");
        assert_eq!(
            compiled.nodes[0].values_for("fr"),
            Some(&[Value::media(MediaForm::Audio, "jr://audio/ecoute.mp3")][..])
        );
    }

    #[test]
    fn static_list_gets_one_family_per_question() {
        let elements = vec![
            SurveyElement::new("/f/a", ElementKind::Question).selecting("yn", ""),
            SurveyElement::new("/f/b", ElementKind::Question).selecting("yn", ""),
        ];
        let lists = vec![ChoiceList::new(
            "yn",
            vec![
                ChoiceOption::new("yes").with_cell("label", "Yes"),
                ChoiceOption::new("no").with_cell("label", "No"),
            ],
        )];
        let compiled = compile(&["label"], &elements, &lists).expect("compile");
        assert_eq!(
            ids(&compiled),
            vec!["/f/a/yes:label", "/f/a/no:label", "/f/b/yes:label", "/f/b/no:label"]
        );
    }

    #[test]
    fn dynamic_list_gets_one_shared_family() {
        let elements = vec![
            SurveyElement::new("/f/a", ElementKind::Question)
                .with_cell("label", "A")
                .selecting("yn", ""),
            SurveyElement::new("/f/b", ElementKind::Question)
                .with_cell("label", "B")
                .selecting("yn", "${a} = 'yes'"),
        ];
        let lists = vec![ChoiceList::new(
            "yn",
            vec![
                ChoiceOption::new("yes").with_cell("label", "Yes"),
                ChoiceOption::new("no").with_cell("label", "No"),
            ],
        )];
        let compiled = compile(&["label"], &elements, &lists).expect("compile");
        assert_eq!(
            ids(&compiled),
            vec![
                "/f/a:label",
                "static_instance-yn-yes",
                "static_instance-yn-no",
                "/f/b:label",
            ]
        );
    }

    #[test]
    fn duplicate_option_value_is_an_id_collision() {
        let elements =
            vec![SurveyElement::new("/f/a", ElementKind::Question).selecting("l", "x != ''")];
        let lists = vec![ChoiceList::new(
            "l",
            vec![
                ChoiceOption::new("v").with_cell("label", "One"),
                ChoiceOption::new("v").with_cell("label", "Two"),
            ],
        )];
        let error = compile(&["label"], &elements, &lists).expect_err("collision should fail");
        assert_eq!(error.code, "ITEXT_ID_COLLISION");
        assert_eq!(error.subject.as_deref(), Some("static_instance-l-v"));
    }

    #[test]
    fn element_and_option_mapping_to_same_id_collide() {
        let elements = vec![
            SurveyElement::new("/f/a", ElementKind::Question).selecting("l", ""),
            SurveyElement::new("/f/a/v", ElementKind::Question).with_cell("label", "Clash"),
        ];
        let lists = vec![ChoiceList::new(
            "l",
            vec![ChoiceOption::new("v").with_cell("label", "V")],
        )];
        let error = compile(&["label"], &elements, &lists).expect_err("collision should fail");
        assert_eq!(error.code, "ITEXT_ID_COLLISION");
        assert!(error.message.contains("element \"/f/a/v\""));
    }

    #[test]
    fn option_hints_are_reported_not_emitted() {
        let elements = vec![SurveyElement::new("/f/a", ElementKind::Question).selecting("l", "")];
        let lists = vec![ChoiceList::new(
            "l",
            vec![ChoiceOption::new("v")
                .with_cell("label", "V")
                .with_cell("hint", "extra")],
        )];
        let compiled = compile(&["label", "hint"], &elements, &lists).expect("compile");
        assert_eq!(ids(&compiled), vec!["/f/a/v:label"]);
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].code, "OPTION_HINT_IGNORED");
    }

    #[test]
    fn inline_mode_skips_untranslated_dynamic_lists_only() {
        let elements = vec![
            SurveyElement::new("/f/a", ElementKind::Question).selecting("plain", "a != ''"),
            SurveyElement::new("/f/b", ElementKind::Question).selecting("pics", "a != ''"),
        ];
        let lists = vec![
            ChoiceList::new(
                "plain",
                vec![
                    ChoiceOption::new("a").with_cell("label", "a"),
                    ChoiceOption::new("b").with_cell("label", "b"),
                ],
            ),
            ChoiceList::new(
                "pics",
                vec![ChoiceOption::new("h")
                    .with_cell("label", "Happy")
                    .with_cell("media::image", "happy.jpg")],
            ),
        ];
        let languages = build_language_table(["label", "media::image"], None);
        let classification = classify_lists(&elements, &lists).expect("classify");
        let options = CompileOptions {
            inline_untranslated_dynamic_lists: true,
            ..CompileOptions::default()
        };
        let compiled =
            compile_nodes(&elements, &classification, &languages, &options).expect("compile");

        assert_eq!(ids(&compiled), vec!["static_instance-pics-h"]);
        assert_eq!(
            compiled.inline_choice_labels,
            vec![
                InlineChoiceLabel {
                    list: "plain".to_string(),
                    value: "a".to_string(),
                    label: "a".to_string(),
                },
                InlineChoiceLabel {
                    list: "plain".to_string(),
                    value: "b".to_string(),
                    label: "b".to_string(),
                },
            ]
        );
    }

    #[test]
    fn translation_table_keeps_empty_blocks_and_skips_absent_languages() {
        let element = SurveyElement::new("/f/q", ElementKind::Question).with_cell("label::en", "Hi");
        let languages = build_language_table(["label::en", "hint::fr"], None);
        let classification = classify_lists(&[], &[]).expect("classify");
        let compiled = compile_nodes(
            std::slice::from_ref(&element),
            &classification,
            &languages,
            &CompileOptions::default(),
        )
        .expect("compile");
        let table = build_translation_table(&compiled.nodes, &languages);

        assert_eq!(table.translations.len(), 2);
        assert_eq!(table.translations[0].entries.len(), 1);
        assert!(table.translations[1].entries.is_empty());
        assert!(table.entry("fr", "/f/q:label").is_none());
    }
}
