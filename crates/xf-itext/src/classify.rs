use std::collections::BTreeMap;

use tracing::debug;
use xf_core::{
    ChoiceList, ChoiceOption, ClassifiedList, ContentKind, Diagnostic, ItextError, ListClass,
    ListReference, SurveyElement,
};

use crate::columns::parse_column;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub lists: Vec<ClassifiedList>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Classification {
    pub fn get(&self, name: &str) -> Option<&ClassifiedList> {
        self.lists.iter().find(|list| list.name == name)
    }
}

pub(crate) fn referenced_list(element: &SurveyElement) -> Option<&str> {
    element
        .list_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn has_label(option: &ChoiceOption) -> bool {
    option.cells.iter().any(|(column, value)| {
        !value.trim().is_empty()
            && parse_column(column).is_some_and(|key| key.content == ContentKind::Label)
    })
}

pub fn classify_lists(
    elements: &[SurveyElement],
    lists: &[ChoiceList],
) -> Result<Classification, ItextError> {
    let mut references: BTreeMap<&str, Vec<ListReference>> = BTreeMap::new();
    for list in lists {
        if references.insert(list.name.as_str(), Vec::new()).is_some() {
            return Err(ItextError::with_subject(
                "LIST_DUPLICATE",
                format!("Choice list \"{}\" is defined more than once.", list.name),
                list.name.clone(),
            ));
        }
    }

    for element in elements {
        let Some(list_name) = referenced_list(element) else {
            continue;
        };
        let Some(entries) = references.get_mut(list_name) else {
            return Err(ItextError::with_subject(
                "LIST_NOT_FOUND",
                format!(
                    "Question \"{}\" selects from undefined choice list \"{}\".",
                    element.path, list_name
                ),
                element.path.clone(),
            ));
        };
        entries.push(ListReference {
            question_path: element.path.clone(),
            choice_filter: element.choice_filter.clone(),
        });
    }

    let mut classified = Vec::with_capacity(lists.len());
    let mut diagnostics = Vec::new();

    for list in lists {
        let list_references = references.remove(list.name.as_str()).unwrap_or_default();
        let class = if list_references
            .iter()
            .any(|reference| !reference.choice_filter.trim().is_empty())
        {
            ListClass::Dynamic
        } else {
            ListClass::Static
        };

        if let Some(previous) = list.class {
            if previous != class {
                return Err(ItextError::with_subject(
                    "LIST_CLASS_CONFLICT",
                    format!(
                        "Choice list \"{}\" is tagged {:?} but its questions make it {:?}.",
                        list.name, previous, class
                    ),
                    list.name.clone(),
                ));
            }
        }

        if list_references.is_empty() {
            diagnostics.push(Diagnostic::new(
                "ORPHAN_LIST",
                format!(
                    "Choice list \"{}\" is not used by any question; treated as static.",
                    list.name
                ),
                list.name.clone(),
            ));
        }

        if class == ListClass::Dynamic {
            for option in list.options.iter().filter(|option| !has_label(option)) {
                diagnostics.push(Diagnostic::new(
                    "DYNAMIC_OPTION_UNLABELED",
                    format!(
                        "Option \"{}\" of filtered list \"{}\" has no label in any language.",
                        option.value, list.name
                    ),
                    list.name.clone(),
                ));
            }
        }

        debug!(list = %list.name, ?class, references = list_references.len(), "classified choice list");
        classified.push(ClassifiedList {
            name: list.name.clone(),
            options: list.options.clone(),
            references: list_references,
            class,
        });
    }

    Ok(Classification {
        lists: classified,
        diagnostics,
    })
}
