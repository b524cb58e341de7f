use std::collections::HashSet;

use tracing::{debug, warn};
use xf_core::{CompileOptions, CompileOutput, Diagnostic, FormBundle, ItextError};

use crate::classify::classify_lists;
use crate::languages::build_language_table;
use crate::nodes::{build_translation_table, compile_nodes};

pub fn collect_column_names(bundle: &FormBundle) -> Vec<String> {
    let declared = bundle
        .survey_columns
        .iter()
        .chain(&bundle.choice_columns);
    let from_cells = bundle
        .elements
        .iter()
        .flat_map(|element| element.cells.keys())
        .chain(
            bundle
                .choice_lists
                .iter()
                .flat_map(|list| &list.options)
                .flat_map(|option| option.cells.keys()),
        );

    let mut seen = HashSet::new();
    declared
        .chain(from_cells)
        .filter(|column| seen.insert(*column))
        .cloned()
        .collect()
}

pub fn effective_default_language<'a>(
    bundle: &'a FormBundle,
    options: &'a CompileOptions,
) -> Option<&'a str> {
    options
        .default_language
        .as_deref()
        .or(bundle.settings.default_language.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

pub fn compile_itext(
    bundle: &FormBundle,
    options: &CompileOptions,
) -> Result<CompileOutput, ItextError> {
    let columns = collect_column_names(bundle);
    let languages = build_language_table(
        columns.iter().map(String::as_str),
        effective_default_language(bundle, options),
    );
    debug!(
        languages = languages.languages().len(),
        default = %languages.default_language().name,
        "built language table"
    );

    let mut diagnostics = Vec::new();
    if languages.default_inferred() {
        diagnostics.push(Diagnostic::new(
            "DEFAULT_LANGUAGE_INFERRED",
            format!(
                "No default language declared; using first-seen \"{}\".",
                languages.default_language().name
            ),
            languages.default_language().name.clone(),
        ));
    }

    let classification = classify_lists(&bundle.elements, &bundle.choice_lists)?;
    let compiled = compile_nodes(&bundle.elements, &classification, &languages, options)?;
    let table = build_translation_table(&compiled.nodes, &languages);

    diagnostics.extend(classification.diagnostics);
    diagnostics.extend(compiled.diagnostics);
    for diagnostic in &diagnostics {
        warn!(code = %diagnostic.code, subject = %diagnostic.subject, "{}", diagnostic.message);
    }

    Ok(CompileOutput {
        table,
        diagnostics,
        inline_choice_labels: compiled.inline_choice_labels,
    })
}
