use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use xf_api::{list_languages, CachedCompiler};
use xf_core::{CompileOptions, CompileOutput, ItextError};

mod cli_args;
mod error_map;
mod source_loader;

pub(crate) use cli_args::{Cli, CompileArgs, LanguagesArgs, Mode};
pub(crate) use error_map::{emit_error, CliStage};
pub(crate) use source_loader::{load_bundles, resolve_input_path, LoadedBundle};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, ItextError> {
    match cli.command {
        Mode::Compile(args) => run_compile(args),
        Mode::Languages(args) => run_languages(args),
    }
}

fn compile_loaded(
    compiler: &mut CachedCompiler,
    loaded: &LoadedBundle,
    options: &CompileOptions,
) -> Result<Arc<CompileOutput>, ItextError> {
    let output = compiler.compile(&loaded.bundle, options).map_err(|error| {
        if error.subject.is_some() {
            error
        } else {
            ItextError::with_subject(error.code, error.message, loaded.name.clone())
        }
    })?;
    info!(
        bundle = %loaded.name,
        languages = output.table.translations.len(),
        diagnostics = output.diagnostics.len(),
        "compiled bundle"
    );
    Ok(output)
}

fn run_compile(args: CompileArgs) -> Result<i32, ItextError> {
    let single_file = resolve_input_path(&args.input)?.is_file();
    let bundles = load_bundles(&args.input)?;
    let options = CompileOptions {
        default_language: args.default_language,
        inline_untranslated_dynamic_lists: args.inline_untranslated_dynamic,
    };

    let mut compiler = CachedCompiler::new();
    let mut outputs = Vec::with_capacity(bundles.len());
    for loaded in &bundles {
        outputs.push((loaded.name.as_str(), compile_loaded(&mut compiler, loaded, &options)?));
    }
    info!(
        bundles = outputs.len(),
        reused = compiler.hits(),
        "compile finished"
    );

    let payload = match outputs.as_slice() {
        [(_, output)] if single_file => {
            serde_json::to_string_pretty(&**output)
                .map_err(|error| CliStage::OutputWrite.fail(error))?
        }
        _ => {
            let by_name = outputs
                .iter()
                .map(|(name, output)| (*name, &**output))
                .collect::<BTreeMap<&str, &CompileOutput>>();
            serde_json::to_string_pretty(&by_name)
                .map_err(|error| CliStage::OutputWrite.fail(error))?
        }
    };

    match args.output {
        Some(output_path) => {
            write_output(Path::new(&output_path), &payload)?;
            println!("RESULT:OK");
            println!("OUTPUT:{}", output_path);
        }
        None => println!("{}", payload),
    }
    Ok(0)
}

fn write_output(path: &Path, payload: &str) -> Result<(), ItextError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| CliStage::OutputWrite.fail(error))?;
    }
    fs::write(path, payload).map_err(|error| CliStage::OutputWrite.fail(error))
}

fn run_languages(args: LanguagesArgs) -> Result<i32, ItextError> {
    let bundles = load_bundles(&args.input)?;
    let options = CompileOptions {
        default_language: args.default_language,
        ..CompileOptions::default()
    };

    for loaded in &bundles {
        if bundles.len() > 1 {
            println!("# {}", loaded.name);
        }
        for language in list_languages(&loaded.bundle, &options) {
            let marker = if language.is_default { "*" } else { " " };
            println!("{} {}", marker, language.name);
        }
    }
    Ok(0)
}

#[cfg(test)]
mod cli_test_support {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) const SAMPLE_BUNDLE: &str = r#"{
        "survey_columns": ["type", "name", "label", "label::Latin", "choice_filter"],
        "choice_columns": ["list_name", "name", "label", "label::Latin", "media::image"],
        "elements": [
            {"path": "/data/consent", "kind": "question", "list_name": "consent",
             "cells": {"label": "Would you like to participate ?"}},
            {"path": "/data/enumerator_mood", "kind": "question", "list_name": "mood",
             "choice_filter": "selected(${consent}, 'y')",
             "cells": {"label": "How are you feeling today ?"}}
        ],
        "choice_lists": [
            {"name": "mood", "options": [
                {"value": "h", "cells": {"label": "Happy", "label::Latin": "Felix", "media::image": "happy.jpg"}},
                {"value": "s", "cells": {"label": "Sad", "label::Latin": "Miserabilis", "media::image": "sad.jpg"}}
            ]},
            {"name": "consent", "options": [
                {"value": "y", "cells": {"label": "Yes"}},
                {"value": "n", "cells": {"label": "No"}}
            ]}
        ]
    }"#;

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("xf-itext-{}-{}", name, nanos))
    }

    pub(crate) fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, content).expect("file should be written");
    }
}
