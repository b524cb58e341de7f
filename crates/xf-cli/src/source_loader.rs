use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use xf_api::parse_bundle;
use xf_core::{FormBundle, ItextError};

use crate::CliStage;

#[derive(Debug, Clone)]
pub(crate) struct LoadedBundle {
    pub(crate) name: String,
    pub(crate) bundle: FormBundle,
}

pub(crate) fn resolve_input_path(input: &str) -> Result<PathBuf, ItextError> {
    let path = PathBuf::from(input);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(|error| CliStage::InputPath.fail(error))?
            .join(path)
    };

    if !absolute.exists() {
        return Err(ItextError::new(
            "CLI_INPUT_NOT_FOUND",
            format!("input does not exist: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

fn read_bundle(path: &Path, name: String) -> Result<LoadedBundle, ItextError> {
    let source = fs::read_to_string(path).map_err(|error| CliStage::InputRead.fail(error))?;
    let bundle = parse_bundle(&source).map_err(|error| {
        ItextError::with_subject(error.code, error.message, name.clone())
    })?;
    Ok(LoadedBundle { name, bundle })
}

pub(crate) fn load_bundles(input: &str) -> Result<Vec<LoadedBundle>, ItextError> {
    let root = resolve_input_path(input)?;

    if root.is_file() {
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        return Ok(vec![read_bundle(&root, name)?]);
    }

    let mut bundles = Vec::new();
    for entry in WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| CliStage::InputScan.fail(error))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let relative = path
            .strip_prefix(&root)
            .map_err(|error| CliStage::InputScan.fail(error))?
            .to_string_lossy()
            .replace('\\', "/");
        bundles.push(read_bundle(path, relative)?);
    }

    if bundles.is_empty() {
        return Err(ItextError::new(
            "CLI_INPUT_EMPTY",
            format!("No .json bundles under {}", root.display()),
        ));
    }

    Ok(bundles)
}
