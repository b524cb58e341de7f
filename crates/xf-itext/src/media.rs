use xf_core::{MediaForm, Value};

pub const BLANK_CELL_SENTINEL: &str = "-";

const LOCATED_SCHEME: &str = "jr://";

pub fn resolve_media(raw: &str, form: MediaForm) -> Option<Value> {
    let filename = raw.trim();
    if filename.is_empty() || filename == BLANK_CELL_SENTINEL {
        return None;
    }

    if filename.starts_with(LOCATED_SCHEME) {
        return Some(Value::media(form, filename));
    }

    Some(Value::media(
        form,
        format!("{}{}/{}", LOCATED_SCHEME, form.scheme_dir(), filename),
    ))
}
