pub mod classify;
pub mod columns;
pub mod languages;
pub mod media;
pub mod nodes;
pub mod pipeline;

pub use classify::{classify_lists, Classification};
pub use columns::{parse_column, ColumnKey};
pub use languages::{build_language_table, LanguageTable};
pub use media::{resolve_media, BLANK_CELL_SENTINEL};
pub use nodes::{build_translation_table, compile_nodes, CompiledNodes};
pub use pipeline::{collect_column_names, compile_itext, effective_default_language};
