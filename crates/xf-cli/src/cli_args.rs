use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "xf-itext")]
#[command(about = "Compile form bundles into itext translation tables")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Compile(CompileArgs),
    Languages(LanguagesArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CompileArgs {
    /// Bundle file, or a directory scanned for `*.json` bundles.
    #[arg(long = "input")]
    pub(crate) input: String,
    #[arg(long = "output")]
    pub(crate) output: Option<String>,
    #[arg(long = "default-language")]
    pub(crate) default_language: Option<String>,
    #[arg(long = "inline-untranslated-dynamic")]
    pub(crate) inline_untranslated_dynamic: bool,
}

#[derive(Debug, Args)]
pub(crate) struct LanguagesArgs {
    #[arg(long = "input")]
    pub(crate) input: String,
    #[arg(long = "default-language")]
    pub(crate) default_language: Option<String>,
}
