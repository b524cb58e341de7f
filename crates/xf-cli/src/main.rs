use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("xf_itext=info".parse()?)
                .add_directive("xf_cli=info".parse()?),
        )
        .init();

    let code = xf_cli::run_cli_from_args(std::env::args_os());
    std::process::exit(code);
}
