use std::fmt::Display;
use std::io::{self, Write};

use tracing::warn;
use xf_core::ItextError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CliStage {
    InputPath,
    InputRead,
    InputScan,
    OutputWrite,
}

impl CliStage {
    pub(crate) fn code(self) -> &'static str {
        match self {
            Self::InputPath => "CLI_INPUT_PATH",
            Self::InputRead => "CLI_INPUT_READ",
            Self::InputScan => "CLI_INPUT_SCAN",
            Self::OutputWrite => "CLI_OUTPUT_WRITE",
        }
    }

    pub(crate) fn fail(self, error: impl Display) -> ItextError {
        ItextError::new(self.code(), error.to_string())
    }
}

pub(crate) fn write_error(out: &mut impl Write, error: &ItextError) -> io::Result<()> {
    writeln!(out, "RESULT:ERROR")?;
    writeln!(out, "ERROR_CODE:{}", error.code)?;
    if let Some(subject) = &error.subject {
        writeln!(out, "ERROR_SUBJECT:{}", subject)?;
    }
    let message = serde_json::to_string(&error.message).map_err(io::Error::other)?;
    writeln!(out, "ERROR_MSG_JSON:{}", message)
}

pub(crate) fn emit_error(error: ItextError) -> i32 {
    if let Err(write_failure) = write_error(&mut io::stdout().lock(), &error) {
        warn!(code = %error.code, "could not report error: {}", write_failure);
    }
    1
}
