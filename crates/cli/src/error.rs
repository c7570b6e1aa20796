//! Stage-aware error reporting for the CLI.
//!
//! Every failure is printed as `error [<stage>]: <message>` followed by its
//! cause chain, and the process exits with the stage's code.

use geoslim_cloud::FetchError;
use geoslim_core::Stage;
use std::fmt;

/// A command failure together with the pipeline stage it belongs to.
#[derive(Debug)]
pub struct CliError {
    stage: Option<Stage>,
    error: anyhow::Error,
}

impl CliError {
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// 2 fetch, 3 input, 4 simplification, 1 for anything else.
    pub fn exit_code(&self) -> u8 {
        self.stage.map_or(1, Stage::exit_code)
    }

    /// Print the error and its causes to stderr.
    pub fn report(&self) {
        eprintln!("{}", self);
        for cause in self.error.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "error [{}]: {}", stage, self.error),
            None => write!(f, "error: {}", self.error),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        let stage = stage_of(&error);
        Self { stage, error }
    }
}

/// First library error in the chain decides the stage.
fn stage_of(error: &anyhow::Error) -> Option<Stage> {
    error.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<FetchError>() {
            Some(e.stage())
        } else {
            cause
                .downcast_ref::<geoslim_core::Error>()
                .map(geoslim_core::Error::stage)
        }
    })
}
