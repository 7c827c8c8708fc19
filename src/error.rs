use thiserror::Error;

use crate::fixture::FixtureId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("position must be 0-{max}, got {position}")]
    InvalidPosition { position: u32, max: u32 },

    #[error("channel must be \"red\", \"green\", or \"blue\", got {0:?}")]
    UnknownChannel(String),

    #[error("unknown effect {0:?}")]
    UnknownEffect(String),

    #[error("unknown mode {0:?}")]
    UnknownMode(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A read or write round trip against the bridge failed.
    #[error("failed to {action} light {id}")]
    Device {
        id: FixtureId,
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Restore ran to completion but some fixtures could not be restored.
    /// The source is the first failure encountered.
    #[error("failed to restore lights {failed:?}")]
    PartialRestore {
        failed: Vec<FixtureId>,
        #[source]
        source: Box<Error>,
    },

    #[error("mode state lock poisoned")]
    Poisoned,
}

impl Error {
    pub(crate) fn device(id: FixtureId, action: &'static str, source: anyhow::Error) -> Error {
        return Error::Device { id, action, source };
    }

    /// The error and all of its sources on one line.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(e) = source {
            out.push_str(": ");
            out.push_str(&e.to_string());
            source = e.source();
        }
        return out;
    }

    /// Whether the error came from the caller rather than from the bridge.
    pub fn is_invalid_input(&self) -> bool {
        return matches!(
            self,
            Error::InvalidPosition { .. }
                | Error::UnknownChannel(_)
                | Error::UnknownEffect(_)
                | Error::UnknownMode(_)
                | Error::InvalidConfig(_)
        );
    }
}

pub type Result<T> = std::result::Result<T, Error>;
