use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The namespace or the VMI does not look the way the binding
    /// requires. Never retried.
    #[error("{0}")]
    Precondition(String),

    #[error("{context}: {source}")]
    Capability {
        context: String,
        #[source]
        source: netzwerk::Error,
    },

    #[error("{0}")]
    MalformedInput(String),

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<netzwerk::Error> for Error {
    fn from(source: netzwerk::Error) -> Self {
        Error::Capability {
            context: "network namespace".into(),
            source,
        }
    }
}

/// Attach a description of the failed step to a capability error.
pub(crate) trait Context<T> {
    fn context(self, context: impl Into<String>) -> Result<T, Error>;
}

impl<T> Context<T> for Result<T, netzwerk::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, Error> {
        self.map_err(|source| Error::Capability {
            context: context.into(),
            source,
        })
    }
}

/// Select the only candidate.
///
/// Zero or several candidates violate a precondition; `subject`
/// names what was looked for in the error message.
pub fn exactly_one<T>(
    candidates: impl IntoIterator<Item = T>,
    subject: &str,
) -> Result<T, Error> {
    let mut candidates = candidates.into_iter();

    match (candidates.next(), candidates.next()) {
        (Some(candidate), None) => Ok(candidate),
        (None, _) => Err(Error::Precondition(format!("no {} found", subject))),
        (Some(_), Some(_)) => Err(Error::Precondition(format!(
            "expected exactly one {}, found {}",
            subject,
            2 + candidates.count()
        ))),
    }
}
