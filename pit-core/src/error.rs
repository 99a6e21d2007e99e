//! Error taxonomy for the simulation core.
//!
//! Thread-lifecycle failures are warnings, never aborts: a broker that
//! failed to spawn simply never participates, and the coordinator only
//! joins handles that actually exist. The core has no fatal path; only
//! the CLI layer may exit early, and only on invalid configuration.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// The OS refused to create a thread.
    #[error("failed to spawn {role} thread {id}: {source}")]
    ResourceExhausted {
        role: &'static str,
        id: usize,
        #[source]
        source: io::Error,
    },

    /// A joined thread did not terminate cleanly (it panicked).
    #[error("{role} thread {id} did not terminate cleanly")]
    JoinFailed { role: &'static str, id: usize },

    /// Malformed configuration, surfaced before any thread starts.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = SimError::ResourceExhausted {
            role: "broker",
            id: 7,
            source: io::Error::new(io::ErrorKind::WouldBlock, "no threads left"),
        };
        let msg = err.to_string();
        assert!(msg.contains("broker"));
        assert!(msg.contains('7'));

        let err = SimError::JoinFailed {
            role: "agent",
            id: 3,
        };
        assert!(err.to_string().contains("did not terminate cleanly"));
    }
}
