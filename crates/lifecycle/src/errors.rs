use thiserror::Error;

/// Errors surfaced by the lifecycle adapter itself.
///
/// Application-level failures travel on the fatal-error channel instead;
/// this enum only covers misuse of the adapter surface and init failures,
/// which the host treats as fatal before any service state is reported.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Backend one-time setup failed; the process must not proceed to start.
    #[error("backend init failed: {0}")]
    Init(#[source] anyhow::Error),

    /// `init` was called a second time.
    #[error("adapter already initialized")]
    AlreadyInitialized,

    /// An operation that needs the config snapshot ran before `init`.
    #[error("adapter not initialized")]
    NotInitialized,

    /// `start` was called a second time.
    #[error("application already started")]
    AlreadyStarted,

    /// The readiness/error channel pair was already moved out.
    #[error("readiness/error channels already taken")]
    ChannelsTaken,
}
