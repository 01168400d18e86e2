//! Uniform startup/shutdown contract over two divergent lifecycle styles.
//!
//! A process run is backed by exactly one [`Variant`]: an interactive
//! command execution or a supervised background service.  Whichever is
//! active, the [`LifecycleAdapter`] presents the same five operations
//! (`init`, `start`, `take_channels`, `stop`, `close`), so the platform host
//! driving the process never branches on the variant.
//!
//! The wrapped application is an external collaborator behind the
//! [`Backend`] trait.  It reports startup completion and fatal runtime
//! conditions through the [`StartupSignals`] half of the channel pair; the
//! host consumes the matching [`Channels`] half.

mod adapter;
mod errors;
mod signals;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use adapter::{Backend, LifecycleAdapter, ServiceConfig, Variant};
pub use errors::LifecycleError;
pub use signals::{Channels, StartupSignals};
