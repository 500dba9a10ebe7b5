//! Message types for actor communication

use tokio::sync::oneshot;

use crate::error::CollectorResult;

/// Commands that can be sent to a SamplerActor
#[derive(Debug)]
pub enum SamplerCommand {
    /// Take a sample immediately, bypassing the interval timer
    ///
    /// Used for testing and manual refresh operations.
    SampleNow {
        /// Channel to send the result back
        respond_to: oneshot::Sender<CollectorResult<()>>,
    },

    /// Gracefully shut down the sampler
    ///
    /// The actor finishes any in-flight sample and then exits.
    Shutdown,
}
