use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::Status;

/// Diagnostic delivered when a [`Completer`] is dropped without being completed
pub const ABANDONED: &str = "verification check finished without a result";

/// Callback that receives the final status of a deferred verification
pub type Callback = Box<dyn FnOnce(Status) + Send + 'static>;

/// Single-use handle through which an asynchronous check delivers its result
///
/// [`Completer::complete`] consumes the handle, so a result can be delivered at most once.
/// If the handle is dropped first (the check panicked, forgot to complete, or the worker never
/// ran) a rejection carrying [`ABANDONED`] is delivered instead, so the receiving side always
/// observes exactly one status.
pub struct Completer {
    sink: Option<Callback>,
}

impl Completer {
    /// Adapt a plain callback
    pub fn from_callback(callback: impl FnOnce(Status) + Send + 'static) -> Self {
        Self {
            sink: Some(Box::new(callback)),
        }
    }

    /// Deliver the final status
    pub fn complete(mut self, status: Status) {
        if let Some(sink) = self.sink.take() {
            sink(status)
        }
    }

    /// Completer that transforms the status before handing it to this one
    pub(crate) fn map(mut self, f: impl FnOnce(Status) -> Status + Send + 'static) -> Self {
        match self.sink.take() {
            Some(sink) => Self::from_callback(move |status| sink(f(status))),
            None => Self { sink: None },
        }
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            tracing::warn!("{ABANDONED}");
            sink(Status::rejected(ABANDONED))
        }
    }
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("completed", &self.sink.is_none())
            .finish()
    }
}

/// Create a connected completer and pending result
pub fn channel() -> (Completer, Pending) {
    let (tx, rx) = oneshot::channel();
    let completer = Completer::from_callback(move |status| {
        // the receiver may have given up on the handshake already
        let _ = tx.send(status);
    });
    (completer, Pending { rx })
}

/// Status of a verification that has not completed yet
///
/// The status can only be obtained once it has been delivered: by awaiting, by
/// [`Pending::wait`], or by polling with [`Pending::try_status`].
#[derive(Debug)]
pub struct Pending {
    rx: oneshot::Receiver<Status>,
}

impl Pending {
    /// Block the current thread until the status is delivered.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; `.await` the
    /// `Pending` there instead.
    pub fn wait(self) -> Status {
        self.rx.blocking_recv().unwrap_or_else(|_| Status::rejected(ABANDONED))
    }

    /// Status if it has already been delivered
    pub fn try_status(&mut self) -> Option<Status> {
        match self.rx.try_recv() {
            Ok(status) => Some(status),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Status::rejected(ABANDONED)),
        }
    }
}

impl Future for Pending {
    type Output = Status;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|_| Status::rejected(ABANDONED)))
    }
}

/// Result of starting a verification
#[must_use]
#[derive(Debug)]
pub enum Verification {
    /// The status was produced before `verify` returned
    Complete(Status),
    /// The status will be delivered later
    Pending(Pending),
}

impl Verification {
    /// `true` if the verification completed synchronously
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Wait asynchronously for the final status
    pub async fn status(self) -> Status {
        match self {
            Self::Complete(status) => status,
            Self::Pending(pending) => pending.await,
        }
    }

    /// Block until the final status is available. See [`Pending::wait`].
    pub fn wait(self) -> Status {
        match self {
            Self::Complete(status) => status,
            Self::Pending(pending) => pending.wait(),
        }
    }
}
