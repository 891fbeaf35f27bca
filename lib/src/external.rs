use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::completion::{Completer, Verification};
use crate::{HostnameVerifier, Status, VerificationRequest};

/// Custom check that produces its status inline
pub trait SyncCheck: Send + Sync + 'static {
    /// Evaluate the request
    fn check(&self, request: &VerificationRequest) -> Status;
}

impl<F> SyncCheck for F
where
    F: Fn(&VerificationRequest) -> Status + Send + Sync + 'static,
{
    fn check(&self, request: &VerificationRequest) -> Status {
        self(request)
    }
}

/// Custom check that delivers its status through a [`Completer`]
///
/// The check runs on a worker dispatched by [`ExternalVerifier`]. It may complete before
/// returning or hand the completer off to finish later.
pub trait AsyncCheck: Send + Sync + 'static {
    /// Evaluate the request and eventually complete
    fn check(&self, request: Arc<VerificationRequest>, completer: Completer);
}

impl<F> AsyncCheck for F
where
    F: Fn(Arc<VerificationRequest>, Completer) + Send + Sync + 'static,
{
    fn check(&self, request: Arc<VerificationRequest>, completer: Completer) {
        self(request, completer)
    }
}

#[derive(Clone)]
enum Mode {
    Sync(Arc<dyn SyncCheck>),
    Async(Arc<dyn AsyncCheck>),
}

/// Where asynchronous checks are executed
#[derive(Clone, Debug)]
enum Dispatch {
    /// A dedicated thread per verification
    Thread,
    /// The blocking pool of a Tokio runtime
    Runtime(tokio::runtime::Handle),
}

/// Verifier that runs a deployment-supplied check, optionally preceded by hostname verification
///
/// The check is either synchronous, in which case every verification completes before
/// returning, or asynchronous, in which case every verification is deferred. When both the
/// hostname check and the custom check reject, the diagnostics are joined hostname first:
/// `"<hostname>; <custom>"`.
#[derive(Clone)]
pub struct ExternalVerifier {
    mode: Mode,
    hostname: Option<HostnameVerifier>,
    dispatch: Dispatch,
}

impl ExternalVerifier {
    /// Verifier whose check runs inline on the calling thread
    pub fn synchronous(check: impl SyncCheck) -> Self {
        Self::with_mode(Mode::Sync(Arc::new(check)))
    }

    /// Verifier whose check is dispatched to a worker, deferring every result
    pub fn asynchronous(check: impl AsyncCheck) -> Self {
        Self::with_mode(Mode::Async(Arc::new(check)))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            hostname: Some(HostnameVerifier::new()),
            dispatch: Dispatch::Thread,
        }
    }

    /// Replace the hostname pre-check, e.g. to change its verbosity
    pub fn with_hostname_verifier(self, hostname: HostnameVerifier) -> Self {
        Self {
            hostname: Some(hostname),
            ..self
        }
    }

    /// Run only the custom check
    pub fn without_hostname_check(self) -> Self {
        Self {
            hostname: None,
            ..self
        }
    }

    /// Dispatch asynchronous checks onto the blocking pool of a Tokio runtime
    /// instead of a dedicated thread
    pub fn on_runtime(self, handle: tokio::runtime::Handle) -> Self {
        Self {
            dispatch: Dispatch::Runtime(handle),
            ..self
        }
    }

    /// `true` if results are always deferred
    pub fn is_asynchronous(&self) -> bool {
        matches!(self.mode, Mode::Async(_))
    }

    /// Start verifying the request
    pub fn verify(&self, request: Arc<VerificationRequest>) -> Verification {
        match &self.mode {
            Mode::Sync(check) => Verification::Complete(self.run_sync(check.as_ref(), &request)),
            Mode::Async(check) => {
                let (completer, pending) = crate::completion::channel();
                self.dispatch(check.clone(), request, completer);
                Verification::Pending(pending)
            }
        }
    }

    /// Callback form of [`ExternalVerifier::verify`].
    ///
    /// Returns `true` if the status was written to `sync_status`; `callback` is then dropped
    /// without being invoked. Returns `false` if the status is deferred; `sync_status` is left
    /// untouched and `callback` is invoked exactly once, possibly from another thread.
    pub fn verify_with_callback(
        &self,
        request: Arc<VerificationRequest>,
        sync_status: &mut Status,
        callback: impl FnOnce(Status) + Send + 'static,
    ) -> bool {
        match &self.mode {
            Mode::Sync(check) => {
                *sync_status = self.run_sync(check.as_ref(), &request);
                true
            }
            Mode::Async(check) => {
                self.dispatch(check.clone(), request, Completer::from_callback(callback));
                false
            }
        }
    }

    fn hostname_status(&self, request: &VerificationRequest) -> Status {
        match &self.hostname {
            Some(hostname) => hostname.verify(request),
            None => Status::Verified,
        }
    }

    fn run_sync(&self, check: &dyn SyncCheck, request: &VerificationRequest) -> Status {
        let hostname = self.hostname_status(request);
        let custom = catch_unwind(AssertUnwindSafe(|| check.check(request)))
            .unwrap_or_else(|payload| {
                let msg = panic_message(payload.as_ref());
                tracing::warn!("synchronous verification check panicked: {msg}");
                Status::rejected(format!("verification check panicked: {msg}"))
            });
        hostname.and(custom)
    }

    fn dispatch(
        &self,
        check: Arc<dyn AsyncCheck>,
        request: Arc<VerificationRequest>,
        completer: Completer,
    ) {
        // the hostname check never suspends, so it runs here and its status rides along
        let hostname = self.hostname_status(&request);
        let completer = completer.map(move |custom| hostname.and(custom));

        let job = move || {
            // a panic drops the completer, which delivers the rejection
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| check.check(request, completer)))
            {
                tracing::warn!(
                    "asynchronous verification check panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        };

        match &self.dispatch {
            Dispatch::Thread => {
                let spawned = std::thread::Builder::new()
                    .name("peer-verify".to_string())
                    .spawn(job);
                if let Err(err) = spawned {
                    // the job and its completer were dropped, which rejected the verification
                    tracing::error!("unable to spawn verification thread: {err}");
                }
            }
            Dispatch::Runtime(handle) => {
                tracing::trace!("dispatching verification check to runtime");
                drop(handle.spawn_blocking(job));
            }
        }
    }
}

impl std::fmt::Debug for ExternalVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.mode {
            Mode::Sync(_) => "sync",
            Mode::Async(_) => "async",
        };
        f.debug_struct("ExternalVerifier")
            .field("mode", &mode)
            .field("hostname", &self.hostname)
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

