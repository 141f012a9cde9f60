//! Long-running process orchestration with graceful shutdown.
//!
//! A [`Runner`] owns a set of named application processes and drives them
//! concurrently until one of them stops or a shutdown signal (SIGINT/SIGTERM)
//! arrives. Afterwards every registered closer runs under a shared timeout,
//! regardless of how the processes ended.
//!
//! # Example
//!
//! ```no_run
//! use estop_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::new()
//!         .with_process("heartbeat", |ctx| async move {
//!             loop {
//!                 tokio::select! {
//!                     _ = ctx.cancelled() => {
//!                         tracing::info!("heartbeat stopping");
//!                         break;
//!                     }
//!                     _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                         tracing::info!("tick");
//!                     }
//!                 }
//!             }
//!             Ok(())
//!         })
//!         .with_closer(|| async move {
//!             tracing::info!("cleaning up resources");
//!             Ok(())
//!         })
//!         .with_closer_timeout(Duration::from_secs(5));
//!
//!     runner.run().await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// A long-running application process. Receives the shutdown token and is
/// expected to return once it is cancelled, or earlier with an error.
pub type AppProcess = Box<
    dyn FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>
        + Send,
>;

/// Cleanup hook executed after all processes have stopped.
pub type Closer =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send>;

/// Orchestrates named processes and cleanup functions.
///
/// The first process to stop, for whatever reason, cancels the rest. Closers
/// always run afterwards, bounded by the closer timeout.
pub struct Runner {
    processes: Vec<(String, AppProcess)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds an already-boxed process under a name used in lifecycle logging.
    pub fn with_named_process(mut self, name: impl Into<String>, process: AppProcess) -> Self {
        self.processes.push((name.into(), process));
        self
    }

    /// Adds a process from a plain closure.
    pub fn with_process<F, Fut>(self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.with_named_process(name, Box::new(|token| Box::pin(process(token))))
    }

    /// Adds a closer, executed after all processes have stopped. All closers
    /// run even if some of them fail.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    /// Sets the timeout for executing closers. Default is 10 seconds.
    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Sets a custom cancellation token, allowing external shutdown control.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs to completion and exits the process with the resulting code.
    pub async fn run(self) {
        let code = self.run_to_completion().await;
        std::process::exit(code);
    }

    /// Runs all processes until they stop, then the closers. Returns the exit
    /// code: nonzero when any process returned an error or panicked.
    pub async fn run_to_completion(self) -> i32 {
        let Runner {
            processes,
            closers,
            closer_timeout,
            cancellation_token: token,
        } = self;

        let mut join_set = JoinSet::new();
        for (name, process) in processes {
            let process_token = token.clone();
            join_set.spawn(async move { (name, process(process_token).await) });
        }

        spawn_signal_listeners(&token);

        let mut failed = false;
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((name, Ok(()))) => {
                    debug!(process = %name, "process completed");
                }
                Ok((name, Err(err))) => {
                    error!(process = %name, "process failed: {:#}", err);
                    failed = true;
                }
                Err(err) => {
                    error!("process panicked: {}", err);
                    failed = true;
                }
            }

            // The first process to stop takes the rest down with it.
            token.cancel();
        }

        if !closers.is_empty() {
            info!(timeout = ?closer_timeout, "running closers");
            match tokio::time::timeout(closer_timeout, run_closers(closers)).await {
                Ok(()) => info!("all closers completed"),
                Err(_) => error!(timeout = ?closer_timeout, "closers timed out"),
            }
        }

        if failed {
            1
        } else {
            info!("application exiting normally");
            0
        }
    }
}

fn spawn_signal_listeners(token: &CancellationToken) {
    let interrupt_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received interrupt signal");
                interrupt_token.cancel();
            }
            Err(err) => {
                error!(error = %err, "failed to install interrupt handler");
            }
        }
    });

    #[cfg(unix)]
    {
        let sigterm_token = token.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    info!("received SIGTERM signal");
                    sigterm_token.cancel();
                }
                Err(err) => {
                    error!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}

async fn run_closers(closers: Vec<Closer>) {
    let mut closer_set = JoinSet::new();
    for closer in closers {
        closer_set.spawn(async move { closer().await });
    }

    while let Some(result) = closer_set.join_next().await {
        match result {
            Ok(Ok(())) => debug!("closer completed"),
            Ok(Err(err)) => error!("closer failed: {:#}", err),
            Err(err) => error!("closer panicked: {}", err),
        }
    }
}
