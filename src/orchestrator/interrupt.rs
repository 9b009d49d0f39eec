//! Ctrl-C routing for the deploy flow
//!
//! Installing a Ctrl-C listener removes the default SIGINT action for the
//! rest of the process, so every interrupt goes through [`Interrupt`]. While
//! a guarded step (network creation, provisioning) runs, the step is
//! abandoned and the orchestrator cleans up. Anywhere else, including the
//! interactive prompts, the process exits with [`INTERRUPTED_EXIT_CODE`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// Exit status of a process stopped by SIGINT
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared interrupt state; clones observe the same interrupts
#[derive(Debug, Clone)]
pub struct Interrupt {
    fired: Arc<watch::Sender<bool>>,
    guarding: Arc<AtomicBool>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    pub fn new() -> Self {
        let (fired, _) = watch::channel(false);
        Self {
            fired: Arc::new(fired),
            guarding: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deliver one interrupt; returns whether a guarded step takes it
    pub fn trigger(&self) -> bool {
        if !self.guarding.load(Ordering::SeqCst) {
            return false;
        }
        self.fired.send_replace(true);
        true
    }

    /// Route Ctrl-C through this handle until the process ends
    pub fn listen_ctrl_c(&self) -> JoinHandle<()> {
        let interrupt = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !interrupt.trigger() {
                    warn!("Interrupted");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        })
    }

    /// Mark a guarded step as running until the returned scope is dropped
    pub(crate) fn guard(&self) -> GuardScope {
        self.guarding.store(true, Ordering::SeqCst);
        GuardScope {
            guarding: Arc::clone(&self.guarding),
        }
    }

    /// Resolves once an interrupt has reached a guarded step
    pub(crate) async fn fired(&self) {
        let mut rx = self.fired.subscribe();
        if rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

pub(crate) struct GuardScope {
    guarding: Arc<AtomicBool>,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.guarding.store(false, Ordering::SeqCst);
    }
}
