//! Post-commit hooks.
//!
//! Hooks observe a write that already happened. They cannot veto it and their
//! failures are only logged.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::CommitEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("hook storage failure: {0}")]
    Store(String),

    #[error("hook delivery failure: {0}")]
    Delivery(String),
}

/// A side effect run after a successful write.
#[async_trait]
pub trait PostCommitHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn on_commit(&self, event: &CommitEvent) -> Result<(), HookError>;
}

#[async_trait]
impl<H> PostCommitHook for Arc<H>
where
    H: PostCommitHook + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn on_commit(&self, event: &CommitEvent) -> Result<(), HookError> {
        (**self).on_commit(event).await
    }
}

/// How a [`HookList`] runs its hooks.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Spawn onto the runtime and return immediately.
    #[default]
    Detached,
    /// Await every hook before returning. Errors are still swallowed.
    Inline,
}

/// Ordered list of hooks sharing one dispatch mode.
#[derive(Clone, Default)]
pub struct HookList {
    hooks: Vec<Arc<dyn PostCommitHook>>,
    mode: DispatchMode,
}

impl core::fmt::Debug for HookList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HookList")
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .field("mode", &self.mode)
            .finish()
    }
}

impl HookList {
    pub fn new(mode: DispatchMode) -> Self {
        Self {
            hooks: Vec::new(),
            mode,
        }
    }

    pub fn with(mut self, hook: Arc<dyn PostCommitHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn push(&mut self, hook: Arc<dyn PostCommitHook>) {
        self.hooks.push(hook);
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook for `event`.
    ///
    /// Never fails. In detached mode this requires a Tokio runtime; without
    /// one the event is dropped with a warning.
    pub async fn dispatch(&self, event: CommitEvent) {
        if self.hooks.is_empty() {
            return;
        }

        match self.mode {
            DispatchMode::Inline => run_all(&self.hooks, &event).await,
            DispatchMode::Detached => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let hooks = self.hooks.clone();
                    handle.spawn(async move {
                        run_all(&hooks, &event).await;
                    });
                }
                Err(_) => {
                    tracing::warn!(
                        enterprise_id = %event.enterprise_id,
                        action = %event.action,
                        "no runtime available; post-commit hooks skipped"
                    );
                }
            },
        }
    }
}

async fn run_all(hooks: &[Arc<dyn PostCommitHook>], event: &CommitEvent) {
    for hook in hooks {
        if let Err(err) = hook.on_commit(event).await {
            tracing::warn!(
                hook = hook.name(),
                enterprise_id = %event.enterprise_id,
                action = %event.action,
                error = %err,
                "post-commit hook failed"
            );
        }
    }
}
