//! Passes and their lifecycle.
//!
//! A pass runs in two steps. `collect` computes results from a document
//! snapshot; `apply` commits them and is only invoked when `collect` finished
//! without being canceled. A canceled run is `abandon`ed instead.

mod general;
mod injected;


pub use general::{GeneralPass, PassContext};

use crate::progress::{Cancellable, ProgressToken};

/// A unit of analysis driven by [`ProgressablePass`].
pub trait HighlightingPass {
    /// Compute results. Must propagate cancellation unchanged.
    fn collect(&mut self, progress: &ProgressToken) -> Cancellable<()>;

    /// Commit what `collect` computed.
    fn apply(&mut self, progress: &ProgressToken);

    /// Called instead of [`apply`](Self::apply) when the run was canceled.
    fn abandon(&mut self, _progress: &ProgressToken) {}

    /// Whether [`ProgressablePass::progress`] is meaningful for this pass.
    fn reports_progress(&self) -> bool {
        true
    }
}

/// Drives a [`HighlightingPass`] under a [`ProgressToken`].
#[derive(Debug)]
pub struct ProgressablePass<P> {
    pass: P,
    token: ProgressToken,
}

impl<P: HighlightingPass> ProgressablePass<P> {
    pub fn new(pass: P, token: ProgressToken) -> Self {
        Self { pass, token }
    }

    pub fn token(&self) -> &ProgressToken {
        &self.token
    }

    pub fn pass(&self) -> &P {
        &self.pass
    }

    pub fn into_inner(self) -> P {
        self.pass
    }

    /// Run collect then apply, or abandon on cancellation.
    ///
    /// The token is marked running for the duration and stopped on every
    /// path, so [`ProgressToken::wait_for`] always returns eventually.
    pub fn run(&mut self) -> Cancellable<()> {
        self.token.start();
        let result = self
            .pass
            .collect(&self.token)
            .and_then(|()| self.token.check_canceled());
        match result {
            Ok(()) => self.pass.apply(&self.token),
            Err(_) => self.pass.abandon(&self.token),
        }
        self.token.stop();
        result
    }

    /// Fraction of work done, or `None` when indeterminate.
    pub fn progress(&self) -> Option<f64> {
        if self.pass.reports_progress() {
            self.token.fraction()
        } else {
            None
        }
    }
}
