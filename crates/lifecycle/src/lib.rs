//! Lifecycle rules for marriage applications.
//!
//! Given an [`Application`](shared::domain::Application) and the [`Actor`](shared::domain::Actor)
//! looking at it, this crate answers three questions: which actions are legal right now,
//! whether a concrete action with its input is acceptable, and what the record looks like
//! once the action is applied. Nothing here performs I/O; callers submit the mutation to
//! the backend only after [`validate`] succeeds.

mod action;
mod engine;
mod error;
mod view;

pub use action::{Action, ActionKind, Advisory, CertificateAttachment, Transition};
pub use engine::{apply, authorize, available_actions, validate, Applied};
pub use error::{ErrorKind, LifecycleError};
pub use view::{Capabilities, CertificateDocument, NextStep};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
