//! Remote file browser core.
//!
//! A folder tree with lazily loaded children, a listing pane backed by a
//! sort-aware cache, and the sort/view state they share, driven against a
//! remote listing service.

pub mod browser;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod service;

pub use browser::{Browser, Completion, Mutation, RenderSink, Request};
pub use error::{BrowserError, Result};
