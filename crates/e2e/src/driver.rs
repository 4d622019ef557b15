//! Browser driver seam used by the page objects

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::E2eResult;

/// Element state to wait for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// Element-level browser operations.
///
/// Selectors are Playwright selector strings: plain CSS, `:has()` and
/// `:text-matches()` filters, `>>` chaining into descendants. Actions act
/// on the first matching element.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Close the current page and open a blank one
    async fn new_page(&self) -> E2eResult<()>;

    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn click(&self, selector: &str) -> E2eResult<()>;

    /// Replace the element's value with `value`
    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()>;

    /// Choose the `<option>` with `value` in a `<select>`
    async fn select_option(&self, selector: &str, value: &str) -> E2eResult<()>;

    async fn inner_text(&self, selector: &str) -> E2eResult<String>;

    /// Inner text of every match, in document order
    async fn all_inner_texts(&self, selector: &str) -> E2eResult<Vec<String>>;

    /// Wait for the element to reach `state` within the driver's default
    /// timeout. Returns `false` when it times out; any other driver failure
    /// is an error.
    async fn wait_for(&self, selector: &str, state: WaitState) -> E2eResult<bool>;

    async fn reload(&self) -> E2eResult<()>;

    async fn screenshot(&self, path: &Path) -> E2eResult<()>;
}
