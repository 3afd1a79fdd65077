//! The capability set a host application exchanges with the panel.
//!
//! The host owns windowing, the model set, and the embedded page
//! renderer; the panel reaches them only through these traits, and the
//! host drives the panel only through [`ToolInstance`].

use crate::error::TempestError;
use crate::models::Model;
use url::Url;

/// The embedded page renderer. Write-only from the panel's side:
/// nothing is ever read back out of the page.
pub trait HtmlView {
    /// Point the renderer at a page.
    fn set_url(&mut self, url: &str);

    /// Execute a script payload inside the current page.
    fn run_javascript(&mut self, script: &str);
}

/// The opaque host session handle. Owned and synchronized by the host;
/// the panel only takes snapshots.
pub trait Session {
    /// The host's current model set, in host enumeration order.
    fn models(&self) -> Vec<Model>;
}

/// The contract a tool panel implements to be loaded by the host.
pub trait ToolInstance {
    /// Whether the instance survives session closure.
    const SESSION_ENDURING: bool = false;
    /// Whether the instance participates in session persistence.
    const SESSION_SAVE: bool = false;
    /// URL scheme recognized as a page-to-panel command.
    const CUSTOM_SCHEME: &'static str;
    /// Help-page reference registered with the host.
    const HELP: &'static str;

    /// Name shown on the tool window title bar.
    fn display_name(&self) -> &str;

    /// Suggested initial tool size in logical units.
    fn size_hint(&self) -> (u32, u32);

    /// Called when a link with [`Self::CUSTOM_SCHEME`] is visited.
    fn handle_scheme(&mut self, url: &Url) -> Result<(), TempestError>;

    /// Called when models are opened or closed.
    fn models_changed(&mut self);
}
