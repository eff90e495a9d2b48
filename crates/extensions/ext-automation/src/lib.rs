//! Page automation assistants for OverlayHub.
//!
//! - `form_filler`: on `dom_ready` with forms present, badges the page and
//!   outlines required fields.
//! - `login_assistant`: on `page_load` for login pages, badges the page and
//!   outlines credential inputs.
//! - `navigation_helper`: accepted in configuration, no behaviour yet.

mod assistants;
mod extension;

pub use assistants::{form_commands, is_login_url, login_commands, Automation};
pub use extension::{AutomationConfig, AutomationExtension};
