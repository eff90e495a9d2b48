//! # OverlayHub Analysis
//!
//! Page analysis and the planning that turns it into overlay commands.
//!
//! - [`MockProvider`], [`ChatCompletionsProvider`] (`remote-a`) and
//!   [`MessagesProvider`] (`remote-b`) implement
//!   [`AnalysisProvider`](overlayhub_protocols::AnalysisProvider)
//! - [`dom`] summarises DOM snapshots and picks elements worth highlighting
//! - [`planner`] builds overlay and highlight commands
//! - [`voice`] maps spoken phrases onto commands

pub mod dom;
mod factory;
mod mock;
pub mod planner;
pub mod remote;
pub mod voice;

pub use dom::{analyze_dom, find_interesting_elements, DomAnalysis, DomSnapshot, InterestingElement};
pub use factory::build_provider;
pub use mock::MockProvider;
pub use remote::{ChatCompletionsProvider, MessagesProvider, RemoteSettings, DEFAULT_PROMPT};
