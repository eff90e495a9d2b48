//! Counter set.

use serde::{Deserialize, Serialize};

use overlayhub_protocols::hook::names;

/// Storage key the counters live under.
pub const METRICS_KEY: &str = "metrics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Commands,
    Pages,
    Analyses,
    Errors,
}

impl Counter {
    /// Counter a hook feeds, if any.
    pub fn for_hook(hook: &str) -> Option<Self> {
        match hook {
            names::COMMAND_EXECUTED => Some(Self::Commands),
            names::PAGE_LOAD => Some(Self::Pages),
            names::ANALYSIS_COMPLETE => Some(Self::Analyses),
            names::ERROR_OCCURRED => Some(Self::Errors),
            _ => None,
        }
    }

    pub const HOOKS: [&'static str; 4] = [
        names::COMMAND_EXECUTED,
        names::PAGE_LOAD,
        names::ANALYSIS_COMPLETE,
        names::ERROR_OCCURRED,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub commands: u64,
    pub pages: u64,
    pub analyses: u64,
    pub errors: u64,
}

impl Metrics {
    pub fn increment(&mut self, counter: Counter) {
        let slot = match counter {
            Counter::Commands => &mut self.commands,
            Counter::Pages => &mut self.pages,
            Counter::Analyses => &mut self.analyses,
            Counter::Errors => &mut self.errors,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Commands => self.commands,
            Counter::Pages => self.pages,
            Counter::Analyses => self.analyses,
            Counter::Errors => self.errors,
        }
    }
}
