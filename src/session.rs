//! `Session`: one ISR plus configuration and the trace buffer (spec.md
//! §3.3). Never shared across turns.

use crate::config::RuntimeConfig;
use crate::isr::{Isr, Trace};

#[derive(Debug, Clone)]
pub struct Session {
    pub isr: Isr,
    pub trace: Trace,
    pub config: RuntimeConfig,
    pub language_hint: Option<String>,
}

impl Session {
    pub fn new(config: RuntimeConfig) -> Self {
        Session { isr: Isr::new(), trace: Trace::default(), config, language_hint: None }
    }

    pub fn with_language_hint(mut self, lang: impl Into<String>) -> Self {
        self.language_hint = Some(lang.into());
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(RuntimeConfig::default())
    }
}
