// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

/// Sink for user interactions. Every click, keystroke-level edit, tab switch,
/// and toolbar activation is recorded here so stub actions still leave a
/// visible trace.
pub trait ActionLog {
    fn record(&mut self, action: &str) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullActionLog;

impl ActionLog for NullActionLog {
    fn record(&mut self, _action: &str) -> Result<()> {
        Ok(())
    }
}
