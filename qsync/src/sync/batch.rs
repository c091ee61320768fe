//! Command batches.

use crate::position::ResyncPlan;

/// An ordered, immutable sequence of command lines delivered to one target
/// as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBatch {
    commands: Vec<String>,
}

impl CommandBatch {
    /// Build a batch from raw command lines.
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    /// The four-command resync batch, in the order the controllers expect:
    /// location, UTC offset, date, time.
    pub fn resync(plan: &ResyncPlan) -> Self {
        Self {
            commands: vec![
                format!("#SYSTEM,4,{:.1},{:.1}", plan.latitude, plan.longitude),
                format!("#SYSTEM,5,{}", format_offset_hours(plan.utc_offset_minutes)),
                format!("#SYSTEM,2,{}", plan.local_date),
                format!("#SYSTEM,1,{}", plan.local_time),
            ],
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Render a minute offset in hours, fractional only when not whole
/// (`-300` → `-5`, `330` → `5.5`).
fn format_offset_hours(minutes: i32) -> String {
    if minutes % 60 == 0 {
        (minutes / 60).to_string()
    } else {
        format!("{}", f64::from(minutes) / 60.0)
    }
}
