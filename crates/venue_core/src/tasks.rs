//! Fire-and-forget background task reporting.
//!
//! Background work (worker registration, install-choice awaits) is never
//! awaited by page code; its outcome is always routed through here.

use log::{info, warn};
use std::fmt::Display;

/// Logs the outcome of one detached background task.
///
/// Returns whether the task succeeded.
pub fn report_background_outcome<E: Display>(task: &str, outcome: Result<(), E>) -> bool {
    match outcome {
        Ok(()) => {
            info!("event=background_task module=tasks status=ok task={task}");
            true
        }
        Err(err) => {
            warn!(
                "event=background_task module=tasks status=error task={task} error={}",
                crate::logging::sanitize_message(&err.to_string(), 160)
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::report_background_outcome;

    #[test]
    fn reports_success_and_failure() {
        assert!(report_background_outcome::<String>("worker_register", Ok(())));
        assert!(!report_background_outcome(
            "worker_register",
            Err("SecurityError: insecure origin\nline2")
        ));
    }
}
