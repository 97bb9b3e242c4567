use tracing::error;

use crate::config::ConfigState;

/// Response when the ownership file could not be loaded at startup.
pub const READ_FAILURE_TEXT: &str = "Failed to read ownership file";

/// Response when no owner record claims the requested project.
pub const OWNER_NOT_FOUND_TEXT: &str = "Failed to find the owner of the project";

/// Answer the ownership query against the frozen config state.
///
/// Every failure path produces fixed response text rather than an error;
/// callers inspect the text, not a status code.
pub fn lookup(state: &ConfigState, project: &str) -> String {
    match state {
        ConfigState::Failed(err) => {
            error!("lookup for {} while config unavailable: {}", project, err);
            READ_FAILURE_TEXT.to_string()
        }
        ConfigState::Loaded { owners, .. } => {
            // First match wins when records claim the same project.
            match owners.iter().find(|owner| owner.owns(project)) {
                Some(owner) => format!("The owner of this project is {}", owner.name),
                None => OWNER_NOT_FOUND_TEXT.to_string(),
            }
        }
    }
}
