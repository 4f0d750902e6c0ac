//! Nova status normalization

use skybridge_cloud::InstanceState;

const TASK_POWERING_OFF: &str = "powering-off";

/// Map a Nova `status` (and `OS-EXT-STS:task_state`) to the canonical state
pub fn normalize_state(status: &str, task_state: Option<&str>) -> InstanceState {
    match status {
        "BUILD" | "REBUILD" => InstanceState::Building,
        "ACTIVE" if task_state == Some(TASK_POWERING_OFF) => InstanceState::Stopping,
        "ACTIVE" => InstanceState::Active,
        "HARD_REBOOT" | "REBOOT" => InstanceState::Rebooting,
        "MIGRATING" | "RESCUE" | "RESIZE" | "REVERT_RESIZE" | "VERIFY_RESIZE" => {
            InstanceState::Unavailable
        }
        "DELETED" | "SHELVED" | "SHELVED_OFFLOADED" | "SOFT_DELETED" => InstanceState::Deleted,
        "PAUSED" | "SHUTOFF" | "SUSPENDED" => InstanceState::Stopped,
        "ERROR" => InstanceState::Error,
        _ => InstanceState::Unknown,
    }
}
