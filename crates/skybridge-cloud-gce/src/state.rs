//! Compute Engine status normalization

use skybridge_cloud::InstanceState;

/// Map a GCE instance `status` to the canonical state
pub fn normalize_state(status: &str) -> InstanceState {
    match status {
        "PROVISIONING" | "STAGING" => InstanceState::Building,
        "RUNNING" => InstanceState::Active,
        "STOPPING" | "SUSPENDING" => InstanceState::Stopping,
        "STOPPED" | "SUSPENDED" | "TERMINATED" => InstanceState::Stopped,
        "REPAIRING" => InstanceState::Unavailable,
        _ => InstanceState::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let cases = [
            ("PROVISIONING", InstanceState::Building),
            ("STAGING", InstanceState::Building),
            ("RUNNING", InstanceState::Active),
            ("STOPPING", InstanceState::Stopping),
            ("SUSPENDING", InstanceState::Stopping),
            ("TERMINATED", InstanceState::Stopped),
            ("SUSPENDED", InstanceState::Stopped),
            ("REPAIRING", InstanceState::Unavailable),
            ("running", InstanceState::Unknown),
            ("", InstanceState::Unknown),
        ];
        for (status, expected) in cases {
            assert_eq!(normalize_state(status), expected, "status {status}");
        }
    }
}
