use std::time::Duration as StdDuration;

/// How service operations suspend before running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Latency {
    /// Yield to the scheduler once.
    #[default]
    Immediate,
    /// Sleep for the per-operation delay.
    Simulated,
}

impl Latency {
    /// Pick the mode from the `simulate_latency` switch.
    #[must_use]
    pub const fn from_flag(simulate: bool) -> Self {
        if simulate { Self::Simulated } else { Self::Immediate }
    }

    /// Suspend the caller; `delay` applies only in simulated mode.
    pub async fn pause(self, delay: StdDuration) {
        match self {
            Self::Simulated if !delay.is_zero() => tokio::time::sleep(delay).await,
            _ => tokio::task::yield_now().await,
        }
    }
}

/// Per-operation delays of the list service.
pub mod lists {
    use super::StdDuration;

    /// `get_all`.
    pub const GET_ALL: StdDuration = StdDuration::from_millis(200);
    /// `get_by_id`.
    pub const GET_BY_ID: StdDuration = StdDuration::from_millis(150);
    /// `create`.
    pub const CREATE: StdDuration = StdDuration::from_millis(300);
    /// `update`.
    pub const UPDATE: StdDuration = StdDuration::from_millis(250);
    /// `delete`.
    pub const DELETE: StdDuration = StdDuration::from_millis(200);
    /// `reorder`.
    pub const REORDER: StdDuration = StdDuration::from_millis(300);
}

/// Per-operation delays of the task service.
pub mod tasks {
    use super::StdDuration;

    /// `get_all`.
    pub const GET_ALL: StdDuration = StdDuration::from_millis(300);
    /// `get_by_id`.
    pub const GET_BY_ID: StdDuration = StdDuration::from_millis(200);
    /// `create`.
    pub const CREATE: StdDuration = StdDuration::from_millis(400);
    /// `update`.
    pub const UPDATE: StdDuration = StdDuration::from_millis(350);
    /// `delete`.
    pub const DELETE: StdDuration = StdDuration::from_millis(250);
    /// `get_by_list_id`.
    pub const BY_LIST: StdDuration = StdDuration::from_millis(300);
    /// `get_by_status`.
    pub const BY_STATUS: StdDuration = StdDuration::from_millis(300);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn simulated_latency_sleeps_for_the_delay() {
        let start = Instant::now();
        Latency::Simulated.pause(tasks::CREATE).await;
        assert!(start.elapsed() >= StdDuration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_latency_does_not_advance_time() {
        let start = Instant::now();
        Latency::Immediate.pause(lists::REORDER).await;
        assert!(start.elapsed() < StdDuration::from_millis(1));
    }

    #[test]
    fn flag_selects_mode() {
        assert_eq!(Latency::from_flag(true), Latency::Simulated);
        assert_eq!(Latency::from_flag(false), Latency::Immediate);
    }
}
