mod code;
mod confirm;
mod session;
mod ticker;

pub use code::{CodeGenerator, RedemptionCode, CODE_MAX, CODE_MIN};
pub use confirm::{ConfirmDialog, Decision, PendingConfirmation};
pub use session::{
    ActiveSession, LostFeedback, RedemptionState, SessionId, TickOutcome, TimerSession,
    DEFAULT_SESSION_LENGTH_SECS,
};
pub use ticker::{TickTask, Ticker, DEFAULT_TICK_INTERVAL};

/// Countdown text, `M:SS`.
pub fn format_timer(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_timer(65), "1:05");
        assert_eq!(format_timer(9), "0:09");
        assert_eq!(format_timer(0), "0:00");
        assert_eq!(format_timer(600), "10:00");
    }
}
