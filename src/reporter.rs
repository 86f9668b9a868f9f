use crate::types::{FailureReport, LeaderboardReport};

/// Emit the leaderboard as pretty-printed JSON to stdout.
pub fn report_leaderboard(report: &LeaderboardReport) {
    if let Ok(json) = serde_json::to_string_pretty(report) {
        println!("{json}");
    }
}

/// Emit a failure as a single JSON line to stdout.
pub fn report_failure(message: &str) {
    let failure = FailureReport {
        success: false,
        message: message.to_string(),
    };
    if let Ok(json) = serde_json::to_string(&failure) {
        println!("{json}");
    }
}
