// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric names and descriptions.

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

pub const ADMISSIONS_TOTAL: &str = "gatehouse_admissions_total";
pub const LIMITER_FAULTS_TOTAL: &str = "gatehouse_limiter_faults_total";
pub const TURNS_APPENDED_TOTAL: &str = "gatehouse_turns_appended_total";
pub const TRACKED_ACTORS: &str = "gatehouse_tracked_actors";
pub const STORED_TURNS: &str = "gatehouse_stored_turns";
pub const GENERATION_SECONDS: &str = "gatehouse_generation_seconds";

/// Registers descriptions for every Gatehouse metric.
///
/// Called once after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        ADMISSIONS_TOTAL,
        "Admission decisions by category and outcome"
    );
    describe_counter!(
        LIMITER_FAULTS_TOTAL,
        "Admission checks resolved by the failure policy"
    );
    describe_counter!(TURNS_APPENDED_TOTAL, "Conversation turns recorded by role");
    describe_gauge!(
        TRACKED_ACTORS,
        "Actors holding state after the last sweep, by component"
    );
    describe_gauge!(STORED_TURNS, "Turns held by the context store after the last sweep");
    describe_histogram!(
        GENERATION_SECONDS,
        Unit::Seconds,
        "Time spent in the text generator per admitted request"
    );
}
