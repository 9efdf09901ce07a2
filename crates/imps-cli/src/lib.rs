//! IMPS CLI - offline mission planning from the command line.
//!
//! The `imps-plan` binary loads a scenario (or the default mission), applies
//! command-line overrides, plans both legs and prints the steer-point table.

pub mod overrides;
pub mod report;

pub use overrides::MissionOverrides;
pub use report::{leg_summary, steer_point_table};
