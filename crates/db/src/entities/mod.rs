//! `SeaORM` entity definitions.

pub mod activity_logs;
pub mod breakdowns;
pub mod cx_sessions;
pub mod denominations;
pub mod float_stacks;
pub mod float_transfers;
pub mod organizations;
pub mod repositories;
pub mod repository_access_logs;
pub mod session_members;
pub mod users;
