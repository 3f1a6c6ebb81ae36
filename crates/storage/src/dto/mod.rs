pub mod common;
pub mod competition;
pub mod leaderboard;
pub mod submission;
