pub mod leaderboard;
pub mod ranking;
pub mod submissions;
