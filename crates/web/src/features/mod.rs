pub mod competitions;
pub mod leaderboard;
pub mod submissions;
