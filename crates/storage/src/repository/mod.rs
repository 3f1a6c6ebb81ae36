pub mod competition;
pub mod leaderboard;
pub mod submission;

pub use competition::CompetitionRepository;
pub use leaderboard::{LeaderboardRepository, PgRankingStore};
pub use submission::SubmissionRepository;
