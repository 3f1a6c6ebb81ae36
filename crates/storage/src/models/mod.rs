pub mod competition;
pub mod division;
pub mod leaderboard;
pub mod score;
pub mod submission;
pub mod wod;

pub use competition::Competition;
pub use division::Division;
pub use leaderboard::{EventResult, LeaderboardRow};
pub use score::{MetricConfig, MetricKind, ScoreValue, Scores, SortOrder};
pub use submission::Submission;
pub use wod::Wod;
