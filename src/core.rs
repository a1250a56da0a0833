pub mod cycle;
pub mod leaderboard;
pub mod ranking;
