pub mod ascents;
pub mod climbers;
pub mod leaderboard;
pub mod voting;
