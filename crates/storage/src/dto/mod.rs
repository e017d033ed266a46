pub mod ascent;
pub mod climber;
pub mod voting;
