pub mod ascent;
pub mod ballot;
pub mod candidate;
pub mod climber;
