pub mod ascents;
pub mod climbers;
pub mod points;
pub mod ranked_choice;
pub mod working_grade;
