mod ascent;
mod ballot;
mod candidate;
mod climber;
mod subject;

pub use ascent::{Ascent, NewAscent};
pub use ballot::{BallotEntry, BallotFilter};
pub use candidate::{Candidate, NewCandidate};
pub use climber::{Climber, NewClimber};
pub use subject::{Subject, SubjectKind};
