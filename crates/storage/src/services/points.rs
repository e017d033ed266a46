//! Ascent pricing.
//!
//! An ascent is worth `100 + 25 * delta` points, where `delta` is how far the
//! climb's absolute grade sits above the climber's working grade at send time.
//! Flashes earn a 20% bonus, rounded down. Climbs more than three grades below
//! the working grade score nothing. Positive deltas are not capped.

/// Points for a climb at exactly the working grade.
pub const BASE_POINTS: i64 = 100;

/// Points gained (or lost) per grade of difference.
pub const POINTS_PER_GRADE: i64 = 25;

/// The lowest delta that still scores.
pub const MIN_SCORING_DELTA: i64 = -3;

/// Flash multiplier as an exact fraction: 6/5 = 1.2.
const FLASH_NUMERATOR: i64 = 6;
const FLASH_DENOMINATOR: i64 = 5;

/// Price an ascent.
///
/// `working_grade_when_sent` must be the tier snapshot stored on the ascent,
/// never the climber's current tier.
///
/// # Examples
///
/// ```
/// use storage::services::points::compute_points;
///
/// assert_eq!(compute_points(7, 8, true), 150);
/// assert_eq!(compute_points(7, 4, false), 25);
/// assert_eq!(compute_points(7, 3, true), 0);
/// ```
pub fn compute_points(working_grade_when_sent: i32, absolute_grade: i32, is_flash: bool) -> i64 {
    let delta = i64::from(absolute_grade) - i64::from(working_grade_when_sent);
    if delta < MIN_SCORING_DELTA {
        return 0;
    }

    let base = BASE_POINTS + POINTS_PER_GRADE * delta;
    if is_flash {
        // base >= 25 here, so integer division is the floor
        base * FLASH_NUMERATOR / FLASH_DENOMINATOR
    } else {
        base
    }
}
