//! Course progress arithmetic.

/// Percentage reached when every lesson is complete.
pub const COMPLETE_PERCENTAGE: i32 = 100;

/// Integer completion percentage, truncated toward zero.
///
/// A course with no lessons reports `None` so callers can leave the stored
/// percentage untouched.
pub fn completion_percentage(completed: i64, total: i64) -> Option<i32> {
    if total <= 0 {
        return None;
    }
    let completed = completed.clamp(0, total);
    Some(((completed * 100) / total) as i32)
}

/// Whether a stored percentage counts as a finished course.
pub fn is_complete(percentage: i32) -> bool {
    percentage >= COMPLETE_PERCENTAGE
}
