//! Streak calculation over a set of marked calendar days.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use super::calendar::previous_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakStats {
    pub streak: u32,
    pub longest_streak: u32,
}

/// Compute the current streak for `marked_days` as seen on `today`.
///
/// The streak is the run of consecutive days ending at the most recent mark,
/// and only counts while that mark is today or yesterday. `longest_streak`
/// is the previous high-water mark raised to the new streak if needed.
/// The result depends only on the set, so it is safe to rerun after every
/// mutation.
pub fn compute_streak(
    marked_days: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    previous_longest: u32,
) -> StreakStats {
    let streak = current_streak(marked_days, today);
    StreakStats {
        streak,
        longest_streak: previous_longest.max(streak),
    }
}

fn current_streak(marked_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut descending = marked_days.iter().rev();
    let Some(&most_recent) = descending.next() else {
        return 0;
    };

    if most_recent != today && most_recent != previous_day(today) {
        return 0;
    }

    let mut streak = 1;
    let mut cursor = most_recent;
    for &day in descending {
        if day != previous_day(cursor) {
            break;
        }
        streak += 1;
        cursor = day;
    }
    streak
}
