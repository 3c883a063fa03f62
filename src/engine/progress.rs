use crate::models::group::{Direction, Group};

/// Rank for a group missing any of start time, direction, or current
/// location.
pub const NOT_STARTED: i64 = -1;

/// Rank for a group flagged complete but not yet clocked out.
pub fn race_completed_rank(number_locations: u32) -> i64 {
    number_locations as i64 + 1
}

/// Rank for a group with a recorded end time. Supersedes the
/// race-completed flag.
pub fn finished_rank(number_locations: u32) -> i64 {
    number_locations as i64 + 2
}

/// First checkpoint index for a route. The `*0` routes skip index zero:
/// A0 starts at checkpoint 1 and B0 starts at the far end of the course.
pub fn start_index(direction: Direction, number_locations: u32) -> u32 {
    match direction {
        Direction::A0 => 1,
        Direction::B0 => number_locations,
        _ => 0,
    }
}

/// Scalar race progress for a group: NOT_STARTED, a cleared-checkpoint
/// count in `0..=number_locations`, or one of the two terminal ranks.
///
/// The checkpoint count is the signed offset from the route's start
/// index (negated for reverse routes), wrapped into range with Euclidean
/// modulo so reverse routes past the course midpoint stay monotone.
pub fn compute_progress(group: &Group, number_locations: u32) -> i64 {
    let (Some(_), Some(direction), Some(current)) =
        (group.start_time, group.direction, group.current_location)
    else {
        return NOT_STARTED;
    };

    if group.end_time.is_some() {
        return finished_rank(number_locations);
    }
    if group.race_completed {
        return race_completed_rank(number_locations);
    }

    let sign: i64 = if direction.is_reverse() { -1 } else { 1 };
    let offset = current as i64 - start_index(direction, number_locations) as i64;
    (offset * sign).rem_euclid(number_locations as i64 + 1)
}

/// Display string for a group's progress, as shown on the leaderboard.
pub fn format_progress(group: &Group, number_locations: u32) -> String {
    let progress = compute_progress(group, number_locations);
    if progress == NOT_STARTED {
        return "Have not started".to_string();
    }

    let extras = format!(
        "({} skips, {} bonus)",
        group.challenges_skipped, group.bonus_completed
    );
    if progress > number_locations as i64 {
        format!("Finished race {extras}")
    } else {
        format!("{progress} locations finished {extras}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{
        compute_progress, finished_rank, format_progress, race_completed_rank, NOT_STARTED,
    };
    use crate::models::group::{Direction, Group};

    const ROUTE: u32 = 8;

    fn group(direction: Option<Direction>, current: Option<u32>, started: bool) -> Group {
        Group {
            id: "1".to_string(),
            name: "test-group".to_string(),
            current_location: current,
            direction,
            race_completed: false,
            start_time: started.then(Utc::now),
            end_time: None,
            challenges_skipped: 0,
            bonus_completed: 0,
        }
    }

    #[test]
    fn missing_any_required_field_means_not_started() {
        let no_start = group(Some(Direction::A1), Some(3), false);
        let no_direction = group(None, Some(3), true);
        let no_location = group(Some(Direction::A1), None, true);

        assert_eq!(compute_progress(&no_start, ROUTE), NOT_STARTED);
        assert_eq!(compute_progress(&no_direction, ROUTE), NOT_STARTED);
        assert_eq!(compute_progress(&no_location, ROUTE), NOT_STARTED);
    }

    #[test]
    fn a0_at_its_start_index_has_zero_progress() {
        let g = group(Some(Direction::A0), Some(1), true);
        assert_eq!(compute_progress(&g, ROUTE), 0);
    }

    #[test]
    fn b0_at_its_start_index_has_zero_progress() {
        let g = group(Some(Direction::B0), Some(ROUTE), true);
        assert_eq!(compute_progress(&g, ROUTE), 0);
    }

    #[test]
    fn forward_route_counts_up_from_start() {
        let g = group(Some(Direction::A1), Some(5), true);
        assert_eq!(compute_progress(&g, ROUTE), 5);
    }

    #[test]
    fn reverse_routes_wrap_into_range() {
        // One checkpoint past the start for B0 is location N-1.
        let g = group(Some(Direction::B0), Some(ROUTE - 1), true);
        assert_eq!(compute_progress(&g, ROUTE), 1);

        // Reverse route past the course midpoint stays in 0..=N.
        let g = group(Some(Direction::B1), Some(2), true);
        assert_eq!(compute_progress(&g, ROUTE), ROUTE as i64 - 1);
    }

    #[test]
    fn race_completed_is_distinct_from_finished() {
        let mut g = group(Some(Direction::A1), Some(3), true);
        g.race_completed = true;
        assert_eq!(compute_progress(&g, ROUTE), race_completed_rank(ROUTE));

        g.end_time = Some(Utc::now());
        assert_eq!(compute_progress(&g, ROUTE), finished_rank(ROUTE));
        assert_ne!(race_completed_rank(ROUTE), finished_rank(ROUTE));
    }

    #[test]
    fn end_time_supersedes_race_completed_flag() {
        let mut g = group(Some(Direction::A1), Some(3), true);
        g.end_time = Some(Utc::now());
        assert_eq!(compute_progress(&g, ROUTE), finished_rank(ROUTE));
    }

    #[test]
    fn format_covers_all_states() {
        let unstarted = group(None, None, false);
        assert_eq!(format_progress(&unstarted, ROUTE), "Have not started");

        let mut running = group(Some(Direction::A1), Some(4), true);
        running.challenges_skipped = 2;
        running.bonus_completed = 1;
        assert_eq!(
            format_progress(&running, ROUTE),
            "4 locations finished (2 skips, 1 bonus)"
        );

        running.race_completed = true;
        assert_eq!(
            format_progress(&running, ROUTE),
            "Finished race (2 skips, 1 bonus)"
        );
    }
}
