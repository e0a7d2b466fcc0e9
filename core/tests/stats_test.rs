/// Unit tests for the pure aggregation policies
use ladder_core::client::{CfProblem, CfSubmission};
use ladder_core::tools::native::stats::{
    default_rating_window, filter_candidates, histogram_bucket, performance_rating,
    recent_solved, sample_candidates, solved_problem_keys, solved_rating_bins,
};

fn problem(contest_id: i64, index: &str, rating: Option<i64>) -> CfProblem {
    CfProblem {
        contest_id: Some(contest_id),
        index: index.to_string(),
        name: format!("Problem {contest_id}{index}"),
        rating,
        tags: vec![],
    }
}

fn submission(id: i64, time: i64, verdict: &str, p: CfProblem) -> CfSubmission {
    CfSubmission {
        id,
        creation_time_seconds: time,
        problem: p,
        verdict: Some(verdict.to_string()),
        programming_language: Some("Rust".to_string()),
    }
}

mod dedup {
    use super::*;

    #[test]
    fn repeated_accepted_submissions_count_once() {
        let subs = vec![
            submission(1, 100, "OK", problem(1400, "A", Some(1000))),
            submission(2, 200, "OK", problem(1400, "A", Some(1000))),
            submission(3, 300, "WRONG_ANSWER", problem(1400, "B", Some(1200))),
        ];
        let solved = solved_problem_keys(&subs);
        assert_eq!(solved.len(), 1);
        assert!(solved.contains(&(1400, "A".to_string())));
    }

    #[test]
    fn recent_solved_is_deduped_and_newest_first() {
        let subs = vec![
            submission(1, 100, "OK", problem(1400, "A", Some(1000))),
            submission(2, 500, "OK", problem(1500, "B", Some(1100))),
            submission(3, 900, "OK", problem(1400, "A", Some(1000))),
        ];
        let solved = recent_solved(&subs);
        assert_eq!(solved.len(), 2);
        assert_eq!(solved[0].creation_time_seconds, 900);
        assert_eq!(solved[1].creation_time_seconds, 500);
    }

    #[test]
    fn different_indices_in_one_contest_are_distinct() {
        let subs = vec![
            submission(1, 100, "OK", problem(1400, "A", Some(1000))),
            submission(2, 200, "OK", problem(1400, "B", Some(1000))),
        ];
        assert_eq!(solved_problem_keys(&subs).len(), 2);
    }
}

mod binning {
    use super::*;

    #[test]
    fn bucket_is_floor_of_rating_over_bin_size() {
        assert_eq!(histogram_bucket(1050, 100), 1000);
        assert_eq!(histogram_bucket(1050, 200), 1000);
        assert_eq!(histogram_bucket(999, 100), 900);
        assert_eq!(histogram_bucket(1000, 100), 1000);
    }

    #[test]
    fn bins_count_distinct_rated_solves() {
        let subs = vec![
            submission(1, 100, "OK", problem(1, "A", Some(1050))),
            submission(2, 200, "OK", problem(1, "A", Some(1050))),
            submission(3, 300, "OK", problem(2, "B", Some(1099))),
            submission(4, 400, "OK", problem(3, "C", None)),
            submission(5, 500, "WRONG_ANSWER", problem(4, "D", Some(1000))),
        ];
        let bins = solved_rating_bins(&subs, 100);
        assert_eq!(bins.get(&1000), Some(&2));
        assert_eq!(bins.len(), 1);
    }
}

mod windows {
    use super::*;

    #[test]
    fn default_window_is_the_current_division_band() {
        assert_eq!(default_rating_window(1400), (1400, 1599));
    }
}

mod performance {
    use super::*;

    #[test]
    fn delta_is_amplified_four_times() {
        assert_eq!(performance_rating(1500, 1600), 1900);
        assert_eq!(performance_rating(1500, 1450), 1300);
        assert_eq!(performance_rating(1500, 1500), 1500);
    }
}

mod recommendation {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn window_filter_is_inclusive_and_skips_solved_and_unrated() {
        let problems = vec![
            problem(1, "A", Some(1200)),
            problem(2, "A", Some(1300)),
            problem(3, "A", Some(1400)),
            problem(4, "A", Some(1500)),
            problem(5, "A", None),
        ];
        let solved = HashSet::new();
        let candidates = filter_candidates(&problems, &solved, 1300, 1400);
        assert_eq!(candidates.len(), 2);

        let mut solved = HashSet::new();
        solved.insert((2, "A".to_string()));
        let candidates = filter_candidates(&problems, &solved, 1300, 1400);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].contest_id, Some(3));
    }

    #[test]
    fn sampling_truncates_to_the_requested_count() {
        let problems: Vec<CfProblem> =
            (0..20).map(|i| problem(i, "A", Some(1300))).collect();
        let refs: Vec<&CfProblem> = problems.iter().collect();
        // The draw is intentionally randomized; only the size is stable.
        let picked = sample_candidates(refs, 5);
        assert_eq!(picked.len(), 5);

        let refs: Vec<&CfProblem> = problems.iter().take(3).collect();
        let picked = sample_candidates(refs, 5);
        assert_eq!(picked.len(), 3);
    }
}
