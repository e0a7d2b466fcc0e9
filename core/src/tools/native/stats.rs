//! Pure policy helpers behind the Codeforces tools: solved-set
//! deduplication, rating windows, histogram binning, performance
//! estimation, and the recommendation candidate filter.

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;

use crate::client::{CfProblem, CfSubmission};

/// The accepted verdict; only these submissions count as solves.
pub const ACCEPTED: &str = "OK";

/// Identity key for a problem: (contest id, problem index).
pub fn problem_key(problem: &CfProblem) -> (i64, String) {
    (problem.contest_id.unwrap_or(0), problem.index.clone())
}

/// Distinct accepted problems in a submission list. A problem counts
/// once no matter how many accepted submissions it has.
pub fn solved_problem_keys(submissions: &[CfSubmission]) -> HashSet<(i64, String)> {
    submissions
        .iter()
        .filter(|s| s.verdict.as_deref() == Some(ACCEPTED))
        .map(|s| problem_key(&s.problem))
        .collect()
}

/// Deduped accepted submissions, newest first. The first (most recent)
/// accepted submission represents each problem.
pub fn recent_solved(submissions: &[CfSubmission]) -> Vec<&CfSubmission> {
    let mut sorted: Vec<&CfSubmission> = submissions
        .iter()
        .filter(|s| s.verdict.as_deref() == Some(ACCEPTED))
        .collect();
    sorted.sort_by(|a, b| b.creation_time_seconds.cmp(&a.creation_time_seconds));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|s| seen.insert(problem_key(&s.problem)))
        .collect()
}

/// Default recommendation window: the caller's current division band.
pub fn default_rating_window(current_rating: i64) -> (i64, i64) {
    (current_rating, current_rating + 199)
}

/// Histogram bucket for a rating at the given bin size.
pub fn histogram_bucket(rating: i64, bin_size: i64) -> i64 {
    (rating / bin_size) * bin_size
}

/// Estimated contest performance from a rating change: the delta
/// amplified by a fixed factor of four on top of the old rating.
pub fn performance_rating(old_rating: i64, new_rating: i64) -> i64 {
    old_rating + 4 * (new_rating - old_rating)
}

/// Bucketed counts of distinct solved rated problems.
pub fn solved_rating_bins(submissions: &[CfSubmission], bin_size: i64) -> BTreeMap<i64, usize> {
    let mut bins = BTreeMap::new();
    let mut seen = HashSet::new();
    for sub in submissions {
        if sub.verdict.as_deref() != Some(ACCEPTED) {
            continue;
        }
        let Some(rating) = sub.problem.rating else {
            continue;
        };
        if seen.insert(problem_key(&sub.problem)) {
            *bins.entry(histogram_bucket(rating, bin_size)).or_insert(0) += 1;
        }
    }
    bins
}

/// Recommendation candidates: unsolved, rated, inside the inclusive
/// window.
pub fn filter_candidates<'a>(
    problems: &'a [CfProblem],
    solved: &HashSet<(i64, String)>,
    min_rating: i64,
    max_rating: i64,
) -> Vec<&'a CfProblem> {
    problems
        .iter()
        .filter(|p| match p.rating {
            Some(r) => {
                r >= min_rating && r <= max_rating && !solved.contains(&problem_key(p))
            }
            None => false,
        })
        .collect()
}

/// Uniform sample of candidates: shuffle, then truncate. Repeated
/// calls are expected to surface different problems.
pub fn sample_candidates<'a>(
    mut candidates: Vec<&'a CfProblem>,
    count: usize,
) -> Vec<&'a CfProblem> {
    candidates.shuffle(&mut rand::thread_rng());
    candidates.truncate(count);
    candidates
}

pub fn problem_url(problem: &CfProblem) -> String {
    format!(
        "https://codeforces.com/problemset/problem/{}/{}",
        problem.contest_id.unwrap_or(0),
        problem.index
    )
}

pub fn profile_url(handle: &str) -> String {
    format!(
        "https://codeforces.com/profile/{}",
        urlencoding::encode(handle)
    )
}

pub fn contest_url(contest_id: i64) -> String {
    format!("https://codeforces.com/contest/{contest_id}")
}
