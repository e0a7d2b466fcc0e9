//! Presentation layer: deterministic text formatting and SVG image
//! production. Purely presentational; no upstream calls happen here.

pub mod svg;
pub mod text;

/// Codeforces rank names mapped to their display colors, shared by text
/// and image renderers.
pub fn rank_color(rank: &str) -> &'static str {
    match rank.to_lowercase().as_str() {
        "newbie" => "#808080",
        "pupil" => "#008000",
        "specialist" => "#03a89e",
        "expert" => "#0000ff",
        "candidate master" => "#aa00aa",
        "master" | "international master" => "#ff8c00",
        "grandmaster" | "international grandmaster" | "legendary grandmaster" => "#ff0000",
        _ => "#808080",
    }
}
