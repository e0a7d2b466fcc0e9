//! Deterministic text formatting helpers: stable field order upstream,
//! consistent date and duration rendering here.

use chrono::{DateTime, Utc};

/// "Member since" style month-year stamp from a unix timestamp.
pub fn format_member_since(secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%b %Y").to_string(),
        None => "unknown".to_string(),
    }
}

/// Plain date stamp from a unix timestamp.
pub fn format_date(secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "unknown".to_string(),
    }
}

/// Contest start stamp, e.g. "Sat, Aug 08 @ 14:35 UTC".
pub fn format_contest_start(start: &DateTime<Utc>) -> String {
    start.format("%a, %b %d @ %H:%M UTC").to_string()
}

/// Duration in whole units, largest first: "2h 30m", "1d 2h", "45m".
pub fn format_duration(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Converts upstream HTML problem statements to chat-friendly plain text.
///
/// Bold becomes `*..*`, italics `_.._`, inline code backticks, and
/// `<pre>` blocks fenced; every other tag is dropped, entities are
/// unescaped, and runs of blank lines collapse to one.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '<' => {
                let rest = &html[i + 1..];
                let Some(end) = rest.find('>') else {
                    out.push(c);
                    continue;
                };
                let tag = rest[..end].trim().to_lowercase();
                // Skip past the tag body including the closing '>'.
                while let Some(&(j, _)) = chars.peek() {
                    if j > i + 1 + end {
                        break;
                    }
                    chars.next();
                }
                push_tag_marker(&mut out, &tag);
            }
            '&' => {
                let rest = &html[i..];
                if let Some((entity, len)) = parse_entity(rest) {
                    out.push_str(entity);
                    // Skip past the entity body.
                    for _ in 1..len {
                        chars.next();
                    }
                } else {
                    out.push('&');
                }
            }
            _ => out.push(c),
        }
    }

    collapse_blank_runs(&out)
}

fn push_tag_marker(out: &mut String, tag: &str) {
    match tag {
        "strong" | "b" | "/strong" | "/b" => out.push('*'),
        "em" | "i" | "/em" | "/i" => out.push('_'),
        "code" | "/code" => out.push('`'),
        "pre" => out.push_str("\n```\n"),
        "/pre" => out.push_str("\n```\n"),
        "p" | "/p" | "br" | "br/" | "br /" => out.push('\n'),
        "li" => out.push_str("\n- "),
        "/li" | "/ul" | "/ol" => out.push('\n'),
        "sup" => out.push('^'),
        _ => {}
    }
}

fn parse_entity(rest: &str) -> Option<(&'static str, usize)> {
    const ENTITIES: &[(&str, &str)] = &[
        ("&nbsp;", " "),
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&le;", "<="),
        ("&ge;", ">="),
        ("&ndash;", "-"),
        ("&mdash;", "-"),
    ];
    for (name, replacement) in ENTITIES {
        if rest.starts_with(name) {
            return Some((replacement, name.len()));
        }
    }
    None
}

fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out.trim().to_string()
}
