//! User-facing message text. Pure functions, no I/O.

use crate::{errors::Error, store::WalkStats, Result};

const NEVER_WALKED: &str = "Nunca fui passear... 🥺";
const NO_WALKS: &str = "Nao ha passeios";

/// Reminder text for `elapsed_hours` without a walk.
///
/// `f64::INFINITY` means no walk was ever recorded. Anything under one minute
/// (or negative/NaN) has nothing to report and is rejected.
pub fn format_needs_walk(elapsed_hours: f64) -> Result<String> {
    if elapsed_hours == f64::INFINITY {
        return Ok(NEVER_WALKED.to_string());
    }
    if !elapsed_hours.is_finite() || elapsed_hours < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "elapsed hours must be finite and non-negative, got {elapsed_hours}"
        )));
    }

    // Whole minutes first; the epsilon keeps 7h31m from landing on 30.999...
    let total_minutes = (elapsed_hours * 60.0 + 1e-9).floor() as u64;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);

    match (hours, minutes) {
        (0, 0) => Err(Error::InvalidArgument(format!(
            "nothing to report for {elapsed_hours} hours"
        ))),
        (0, m) => Ok(format!("Nao vou passear ha {m} minutos... 🥺")),
        (h, 0) => Ok(format!("Nao vou passear ha {h} horas... 🥺")),
        (h, m) => Ok(format!("Nao vou passear ha {h} horas e {m} minutos... 🥺")),
    }
}

pub fn format_walk_confirmation(display_name: &str) -> String {
    format!("O {display_name} foi-me passear 🐕")
}

pub fn format_statistics(rows: &[WalkStats]) -> String {
    if rows.is_empty() {
        return NO_WALKS.to_string();
    }

    rows.iter()
        .map(|r| {
            format!(
                "{} - {} passeios ({}%)",
                r.display_name, r.count, r.percentage
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `text` into pieces of at most `max_len` chars, breaking between lines
/// where possible. A single line longer than `max_len` is cut mid-line.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let sep = usize::from(!cur.is_empty());
        if cur_len + sep + line_len <= max_len {
            if sep == 1 {
                cur.push('\n');
            }
            cur.push_str(line);
            cur_len += sep + line_len;
            continue;
        }

        if !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        let mut chars = line.chars().peekable();
        while chars.peek().is_some() {
            let piece: String = chars.by_ref().take(max_len).collect();
            cur_len = piece.chars().count();
            if cur_len == max_len && chars.peek().is_some() {
                out.push(piece);
                cur_len = 0;
            } else {
                cur = piece;
            }
        }
    }
    if !cur.is_empty() || out.is_empty() {
        out.push(cur);
    }
    out
}

/// Shown when recording a walk failed, so nobody believes it was saved.
pub fn format_walk_failed(display_name: &str) -> String {
    format!("Nao consegui registar o passeio do {display_name}, tenta outra vez 🙁")
}

pub fn format_help(ask_enabled: bool) -> String {
    let mut lines = vec![
        "🐕 Toby".to_string(),
        String::new(),
        "/walk - Registar um passeio".to_string(),
        "/stats - Quem me leva mais a passear".to_string(),
    ];
    if ask_enabled {
        lines.push("/ask - Ha quanto tempo nao vou passear".to_string());
    }
    lines.push("/help - Mostrar esta mensagem".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WalkerId;

    #[test]
    fn never_walked() {
        assert_eq!(format_needs_walk(f64::INFINITY).unwrap(), NEVER_WALKED);
    }

    #[test]
    fn hours_and_minutes() {
        let msg = format_needs_walk(2.5).unwrap();
        assert_eq!(msg, "Nao vou passear ha 2 horas e 30 minutos... 🥺");
    }

    #[test]
    fn hours_only() {
        let msg = format_needs_walk(2.0).unwrap();
        assert_eq!(msg, "Nao vou passear ha 2 horas... 🥺");
        assert!(!msg.contains("minutos"));
    }

    #[test]
    fn minutes_only() {
        assert_eq!(
            format_needs_walk(0.25).unwrap(),
            "Nao vou passear ha 15 minutos... 🥺"
        );
    }

    #[test]
    fn minutes_are_truncated_not_rounded() {
        // 6h59.94m
        let msg = format_needs_walk(6.999).unwrap();
        assert_eq!(msg, "Nao vou passear ha 6 horas e 59 minutos... 🥺");
    }

    #[test]
    fn exact_minutes_are_not_lost_to_rounding() {
        assert_eq!(
            format_needs_walk(7.0 + 31.0 / 60.0).unwrap(),
            "Nao vou passear ha 7 horas e 31 minutos... 🥺"
        );
        assert_eq!(
            format_needs_walk(3.0 + 29.0 / 60.0).unwrap(),
            "Nao vou passear ha 3 horas e 29 minutos... 🥺"
        );
        // As produced by the store: elapsed milliseconds over ms per hour.
        assert_eq!(
            format_needs_walk(27_060_000.0 / 3_600_000.0).unwrap(),
            "Nao vou passear ha 7 horas e 31 minutos... 🥺"
        );
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        for v in [0.0, 0.01, -1.0, f64::NEG_INFINITY, f64::NAN] {
            assert!(
                matches!(format_needs_walk(v), Err(Error::InvalidArgument(_))),
                "{v}"
            );
        }
    }

    #[test]
    fn walk_confirmation() {
        assert_eq!(format_walk_confirmation("Rui"), "O Rui foi-me passear 🐕");
    }

    #[test]
    fn statistics_lines() {
        let rows = vec![
            WalkStats {
                walker_id: WalkerId::from("a"),
                display_name: "Ana".to_string(),
                count: 2,
                percentage: 66,
            },
            WalkStats {
                walker_id: WalkerId::from("b"),
                display_name: "Bruno".to_string(),
                count: 1,
                percentage: 33,
            },
        ];
        assert_eq!(
            format_statistics(&rows),
            "Ana - 2 passeios (66%)\nBruno - 1 passeios (33%)"
        );
    }

    #[test]
    fn statistics_empty() {
        assert_eq!(format_statistics(&[]), NO_WALKS);
    }

    #[test]
    fn short_message_is_one_chunk() {
        assert_eq!(split_message("a\nb", 10), vec!["a\nb".to_string()]);
        assert_eq!(split_message("", 10), vec![String::new()]);
    }

    #[test]
    fn split_breaks_between_lines() {
        let text = "Ana - 2 passeios (66%)\nBruno - 1 passeios (33%)";
        let chunks = split_message(text, 25);
        assert_eq!(
            chunks,
            vec![
                "Ana - 2 passeios (66%)".to_string(),
                "Bruno - 1 passeios (33%)".to_string()
            ]
        );
    }

    #[test]
    fn split_cuts_overlong_lines_by_chars() {
        let chunks = split_message("ããããã\nb", 2);
        assert_eq!(chunks, vec!["ãã", "ãã", "ã", "b"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 2));
    }

    #[test]
    fn help_lists_ask_only_when_enabled() {
        assert!(format_help(true).contains("/ask"));
        assert!(!format_help(false).contains("/ask"));
        assert!(format_help(false).contains("/walk"));
    }
}
