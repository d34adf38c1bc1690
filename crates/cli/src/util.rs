use nugget_resolve::{FieldScore, Schema};
use unicode_width::UnicodeWidthStr;

/// Pad to `width` display columns, cutting with ".." when longer.
/// Uses Unicode display width so Cyrillic/CJK headers stay aligned.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw <= width {
        return format!("{}{}", s, " ".repeat(width - sw));
    }

    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str(&"..".chars().take(width - used).collect::<String>());
    out
}

const FIELD_WIDTH: usize = 24;

/// Human-readable score table. Selected keys are marked `*`, reserved
/// fields `-`.
pub(crate) fn render_score_table(scores: &[FieldScore], keys: &[String], schema: &Schema) -> String {
    let mut out = format!(
        "  {} {:>9} {:>9} {:>9}\n",
        pad_right("field", FIELD_WIDTH),
        "coverage",
        "distinct",
        "score"
    );
    for s in scores {
        let mark = if keys.contains(&s.field) {
            '*'
        } else if schema.is_reserved(&s.field) {
            '-'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{mark} {} {:>8.2}% {:>8.2}% {:>9.2}\n",
            pad_right(&s.field, FIELD_WIDTH),
            s.coverage,
            s.distinctiveness,
            s.combined
        ));
    }
    out
}
