use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '…';

/// Terminal columns taken by a string, counted per grapheme cluster
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(UnicodeWidthStr::width).sum()
}

/// Cut a string to at most `max_cols` columns, ending in an ellipsis when
/// anything was dropped. Grapheme clusters are never split.
pub fn truncate_to_width(s: &str, max_cols: usize) -> String {
    if display_width(s) <= max_cols {
        return s.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }

    let budget = max_cols - 1;
    let mut used = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if used + w > budget {
            break;
        }
        result.push_str(grapheme);
        used += w;
    }
    result.push(ELLIPSIS);
    result
}

/// Left-align `s` in a column of `width`, truncating if it does not fit
pub fn pad_to_width(s: &str, width: usize) -> String {
    let current = display_width(s);
    if current > width {
        return truncate_to_width(s, width);
    }
    format!("{}{}", s, " ".repeat(width - current))
}
