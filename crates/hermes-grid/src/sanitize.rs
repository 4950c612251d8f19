//! Numeric cell formatting.
//!
//! Cells accept only an optional leading minus, digits and a single decimal
//! point. Sanitization reformats and never rejects.

/// Strip everything except digits, one leading `-` and the first `.`.
pub fn sanitize_numeric(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut seen_dot = false;

    for ch in input.chars().filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.') {
        match ch {
            // Only a minus that is the first kept character survives
            '-' => {
                if out.is_empty() {
                    out.push('-');
                }
            }
            '.' => {
                if !seen_dot {
                    seen_dot = true;
                    out.push('.');
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Trim and collapse incomplete numbers (`-`, `.`, `-.`) to empty.
pub fn finalize_numeric(input: &str) -> String {
    match input.trim() {
        "" | "-" | "." | "-." => String::new(),
        t => t.to_string(),
    }
}

/// Value to store when an edit of `original` ends with `input`.
///
/// An untouched cell keeps its original text, numeric or not.
pub fn commit_value(original: &str, input: &str) -> String {
    if input == original {
        original.to_string()
    } else {
        finalize_numeric(&sanitize_numeric(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_numeric_shape() {
        assert_eq!(sanitize_numeric("12.5"), "12.5");
        assert_eq!(sanitize_numeric("-3.14"), "-3.14");
        assert_eq!(sanitize_numeric("abc"), "");
        assert_eq!(sanitize_numeric("1e-5"), "15");
        assert_eq!(sanitize_numeric("--1"), "-1");
        assert_eq!(sanitize_numeric("1.2.3"), "1.23");
        assert_eq!(sanitize_numeric(" -.5x"), "-.5");
        assert_eq!(sanitize_numeric("4-2"), "42");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for s in ["", "-", "..-1.2-3", "x-9.9.9", "٣.1", "-.-.", "12,345.67"] {
            let once = sanitize_numeric(s);
            assert_eq!(sanitize_numeric(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn test_finalize_partials() {
        for s in ["", "-", ".", "-.", "  ", " - "] {
            assert_eq!(finalize_numeric(s), "", "input {s:?}");
        }
        assert_eq!(finalize_numeric(" 4.2 "), "4.2");
        assert_eq!(finalize_numeric("-0."), "-0.");
    }

    #[test]
    fn test_commit_keeps_untouched_original() {
        assert_eq!(commit_value("CONFIRMED", "CONFIRMED"), "CONFIRMED");
        assert_eq!(commit_value("CONFIRMED", "CONFIRMEDx"), "");
        assert_eq!(commit_value("1", "1.5"), "1.5");
        assert_eq!(commit_value("1", "-"), "");
    }
}
