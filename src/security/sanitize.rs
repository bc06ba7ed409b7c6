//! Free-text cleanup applied before anything is validated or stored

use regex::Regex;
use std::sync::LazyLock;

static ANGLE_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<>]").expect("invalid angle bracket pattern"));

static SCRIPT_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("invalid script scheme pattern"));

/// `on<word>=` with an ASCII word, as in `onclick=`
static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on[[:word:]]+=").expect("invalid event handler pattern"));

/// Strip markup-looking content from visitor input.
///
/// Removes `<` and `>`, every `javascript:` (any case), every event handler
/// attribute such as `onclick=` (any case), then trims surrounding
/// whitespace. Each rule is a single left-to-right pass over the output of
/// the previous one.
pub fn sanitize_input(input: &str) -> String {
    let s = ANGLE_BRACKETS.replace_all(input, "");
    let s = SCRIPT_SCHEME.replace_all(&s, "");
    let s = EVENT_HANDLER.replace_all(&s, "");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_only_trimmed() {
        assert_eq!(sanitize_input("  Marie-Hélène O'Neil "), "Marie-Hélène O'Neil");
    }

    #[test]
    fn test_angle_brackets_removed() {
        assert_eq!(sanitize_input("<b>Belle</b> robe"), "bBelle/b robe");
    }

    #[test]
    fn test_script_scheme_removed_any_case() {
        assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_input("a javascript:javascript:b"), "a b");
    }

    #[test]
    fn test_event_handlers_removed() {
        assert_eq!(
            sanitize_input("<img src=x onerror=alert(1)>"),
            "img src=x alert(1)"
        );
        assert_eq!(sanitize_input("ONMOUSEOVER=x"), "x");
        // Needs at least one word character between "on" and "=".
        assert_eq!(sanitize_input("on="), "on=");
        assert_eq!(sanitize_input("one two"), "one two");
    }

    #[test]
    fn test_rules_apply_in_order() {
        // Bracket removal can assemble a scheme that the next rule strips.
        assert_eq!(sanitize_input("java<script:x"), "x");
        assert_eq!(sanitize_input("on<load=1"), "1");
        assert_eq!(sanitize_input("éonclick=é"), "éé");
    }

    #[test]
    fn test_result_is_trimmed_after_removal() {
        assert_eq!(sanitize_input("  <  >  "), "");
    }
}
