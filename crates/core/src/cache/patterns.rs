//! Glob matching for cache keys.
//!
//! Only `*` is special; it matches any run of characters, including none.

/// Checks if `key` matches the glob `pattern`.
///
/// # Examples
///
/// ```
/// use clinica_core::cache::pattern_matches;
///
/// assert!(pattern_matches("consultas_*", "consultas_completas:limit=50"));
/// assert!(pattern_matches("*:limit=50", "consultas_completas:limit=50"));
/// assert!(!pattern_matches("consultas_*", "pacientes_todos"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let mut parts = pattern.split('*');

    // split always yields at least one item
    let head = parts.next().unwrap_or_default();
    let Some(mut rest) = key.strip_prefix(head) else {
        return false;
    };

    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all: exact match
        return rest.is_empty();
    };

    for segment in middle {
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(pattern_matches("hoy_ingresos", "hoy_ingresos"));
        assert!(!pattern_matches("hoy_ingresos", "hoy_ingresos:extra"));
        assert!(!pattern_matches("hoy_ingresos", "hoy"));
    }

    #[test]
    fn test_group_prefix() {
        assert!(pattern_matches("consultas_*", "consultas_completas:limit=50"));
        assert!(pattern_matches("consultas_*", "consultas_"));
        assert!(!pattern_matches("consultas_*", "consultas"));
        assert!(!pattern_matches("consultas_*", "pacientes_consultas_x"));
    }

    #[test]
    fn test_suffix() {
        assert!(pattern_matches("*:limit=50", "consultas_completas:limit=50"));
        assert!(!pattern_matches("*:limit=50", "consultas_completas:limit=10"));
    }

    #[test]
    fn test_middle_wildcards() {
        assert!(pattern_matches(
            "gastos_*:desde=*:hasta=*",
            "gastos_rango:desde=2024-01-01:hasta=2024-01-31"
        ));
        assert!(!pattern_matches("gastos_*:desde=*", "gastos_rango:hasta=2024"));
    }

    #[test]
    fn test_prefix_and_suffix_do_not_overlap() {
        assert!(!pattern_matches("ab*b", "ab"));
        assert!(pattern_matches("ab*b", "abb"));
    }

    #[test]
    fn test_wildcard_only_and_empty() {
        assert!(pattern_matches("*", ""));
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("**", "anything"));
        assert!(pattern_matches("", ""));
        assert!(!pattern_matches("", "x"));
    }
}
