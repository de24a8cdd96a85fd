//! Filesystem-safe naming helpers.

/// Sanitizes a case identifier into a single path component.
///
/// Case identifiers may contain path separators (e.g. when discovered
/// from nested directories); scratch directories need one flat,
/// collision-free component per case.
#[must_use]
pub fn sanitize_component(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_id_unchanged() {
        assert_eq!(sanitize_component("case-01.sy"), "case-01.sy");
    }

    #[test]
    fn test_separators_replaced() {
        assert_eq!(sanitize_component("functional/01_add"), "functional_01_add");
        assert_eq!(sanitize_component("a b\\c"), "a_b_c");
    }
}
