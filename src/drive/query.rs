//! Drive search filter construction
//!
//! Builds the `q` expression for `files.list` from typed parts. Caller-supplied
//! values are escaped before they enter the expression, so a timestamp string
//! can never terminate its quoting and smuggle extra filter clauses.

/// Builder for a Drive `files.list` filter expression
#[derive(Debug, Default)]
pub struct FileQuery {
    clauses: Vec<String>,
}

impl FileQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict results to MIME types starting with `prefix` (e.g. "image/")
    #[must_use]
    pub fn mime_type_prefix(mut self, prefix: &str) -> Self {
        self.clauses
            .push(format!("(mimeType contains '{}')", escape(prefix)));
        self
    }

    /// Restrict results to files modified in `[from, to)`
    #[must_use]
    pub fn modified_between(mut self, from: &str, to: &str) -> Self {
        self.clauses.push(format!(
            "(modifiedTime >= '{}' and modifiedTime < '{}')",
            escape(from),
            escape(to)
        ));
        self
    }

    /// Render the final filter expression
    #[must_use]
    pub fn build(self) -> String {
        self.clauses.join(" and ")
    }
}

/// Escape a value for embedding in a single-quoted Drive query literal
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_range_expression_shape() {
        let query = FileQuery::new()
            .mime_type_prefix("image/")
            .modified_between("2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z")
            .build();
        assert_eq!(
            query,
            "(mimeType contains 'image/') and \
             (modifiedTime >= '2024-01-01T00:00:00Z' and modifiedTime < '2024-02-01T00:00:00Z')"
        );
    }

    #[test]
    fn test_single_quotes_are_escaped() {
        let query = FileQuery::new()
            .modified_between("2024' or name contains 'x", "2025")
            .build();
        assert!(query.contains("2024\\' or name contains \\'x"));
        // The injected quote must not close the literal early
        assert!(!query.contains("'2024' or"));
    }

    #[test]
    fn test_backslashes_are_escaped() {
        let query = FileQuery::new().mime_type_prefix("image\\").build();
        assert_eq!(query, "(mimeType contains 'image\\\\')");
    }

    #[test]
    fn test_empty_builder_renders_empty_expression() {
        assert_eq!(FileQuery::new().build(), "");
    }
}
