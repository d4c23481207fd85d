//! Syntax language tags the viewer can highlight

/// Language used when a stored tag is missing or unrecognized.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// Tags the viewer knows how to highlight. Stored notes may carry
/// anything; unknown tags degrade to plaintext rather than failing.
pub const LANGUAGES: &[&str] = &[
    "plaintext",
    "bash",
    "c",
    "cpp",
    "csharp",
    "css",
    "go",
    "haskell",
    "html",
    "java",
    "javascript",
    "json",
    "kotlin",
    "lua",
    "markdown",
    "php",
    "python",
    "ruby",
    "rust",
    "sql",
    "toml",
    "typescript",
    "xml",
    "yaml",
];

/// Map a stored language tag to one the viewer supports.
pub fn normalize_language(tag: &str) -> &str {
    if LANGUAGES.contains(&tag) {
        tag
    } else {
        DEFAULT_LANGUAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_pass_through() {
        assert_eq!(normalize_language("rust"), "rust");
        assert_eq!(normalize_language("plaintext"), "plaintext");
    }

    #[test]
    fn unknown_tags_fall_back() {
        assert_eq!(normalize_language("brainfuck--nonexistent"), "plaintext");
        assert_eq!(normalize_language(""), "plaintext");
    }
}
