use std::path::Path;

/// Infer a syntax-highlighting language from a file extension.
///
/// Fixed table; anything unlisted gets no language rather than a guess.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?;
    let language = match extension {
        "rs" => "rust",
        "py" => "python",
        "ts" => "typescript",
        "tsx" => "tsx",
        "js" => "javascript",
        "jsx" => "jsx",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        "c" => "c",
        "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "sh" | "bash" => "bash",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "md" => "markdown",
        "html" => "html",
        "css" => "css",
        "sql" => "sql",
        _ => return None,
    };
    Some(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for_common_extensions() {
        assert_eq!(language_for_path("/src/main.rs"), Some("rust"));
        assert_eq!(language_for_path("app/models.py"), Some("python"));
        assert_eq!(language_for_path("web/index.tsx"), Some("tsx"));
        assert_eq!(language_for_path("config.yml"), Some("yaml"));
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(language_for_path("/usr/bin/thing.xyz"), None);
        assert_eq!(language_for_path("Makefile"), None);
    }
}
