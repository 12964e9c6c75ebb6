//! Code block language ids.

/// Language names indexed by `id - 1`.
const LANGUAGES: [&str; 75] = [
    "text",
    "abap",
    "ada",
    "apache",
    "apex",
    "assembly",
    "bash",
    "csharp",
    "cpp",
    "c",
    "cobol",
    "css",
    "coffeescript",
    "d",
    "dart",
    "delphi",
    "django",
    "dockerfile",
    "erlang",
    "fortran",
    "foxpro",
    "go",
    "groovy",
    "html",
    "htmlbars",
    "http",
    "haskell",
    "json",
    "java",
    "javascript",
    "julia",
    "kotlin",
    "latex",
    "lisp",
    "logo",
    "lua",
    "matlab",
    "makefile",
    "markdown",
    "nginx",
    "objectivec",
    "openedgeabl",
    "php",
    "perl",
    "postscript",
    "powershell",
    "prolog",
    "protobuf",
    "python",
    "r",
    "rpg",
    "ruby",
    "rust",
    "sas",
    "scss",
    "sql",
    "scala",
    "scheme",
    "scratch",
    "shell",
    "swift",
    "thrift",
    "typescript",
    "vbscript",
    "visual",
    "xml",
    "yaml",
    "cmake",
    "diff",
    "gherkin",
    "graphql",
    "glsl",
    "properties",
    "solidity",
    "toml",
];

/// Fence info string for a language id; unknown or missing ids are `text`.
pub fn language_name(id: Option<u32>) -> &'static str {
    id.and_then(|id| usize::try_from(id).ok()?.checked_sub(1))
        .and_then(|idx| LANGUAGES.get(idx))
        .copied()
        .unwrap_or("text")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        assert_eq!(language_name(Some(1)), "text");
        assert_eq!(language_name(Some(7)), "bash");
        assert_eq!(language_name(Some(49)), "python");
        assert_eq!(language_name(Some(53)), "rust");
        assert_eq!(language_name(Some(63)), "typescript");
        assert_eq!(language_name(Some(75)), "toml");
    }

    #[test]
    fn test_unknown_ids_default_to_text() {
        assert_eq!(language_name(None), "text");
        assert_eq!(language_name(Some(0)), "text");
        assert_eq!(language_name(Some(76)), "text");
        assert_eq!(language_name(Some(u32::MAX)), "text");
    }
}
