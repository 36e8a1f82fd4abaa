//! Language tag from file extension.

/// Best-effort language tag for a path; `"text"` when unknown.
pub fn language_from_path(path: &str) -> &'static str {
  let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
  match name.as_str() {
    "dockerfile" => return "dockerfile",
    "makefile" => return "makefile",
    _ => {}
  }

  let ext = match name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => ext,
    _ => return "text",
  };

  match ext {
    "ts" | "tsx" | "mts" | "cts" => "typescript",
    "js" | "jsx" | "mjs" | "cjs" => "javascript",
    "py" | "pyi" => "python",
    "rb" => "ruby",
    "go" => "go",
    "rs" => "rust",
    "java" => "java",
    "kt" | "kts" => "kotlin",
    "swift" => "swift",
    "c" | "h" => "c",
    "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
    "cs" => "csharp",
    "php" => "php",
    "scala" => "scala",
    "dart" => "dart",
    "vue" => "vue",
    "svelte" => "svelte",
    "sh" | "bash" | "zsh" => "shell",
    "sql" => "sql",
    "md" | "markdown" => "markdown",
    "json" => "json",
    "yml" | "yaml" => "yaml",
    "toml" => "toml",
    "xml" => "xml",
    "html" | "htm" => "html",
    "css" => "css",
    "scss" | "sass" => "scss",
    "tf" | "hcl" => "hcl",
    "gradle" => "gradle",
    _ => "text",
  }
}
