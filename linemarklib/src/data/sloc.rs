//! Source-lines-of-code classification.
//!
//! A line is a source line when it is neither blank nor a pure comment.
//! Comment detection is pattern based: each [`Language`] has a fixed set of
//! single-line markers and at most one block-comment marker pair. String
//! literals are not tracked, so a marker inside a string is treated as a
//! real comment marker, and block comments do not nest.

use std::path::Path;

/// Comment markers for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPatterns {
    /// Single-line markers, tested in order
    pub line: &'static [&'static str],
    /// Block comment start/end pair
    pub block: Option<(&'static str, &'static str)>,
}

impl CommentPatterns {
    /// Fallback for unknown languages.
    pub const DEFAULT: Self = Self {
        line: &["//", "#"],
        block: None,
    };

    /// Every non-blank line is source.
    pub const NONE: Self = Self {
        line: &[],
        block: None,
    };

    const fn new(line: &'static [&'static str], block: Option<(&'static str, &'static str)>) -> Self {
        Self { line, block }
    }
}

const C_BLOCK: Option<(&str, &str)> = Some(("/*", "*/"));
const MARKUP_BLOCK: Option<(&str, &str)> = Some(("<!--", "-->"));

/// Languages with a known comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Java,
    C,
    Cpp,
    CSharp,
    Go,
    Rust,
    Swift,
    Kotlin,
    Scala,
    Dart,
    Php,
    Python,
    Ruby,
    Perl,
    Shell,
    PowerShell,
    R,
    Lua,
    Sql,
    Haskell,
    Elixir,
    Clojure,
    Lisp,
    Erlang,
    Matlab,
    VisualBasic,
    Batch,
    Html,
    Xml,
    Vue,
    Svelte,
    Css,
    Scss,
    Less,
    Yaml,
    Toml,
    Ini,
    Dockerfile,
    Makefile,
    Markdown,
    Json,
}

impl Language {
    /// Look up a language by its identifier (e.g. `"javascript"`, `"python"`).
    pub fn from_key(key: &str) -> Option<Self> {
        let lang = match key.to_ascii_lowercase().as_str() {
            "javascript" | "javascriptreact" => Self::JavaScript,
            "typescript" | "typescriptreact" => Self::TypeScript,
            "java" => Self::Java,
            "c" => Self::C,
            "cpp" | "c++" => Self::Cpp,
            "csharp" | "c#" => Self::CSharp,
            "go" => Self::Go,
            "rust" => Self::Rust,
            "swift" => Self::Swift,
            "kotlin" => Self::Kotlin,
            "scala" => Self::Scala,
            "dart" => Self::Dart,
            "php" => Self::Php,
            "python" => Self::Python,
            "ruby" => Self::Ruby,
            "perl" => Self::Perl,
            "shellscript" | "shell" | "bash" => Self::Shell,
            "powershell" => Self::PowerShell,
            "r" => Self::R,
            "lua" => Self::Lua,
            "sql" => Self::Sql,
            "haskell" => Self::Haskell,
            "elixir" => Self::Elixir,
            "clojure" => Self::Clojure,
            "lisp" | "scheme" => Self::Lisp,
            "erlang" => Self::Erlang,
            "matlab" => Self::Matlab,
            "vb" | "visualbasic" => Self::VisualBasic,
            "bat" | "batch" => Self::Batch,
            "html" => Self::Html,
            "xml" | "xsl" => Self::Xml,
            "vue" => Self::Vue,
            "svelte" => Self::Svelte,
            "css" => Self::Css,
            "scss" => Self::Scss,
            "less" => Self::Less,
            "yaml" => Self::Yaml,
            "toml" => Self::Toml,
            "ini" | "properties" => Self::Ini,
            "dockerfile" => Self::Dockerfile,
            "makefile" => Self::Makefile,
            "markdown" => Self::Markdown,
            "json" | "jsonc" => Self::Json,
            _ => return None,
        };
        Some(lang)
    }

    /// Look up a language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "java" => Self::Java,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "cs" => Self::CSharp,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "swift" => Self::Swift,
            "kt" | "kts" => Self::Kotlin,
            "scala" | "sc" => Self::Scala,
            "dart" => Self::Dart,
            "php" => Self::Php,
            "py" | "pyw" | "pyi" => Self::Python,
            "rb" | "rake" | "gemspec" => Self::Ruby,
            "pl" | "pm" => Self::Perl,
            "sh" | "bash" | "zsh" | "fish" => Self::Shell,
            "ps1" | "psm1" | "psd1" => Self::PowerShell,
            "r" => Self::R,
            "lua" => Self::Lua,
            "sql" => Self::Sql,
            "hs" | "lhs" => Self::Haskell,
            "ex" | "exs" => Self::Elixir,
            "clj" | "cljs" | "cljc" | "edn" => Self::Clojure,
            "lisp" | "el" | "scm" | "rkt" => Self::Lisp,
            "erl" | "hrl" => Self::Erlang,
            "m" => Self::Matlab,
            "vb" | "vbs" | "bas" => Self::VisualBasic,
            "bat" | "cmd" => Self::Batch,
            "html" | "htm" => Self::Html,
            "xml" | "xsl" | "xsd" | "svg" | "csproj" | "plist" => Self::Xml,
            "vue" => Self::Vue,
            "svelte" => Self::Svelte,
            "css" => Self::Css,
            "scss" | "sass" => Self::Scss,
            "less" => Self::Less,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            "ini" | "cfg" | "conf" | "properties" => Self::Ini,
            "dockerfile" => Self::Dockerfile,
            "mk" => Self::Makefile,
            "md" | "markdown" | "mdx" => Self::Markdown,
            "json" | "jsonc" | "json5" => Self::Json,
            _ => return None,
        };
        Some(lang)
    }

    /// Infer the language from a path's extension, or from well-known
    /// extensionless file names.
    pub fn from_path(path: &Path) -> Option<Self> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            return Self::from_extension(ext);
        }
        match path.file_name()?.to_str()?.to_ascii_lowercase().as_str() {
            "dockerfile" | "containerfile" => Some(Self::Dockerfile),
            "makefile" | "gnumakefile" => Some(Self::Makefile),
            _ => None,
        }
    }

    /// Comment markers for this language.
    pub fn patterns(self) -> CommentPatterns {
        use Language::*;
        match self {
            JavaScript | TypeScript | Java | C | Cpp | CSharp | Go | Rust | Swift | Kotlin
            | Scala | Dart | Less => CommentPatterns::new(&["//"], C_BLOCK),
            Php => CommentPatterns::new(&["//", "#"], C_BLOCK),
            Python => CommentPatterns::new(&["#"], Some(("\"\"\"", "\"\"\""))),
            Ruby => CommentPatterns::new(&["#"], Some(("=begin", "=end"))),
            Perl => CommentPatterns::new(&["#"], Some(("=pod", "=cut"))),
            Shell | R | Yaml | Toml | Dockerfile | Makefile => CommentPatterns::new(&["#"], None),
            PowerShell => CommentPatterns::new(&["#"], Some(("<#", "#>"))),
            Lua => CommentPatterns::new(&["--"], Some(("--[[", "]]"))),
            Sql => CommentPatterns::new(&["--"], C_BLOCK),
            Haskell => CommentPatterns::new(&["--"], Some(("{-", "-}"))),
            Elixir => CommentPatterns::new(&["#"], None),
            Clojure | Lisp => CommentPatterns::new(&[";"], None),
            Erlang | Matlab => CommentPatterns::new(&["%"], None),
            VisualBasic => CommentPatterns::new(&["'"], None),
            Batch => CommentPatterns::new(&["REM", "rem", "::"], None),
            Html | Xml => CommentPatterns::new(&[], MARKUP_BLOCK),
            Vue | Svelte => CommentPatterns::new(&["//"], MARKUP_BLOCK),
            Css => CommentPatterns::new(&[], C_BLOCK),
            Scss => CommentPatterns::new(&["//"], C_BLOCK),
            Ini => CommentPatterns::new(&[";", "#"], None),
            Markdown | Json => CommentPatterns::NONE,
        }
    }
}

/// Comment markers for an optional language, falling back to the default set.
pub fn patterns_for(language: Option<Language>) -> CommentPatterns {
    language.map_or(CommentPatterns::DEFAULT, Language::patterns)
}

/// Count source lines in `text` using the given comment markers.
pub fn count_sloc(text: &str, patterns: &CommentPatterns) -> u64 {
    let mut sloc = 0;
    let mut in_block = false;

    // `lines` splits on `\n` and `\r\n` and drops the empty tail after a
    // final terminator.
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((start, end)) = patterns.block {
            if in_block {
                if let Some(pos) = line.find(end) {
                    in_block = false;
                    if !line[pos + end.len()..].trim().is_empty() {
                        sloc += 1;
                    }
                }
                continue;
            }

            if let Some(pos) = line.find(start) {
                let before = line[..pos].trim();
                let rest = &line[pos + start.len()..];
                match rest.find(end) {
                    Some(close) => {
                        let after = rest[close + end.len()..].trim();
                        if !before.is_empty() || !after.is_empty() {
                            sloc += 1;
                        }
                    }
                    None => {
                        if !before.is_empty() {
                            sloc += 1;
                        }
                        in_block = true;
                    }
                }
                continue;
            }
        }

        if is_line_comment(line, patterns.line) {
            continue;
        }
        sloc += 1;
    }

    sloc
}

/// A trimmed line is a pure comment when the first marker found in it sits
/// at position zero. A marker preceded by code ends the search.
fn is_line_comment(line: &str, markers: &[&str]) -> bool {
    for marker in markers {
        if line.starts_with(marker) {
            return true;
        }
        if line.find(marker).is_some_and(|pos| pos > 0) {
            return false;
        }
    }
    false
}

/// Count source lines, inferring the language from the file extension.
pub fn count_sloc_for_path(text: &str, path: &Path) -> u64 {
    count_sloc(text, &patterns_for(Language::from_path(path)))
}

/// Count source lines for an explicit language key. Unknown keys use the
/// default marker set.
pub fn count_sloc_for_key(text: &str, key: &str) -> u64 {
    count_sloc(text, &patterns_for(Language::from_key(key)))
}
