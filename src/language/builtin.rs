//! @acp:module "Builtin Languages"
//! @acp:summary "Comment delimiters for common language identifiers"
//! @acp:domain core
//! @acp:layer data

use super::{CommentConfigSource, CommentConfiguration, LineComment};

/// @acp:summary "Static comment configuration table keyed by editor language id"
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLanguages;

impl BuiltinLanguages {
    /// Known language identifiers, sorted
    pub fn language_ids() -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = LANGUAGES.iter().flat_map(|(ids, _, _)| ids.iter().copied()).collect();
        ids.sort_unstable();
        ids
    }

    /// Editor language identifier for a file extension
    pub fn language_for_extension(ext: &str) -> Option<&'static str> {
        let id = match ext.to_lowercase().as_str() {
            "c" | "h" => "c",
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => "cpp",
            "cs" => "csharp",
            "java" => "java",
            "js" | "mjs" | "cjs" => "javascript",
            "jsx" => "javascriptreact",
            "ts" | "mts" | "cts" => "typescript",
            "tsx" => "typescriptreact",
            "go" => "go",
            "rs" => "rust",
            "swift" => "swift",
            "kt" | "kts" => "kotlin",
            "scala" | "sc" => "scala",
            "dart" => "dart",
            "php" => "php",
            "cls" | "trigger" => "apex",
            "groovy" | "gradle" => "groovy",
            "m" | "mm" => "objective-c",
            "css" => "css",
            "scss" => "scss",
            "less" => "less",
            "py" | "pyw" | "pyi" => "python",
            "rb" | "rake" => "ruby",
            "sh" | "bash" | "zsh" => "shellscript",
            "pl" | "pm" => "perl",
            "yml" | "yaml" => "yaml",
            "toml" => "toml",
            "r" => "r",
            "ex" | "exs" => "elixir",
            "tcl" => "tcl",
            "ps1" | "psm1" => "powershell",
            "coffee" => "coffeescript",
            "lua" => "lua",
            "sql" => "sql",
            "hs" => "haskell",
            "elm" => "elm",
            "html" | "htm" => "html",
            "xml" | "xsd" | "svg" => "xml",
            "vue" => "vue",
            "md" | "markdown" => "markdown",
            "erl" | "hrl" => "erlang",
            "tex" => "latex",
            "clj" | "cljs" => "clojure",
            "scm" | "ss" => "scheme",
            "lisp" | "el" => "lisp",
            "vb" | "bas" => "vb",
            "f90" | "f95" | "f03" => "fortran",
            "ini" | "cfg" => "ini",
            "bat" | "cmd" => "bat",
            "jl" => "julia",
            "nim" => "nim",
            "vhd" | "vhdl" => "vhdl",
            "v" | "sv" => "verilog",
            "sol" => "solidity",
            "proto" => "proto3",
            "graphql" | "gql" => "graphql",
            "tf" | "tfvars" => "terraform",
            "zig" => "zig",
            "ml" | "mli" => "ocaml",
            "fs" | "fsx" => "fsharp",
            "txt" | "text" => "plaintext",
            _ => return None,
        };
        Some(id)
    }
}

type Entry = (&'static [&'static str], &'static [&'static str], Option<(&'static str, &'static str)>);

const C_BLOCK: Option<(&str, &str)> = Some(("/*", "*/"));

const LANGUAGES: &[Entry] = &[
    (
        &[
            "c", "cpp", "csharp", "java", "javascript", "javascriptreact", "jsx", "typescript",
            "typescriptreact", "tsx", "go", "rust", "swift", "kotlin", "scala", "dart", "apex",
            "groovy", "objective-c", "objective-cpp", "scss", "less", "verilog", "solidity",
            "proto3", "jsonc", "cuda-cpp", "hlsl", "glsl",
        ],
        &["//"],
        C_BLOCK,
    ),
    (&["php"], &["//", "#"], C_BLOCK),
    (&["terraform"], &["#", "//"], C_BLOCK),
    (&["css"], &[], C_BLOCK),
    (
        &[
            "python", "shellscript", "perl", "yaml", "toml", "dockerfile", "makefile", "r", "elixir",
            "tcl", "nim", "graphql", "cmake", "properties",
        ],
        &["#"],
        None,
    ),
    (&["ruby"], &["#"], Some(("=begin", "=end"))),
    (&["powershell"], &["#"], Some(("<#", "#>"))),
    (&["coffeescript"], &["#"], Some(("###", "###"))),
    (&["julia"], &["#"], Some(("#=", "=#"))),
    (&["lua"], &["--"], Some(("--[[", "]]"))),
    (&["sql"], &["--"], C_BLOCK),
    (&["haskell", "elm"], &["--"], Some(("{-", "-}"))),
    (&["vhdl", "ada"], &["--"], None),
    (&["html", "xml", "vue", "markdown", "svelte"], &[], Some(("<!--", "-->"))),
    (&["matlab"], &["%"], Some(("%{", "%}"))),
    (&["erlang", "latex", "tex"], &["%"], None),
    (&["clojure", "scheme", "lisp", "ini", "asm"], &[";"], None),
    (&["vb"], &["'"], None),
    (&["fortran", "fortran-modern"], &["!"], None),
    (&["bat"], &["REM", "::"], None),
    (&["zig"], &["//"], None),
    (&["ocaml"], &[], Some(("(*", "*)"))),
    (&["fsharp"], &["//"], Some(("(*", "*)"))),
];

impl CommentConfigSource for BuiltinLanguages {
    fn comment_configuration(&self, language_id: &str) -> Option<CommentConfiguration> {
        let (_, line, block) = LANGUAGES.iter().find(|(ids, _, _)| ids.contains(&language_id))?;

        let line_comment = match line {
            [] => None,
            [single] => Some(LineComment::Single(single.to_string())),
            many => Some(LineComment::Multiple(many.iter().map(|d| d.to_string()).collect())),
        };

        Some(CommentConfiguration {
            line_comment,
            block_comment: block.map(|(start, end)| [start.to_string(), end.to_string()]),
        })
    }
}
