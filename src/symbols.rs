//! Filename-symbol grammar.
//!
//! Interprets the special characters embedded in file and directory names:
//! - the *parameter symbol* (default `_`), prefixed for an optional route
//!   parameter (`_id` → `:id`) or suffixed for a trailing-optional segment
//!   (`id_` → `id?`)
//! - the *named view symbol* (default `@`), marking a file or directory as
//!   a named router-view (`@sidebar.vue`, `list@sidebar.vue`)
//!
//! Symbols are configurable and may themselves be regex metacharacters, so
//! every pattern built here goes through `regex::escape` first.

use regex::Regex;

// ---------------------------------------------------------------------------
// Symbol set
// ---------------------------------------------------------------------------

/// The configured special characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolSet {
    /// Route parameter marker. Default `_`.
    pub param: char,
    /// Named router-view marker. Default `@`.
    pub view: char,
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self {
            param: '_',
            view: '@',
        }
    }
}

impl SymbolSet {
    /// The parameter symbol, escaped for embedding in a regex.
    pub fn param_escaped(&self) -> String {
        regex::escape(&self.param.to_string())
    }

    /// The view symbol, escaped for embedding in a regex.
    pub fn view_escaped(&self) -> String {
        regex::escape(&self.view.to_string())
    }
}

// ---------------------------------------------------------------------------
// Path formatting
// ---------------------------------------------------------------------------

/// How parameter segments are rewritten by [`format_path`].
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Replacement for a *prefixed* parameter symbol. Default `:`.
    pub leading: String,
    /// Replacement for a *suffixed* parameter symbol. Default `?`.
    pub training: String,
    /// Whether a parameter segment's inner text is camelCased. Default true.
    pub camel_case: bool,
    /// Whether a trailing `.ext` is dropped. Default true; callers pass
    /// false for directory names so `v1.2` stays `v1.2`.
    pub strip_extension: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            leading: ":".into(),
            training: "?".into(),
            camel_case: true,
            strip_extension: true,
        }
    }
}

/// Rewrite a path (or a single segment) into route-path syntax.
///
/// Each `/`-separated segment is handled independently:
/// - `_id` → `:id` (prefixed parameter, `leading` replacement)
/// - `id_` → `id?` (suffixed parameter, `training` replacement)
/// - segments carrying the view symbol have the symbol and everything after
///   it stripped, along with any file extension
/// - plain segments pass through untouched
pub fn format_path(path: &str, symbols: &SymbolSet, opts: &FormatOptions) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|seg| format_segment(seg, symbols, opts))
        .filter(|seg| !seg.is_empty())
        .collect();

    if path.starts_with('/') {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    }
}

fn format_segment(segment: &str, symbols: &SymbolSet, opts: &FormatOptions) -> String {
    if segment.is_empty() {
        return String::new();
    }

    // Named-view marker: strip from the symbol to the end, plus extension.
    if let Some(pos) = segment.find(symbols.view) {
        let kept = &segment[..pos];
        return if opts.strip_extension {
            strip_extension(kept).to_string()
        } else {
            kept.to_string()
        };
    }

    let stripped = if opts.strip_extension {
        strip_extension(segment)
    } else {
        segment
    };

    if let Some(inner) = stripped.strip_prefix(symbols.param) {
        let inner = if opts.camel_case {
            to_camel_string(inner)
        } else {
            inner.to_string()
        };
        return format!("{}{}", opts.leading, inner);
    }

    if let Some(inner) = stripped.strip_suffix(symbols.param) {
        let inner = if opts.camel_case {
            to_camel_string(inner)
        } else {
            inner.to_string()
        };
        return format!("{}{}", inner, opts.training);
    }

    stripped.to_string()
}

fn strip_extension(segment: &str) -> &str {
    match segment.rfind('.') {
        // A leading dot is a hidden file, not an extension.
        Some(0) | None => segment,
        Some(pos) => &segment[..pos],
    }
}

// ---------------------------------------------------------------------------
// Named views
// ---------------------------------------------------------------------------

/// Extract the named-view identifier from a filename.
///
/// Matches `(symbol|prefix+symbol)name(.ext|$)`:
/// - `@sidebar.vue` → `sidebar`
/// - `list@sidebar.vue` → `sidebar`
/// - `plain.vue` → `""`
pub fn match_named_view(file_name: &str, symbols: &SymbolSet) -> String {
    let pattern = format!(
        r"^[^{view}]*{view}([^.{view}]+)(?:\..*)?$",
        view = symbols.view_escaped()
    );
    let re = Regex::new(&pattern).expect("named-view pattern is built from an escaped symbol");
    re.captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Whether a filename declares an unknown/catch-all route: the stem is
/// nothing but one or two parameter symbols (`_`, `__`, `_.vue`, `__.vue`).
pub fn is_unknown_route(file_name: &str, symbols: &SymbolSet) -> bool {
    let pattern = format!(
        r"^{param}{{1,2}}(?:\..*)?$",
        param = symbols.param_escaped()
    );
    let re = Regex::new(&pattern).expect("unknown-route pattern is built from an escaped symbol");
    re.is_match(file_name)
}

/// Whether a filename is an index component (`index.*`, case-insensitive).
pub fn is_index_file(file_name: &str) -> bool {
    let stem = strip_extension(file_name);
    stem.eq_ignore_ascii_case("index")
}

// ---------------------------------------------------------------------------
// Case converters
// ---------------------------------------------------------------------------

/// camelCase → kebab-case. `userProfile` → `user-profile`.
pub fn to_kebab_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// kebab-case (or snake_case) → camelCase. `user-profile` → `userProfile`.
pub fn to_un_kebab_string(value: &str) -> String {
    to_camel_string(value)
}

/// Collapse `-`/`_` separators into camelCase.
pub fn to_camel_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut upper_next = false;
    for c in value.chars() {
        if c == '-' || c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Kebab-case a route path, leaving `:param` segments untouched.
pub fn kebab_case_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|seg| {
            if seg.starts_with(':') {
                seg.to_string()
            } else {
                to_kebab_string(seg)
            }
        })
        .collect();
    segments.join("/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
