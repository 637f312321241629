//! Runtime options and the `:set` argument parser.
//!
//! # Recognized options
//!
//! | Name         | Abbrev | Type           | Default  | Meaning                                   |
//! |--------------|--------|----------------|----------|-------------------------------------------|
//! | `tabstop`    | `ts`   | numeric        | 4        | display width of a tab character          |
//! | `expandtab`  | `et`   | boolean        | off      | Tab key inserts spaces                    |
//! | `maxrepeat`  | `mr`   | numeric        | 10000    | cap on count1 × count2                    |
//! | `wrapcolumn` | `wc`   | numeric or 0   | 0 (off)  | advisory wrap width for `g$`              |
//!
//! # `:set` argument forms
//!
//! | Form        | Meaning                          |
//! |-------------|----------------------------------|
//! | `set opt`   | turn on (bool) / query (numeric) |
//! | `set noopt` | turn off (bool only)             |
//! | `set opt!`  | toggle (bool only)               |
//! | `set opt?`  | query current value              |
//! | `set opt=N` | assign (numeric only)            |

/// Engine configuration, adjustable at runtime via `:set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Cap on the effective repeat count (count1 × count2).
    pub max_repeat_count: usize,

    /// Display width of a tab character.
    pub tab_width: usize,

    /// When set, the Tab key inserts spaces up to the next tab stop.
    pub expand_tab: bool,

    /// Advisory wrap width. Only consulted by the end-of-screen-line
    /// motion (`g$`); `None` means no wrapping.
    pub wrap_at_column: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_repeat_count: 10_000,
            tab_width: 4,
            expand_tab: false,
            wrap_at_column: None,
        }
    }
}

// ---------------------------------------------------------------------------
// :set parsing
// ---------------------------------------------------------------------------

/// A parsed `:set` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `set opt` on a boolean option.
    On(String),
    /// `set noopt`.
    Off(String),
    /// `set opt!`.
    Toggle(String),
    /// `set opt?`, or a bare numeric option name.
    Query(String),
    /// `set opt=value`.
    Assign(String, String),
}

/// Resolve an option name or its abbreviation to the canonical name.
/// `None` for unknown options.
#[must_use]
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name {
        "tabstop" | "ts" => Some("tabstop"),
        "expandtab" | "et" => Some("expandtab"),
        "maxrepeat" | "mr" => Some("maxrepeat"),
        "wrapcolumn" | "wc" => Some("wrapcolumn"),
        _ => None,
    }
}

fn is_bool_option(name: &str) -> bool {
    name == "expandtab"
}

/// Parse one `:set` argument into a directive.
///
/// The `no` prefix is only stripped when the remainder names a known
/// boolean option, so a hypothetical option starting with "no" would not
/// be misread. A bare numeric option name queries rather than sets.
#[must_use]
pub fn parse_set_arg(arg: &str) -> Option<SetDirective> {
    if let Some(stripped) = arg.strip_suffix('?') {
        return Some(SetDirective::Query(canonical_name(stripped)?.to_string()));
    }
    if let Some(stripped) = arg.strip_suffix('!') {
        let name = canonical_name(stripped)?;
        return is_bool_option(name).then(|| SetDirective::Toggle(name.to_string()));
    }
    if let Some((name, value)) = arg.split_once('=') {
        return Some(SetDirective::Assign(
            canonical_name(name)?.to_string(),
            value.to_string(),
        ));
    }
    if let Some(stripped) = arg.strip_prefix("no") {
        if let Some(name) = canonical_name(stripped) {
            if is_bool_option(name) {
                return Some(SetDirective::Off(name.to_string()));
            }
        }
    }
    let name = canonical_name(arg)?;
    Some(if is_bool_option(name) {
        SetDirective::On(name.to_string())
    } else {
        SetDirective::Query(name.to_string())
    })
}

impl Options {
    /// Apply a parsed directive. Returns a status-line message for queries
    /// (and `None` for silent success), or an error message.
    ///
    /// # Errors
    ///
    /// A human-readable message when the directive does not fit the
    /// option's type or the value does not parse.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, String> {
        match directive {
            SetDirective::On(name) => match name.as_str() {
                "expandtab" => {
                    self.expand_tab = true;
                    Ok(None)
                }
                other => Err(format!("not a boolean option: {other}")),
            },
            SetDirective::Off(name) => match name.as_str() {
                "expandtab" => {
                    self.expand_tab = false;
                    Ok(None)
                }
                other => Err(format!("not a boolean option: {other}")),
            },
            SetDirective::Toggle(name) => match name.as_str() {
                "expandtab" => {
                    self.expand_tab = !self.expand_tab;
                    Ok(None)
                }
                other => Err(format!("not a boolean option: {other}")),
            },
            SetDirective::Query(name) => Ok(Some(self.describe(name))),
            SetDirective::Assign(name, value) => {
                let parsed: usize = value
                    .parse()
                    .map_err(|_| format!("invalid value for {name}: {value}"))?;
                match name.as_str() {
                    "tabstop" if parsed > 0 => self.tab_width = parsed,
                    "tabstop" => return Err("tabstop must be positive".to_string()),
                    "maxrepeat" if parsed > 0 => self.max_repeat_count = parsed,
                    "maxrepeat" => return Err("maxrepeat must be positive".to_string()),
                    // wrapcolumn=0 switches wrapping off.
                    "wrapcolumn" => {
                        self.wrap_at_column = (parsed > 0).then_some(parsed);
                    }
                    other => return Err(format!("not a numeric option: {other}")),
                }
                Ok(None)
            }
        }
    }

    fn describe(&self, name: &str) -> String {
        match name {
            "tabstop" => format!("tabstop={}", self.tab_width),
            "expandtab" => {
                if self.expand_tab { "expandtab" } else { "noexpandtab" }.to_string()
            }
            "maxrepeat" => format!("maxrepeat={}", self.max_repeat_count),
            "wrapcolumn" => match self.wrap_at_column {
                Some(col) => format!("wrapcolumn={col}"),
                None => "wrapcolumn=0".to_string(),
            },
            other => format!("unknown option: {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
