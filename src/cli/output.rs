use std::io::IsTerminal;

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
    pub verbose: bool,
}

pub fn detect_color(color_flag: bool) -> bool {
    if !color_flag {
        return false;
    }
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn to_json<T: Serialize>(value: &T, opts: &OutputOptions) -> Result<String> {
    let json = if opts.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(pretty: bool) -> OutputOptions {
        OutputOptions {
            format: OutputFormat::Json,
            pretty,
            use_color: false,
            verbose: false,
        }
    }

    #[test]
    fn color_flag_off_disables_color() {
        assert!(!detect_color(false));
    }

    #[test]
    fn compact_json_is_single_line() {
        let text = to_json(&json!({"a": 1, "b": [1, 2]}), &opts(false)).unwrap();
        assert!(!text.contains('\n'));
    }

    #[test]
    fn pretty_json_is_multi_line() {
        let text = to_json(&json!({"a": 1}), &opts(true)).unwrap();
        assert!(text.contains('\n'));
    }
}
