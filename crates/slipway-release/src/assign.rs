//! Find/replace for simple `name = "value"` assignments.
//!
//! Release preparation edits version strings in place without parsing
//! the surrounding language. It looks for the first line that assigns a
//! single- or double-quoted literal to the given name and swaps the
//! quoted value; everything else in the file, whitespace and quote
//! style included, is preserved.

use regex::Regex;

use crate::error::{ReleaseError, ReleaseResult};

/// Compile the line pattern for assignments to `name`.
///
/// Matches `name = 'value'` and `name = "value"` at the start of a
/// line, with optional indentation and spacing around the `=`. The
/// value may not span lines or contain its own quote character.
fn assignment_pattern(name: &str) -> ReleaseResult<Regex> {
    let pattern = format!(
        r#"(?m)^[ \t]*{}[ \t]*=[ \t]*(?:'([^'\n]*)'|"([^"\n]*)")"#,
        regex::escape(name)
    );
    Regex::new(&pattern).map_err(|source| ReleaseError::Pattern {
        name: name.to_string(),
        source,
    })
}

/// Extract the value assigned to `name` in `text`.
///
/// Returns the first assignment in line order. Fails with
/// [`ReleaseError::AssignmentNotFound`] when no line assigns a quoted
/// value to `name`.
pub fn find_assignment(text: &str, name: &str) -> ReleaseResult<String> {
    let not_found = || ReleaseError::AssignmentNotFound {
        name: name.to_string(),
    };
    let captures = assignment_pattern(name)?
        .captures(text)
        .ok_or_else(not_found)?;
    let value = captures
        .get(1)
        .or_else(|| captures.get(2))
        .ok_or_else(not_found)?;
    Ok(value.as_str().to_string())
}

/// Replace the value assigned to `name` in `text` with `new_value`.
///
/// Only the quoted value of the first matching line changes; quote
/// style, spacing, and the rest of the file come through untouched.
/// Fails with [`ReleaseError::AssignmentNotFound`] when no line assigns
/// a quoted value to `name`.
pub fn replace_assignment(text: &str, name: &str, new_value: &str) -> ReleaseResult<String> {
    let not_found = || ReleaseError::AssignmentNotFound {
        name: name.to_string(),
    };
    let captures = assignment_pattern(name)?
        .captures(text)
        .ok_or_else(not_found)?;
    let value = captures
        .get(1)
        .or_else(|| captures.get(2))
        .ok_or_else(not_found)?;

    let mut replaced = String::with_capacity(text.len() + new_value.len());
    replaced.push_str(&text[..value.start()]);
    replaced.push_str(new_value);
    replaced.push_str(&text[value.end()..]);
    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
from setuptools import setup

name = 'demo'
version = \"1.0.0\"

setup(name=name, version=version)
";

    #[test]
    fn finds_single_quoted_values() {
        assert_eq!(find_assignment(MANIFEST, "name").unwrap(), "demo");
    }

    #[test]
    fn finds_double_quoted_values() {
        assert_eq!(find_assignment(MANIFEST, "version").unwrap(), "1.0.0");
    }

    #[test]
    fn missing_assignment_is_reported() {
        let err = find_assignment(MANIFEST, "release").unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::AssignmentNotFound { ref name } if name == "release"
        ));
    }

    #[test]
    fn name_must_match_the_whole_token() {
        let text = "api_version = '2'\n";
        assert!(find_assignment(text, "version").is_err());
        assert!(find_assignment(text, "api").is_err());
    }

    #[test]
    fn unquoted_assignments_do_not_match() {
        assert!(find_assignment("version = 1.0\n", "version").is_err());
    }

    #[test]
    fn indented_assignments_match() {
        assert_eq!(find_assignment("    version = '2.0'\n", "version").unwrap(), "2.0");
    }

    #[test]
    fn first_assignment_wins() {
        let text = "version = '1'\nversion = '2'\n";
        assert_eq!(find_assignment(text, "version").unwrap(), "1");
    }

    #[test]
    fn value_may_contain_the_other_quote() {
        assert_eq!(find_assignment("name = \"it's\"\n", "name").unwrap(), "it's");
    }

    #[test]
    fn empty_values_are_found() {
        assert_eq!(find_assignment("version = ''\n", "version").unwrap(), "");
    }

    #[test]
    fn replace_keeps_quote_style_and_layout() {
        let replaced = replace_assignment(MANIFEST, "version", "1.1.0").unwrap();
        assert!(replaced.contains("version = \"1.1.0\""));
        assert!(replaced.contains("name = 'demo'"));
        assert!(replaced.ends_with("setup(name=name, version=version)\n"));
    }

    #[test]
    fn replace_touches_only_the_value() {
        let text = "x = 1\n__version__ = '0.9'\ny = 2\n";
        let replaced = replace_assignment(text, "__version__", "1.0").unwrap();
        assert_eq!(replaced, "x = 1\n__version__ = '1.0'\ny = 2\n");
    }

    #[test]
    fn replace_missing_assignment_is_reported() {
        assert!(matches!(
            replace_assignment("a = 1\n", "version", "2").unwrap_err(),
            ReleaseError::AssignmentNotFound { .. }
        ));
    }

    #[test]
    fn replace_fills_empty_values() {
        let replaced = replace_assignment("version = ''\n", "version", "3.0").unwrap();
        assert_eq!(replaced, "version = '3.0'\n");
    }
}
