//! Text helpers for the generated C/C++ files: banners, macro definitions,
//! and conditional-compilation guards.

use std::fmt::Write as _;

/// Writes a plain comment banner.
pub fn banner(out: &mut String, text: &str) {
    let _ = write!(out, "/*\n * {}\n */\n", text.replace('\n', "\n * "));
}

/// Writes a documentation comment banner.
pub fn doc_banner(out: &mut String, text: &str) {
    let _ = write!(out, "/**\n * {}\n */\n", text.replace('\n', "\n * "));
}

/// `#define name value`
pub fn macro_define(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "#define {name:<20} {value}");
}

/// `#define name value // comment`
pub fn macro_define_with_comment(out: &mut String, name: &str, value: &str, comment: &str) {
    let _ = writeln!(out, "#define {name:<24} {value:<20} //{comment}");
}

/// `#undef name`
pub fn macro_undef(out: &mut String, name: &str) {
    let _ = writeln!(out, "#undef {name:<24}");
}

/// `#if (condition)`
pub fn conditional_start(out: &mut String, condition: &str) {
    let _ = writeln!(out, "#if ({condition})");
}

/// `#elif (condition)`
pub fn conditional_elif(out: &mut String, condition: &str) {
    let _ = writeln!(out, "#elif ({condition})");
}

/// `#if` on the first candidate, `#elif` on the following ones.
pub fn conditional(out: &mut String, condition: &str, guard_written: bool) {
    if guard_written {
        conditional_elif(out, condition);
    } else {
        conditional_start(out, condition);
    }
}

/// `#else`, only when a guard is open.
pub fn conditional_else(out: &mut String, guard_written: bool) {
    if guard_written {
        out.push_str("#else\n");
    }
}

/// `#endif`, only when a guard is open.
pub fn conditional_end(out: &mut String, guard_written: bool) {
    if guard_written {
        out.push_str("#endif\n");
    }
}

/// `namespace name {`
pub fn open_namespace(out: &mut String, name: &str) {
    let _ = writeln!(out, "namespace {name} {{\n");
}

/// Closes a namespace.
pub fn close_namespace(out: &mut String, name: &str) {
    let _ = writeln!(out, "}} // End namespace {name}\n");
}

/// Opens a documentation group.
pub fn start_group(out: &mut String, name: &str, title: &str, brief: &str) {
    let _ = write!(
        out,
        "/**\n * @addtogroup {name} {title}\n * @brief {brief}\n * @{{\n */\n"
    );
}

/// Closes a documentation group.
pub fn close_group(out: &mut String) {
    out.push_str("/**\n * @}\n */\n");
}

/// Converts a file name into its include-guard macro,
/// e.g. `pin_mapping.h` => `PIN_MAPPING_H_`.
fn include_guard(file_name: &str) -> String {
    let mut guard: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    guard.push('_');
    guard
}

/// Writes the file documentation header and opens the include guard.
pub fn header_file_preamble(
    out: &mut String,
    generic_name: &str,
    file_name: &str,
    version: &str,
    description: &str,
) {
    let _ = write!(
        out,
        "/**\n * @file      {generic_name} (derived from {file_name})\n * @version   {version}\n * @brief     {description}\n */\n\n"
    );
    let guard = include_guard(generic_name);
    let _ = write!(out, "#ifndef {guard}\n#define {guard}\n\n");
}

/// Closes the include guard.
pub fn header_file_postamble(out: &mut String, generic_name: &str) {
    let _ = write!(out, "#endif /* {} */\n", include_guard(generic_name));
}

/// Writes the file documentation header of a source file.
pub fn cpp_file_preamble(
    out: &mut String,
    generic_name: &str,
    file_name: &str,
    version: &str,
    description: &str,
) {
    let _ = write!(
        out,
        "/**\n * @file      {generic_name} (derived from {file_name})\n * @version   {version}\n * @brief     {description}\n */\n\n"
    );
}

/// `#include <name>`
pub fn system_include(out: &mut String, name: &str) {
    let _ = writeln!(out, "#include <{name}>");
}

/// `#include "name"`
pub fn local_include(out: &mut String, name: &str) {
    let _ = writeln!(out, "#include \"{name}\"");
}

#[cfg(test)]
mod tests {
    use super::{conditional, conditional_else, conditional_end, include_guard, macro_define};

    #[test]
    fn guards_alternate_between_if_and_elif() {
        let mut out = String::new();
        conditional(&mut out, "X == 1", false);
        conditional(&mut out, "X == 2", true);
        conditional_else(&mut out, true);
        conditional_end(&mut out, true);
        assert_eq!(out, "#if (X == 1)\n#elif (X == 2)\n#else\n#endif\n");
    }

    #[test]
    fn unwritten_guards_emit_nothing() {
        let mut out = String::new();
        conditional_else(&mut out, false);
        conditional_end(&mut out, false);
        assert!(out.is_empty());
    }

    #[test]
    fn defines_are_column_aligned() {
        let mut out = String::new();
        macro_define(&mut out, "PTA0_SIG_SEL", "1");
        assert_eq!(out, "#define PTA0_SIG_SEL         1\n");
    }

    #[test]
    fn include_guards_are_uppercased() {
        assert_eq!(include_guard("pin_mapping.h"), "PIN_MAPPING_H_");
    }
}
