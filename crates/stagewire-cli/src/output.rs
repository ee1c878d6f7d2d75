//! Formatted output helpers for CLI commands.
//!
//! Provides the definition table printed by `calc` and the to-do list
//! rendering printed by `todo`.

use stagewire_sdk::DefinitionDescriptor;

use crate::todo::Todo;

/// A horizontal rule of `width` box-drawing characters.
#[must_use]
pub fn rule(width: usize) -> String {
    "\u{2550}".repeat(width)
}

/// Renders definition descriptors as an aligned three-column table.
#[must_use]
pub fn format_descriptors(descriptors: &[DefinitionDescriptor]) -> String {
    let name_width = descriptors
        .iter()
        .map(|d| d.name.len())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or_default();
    let type_width = descriptors
        .iter()
        .map(|d| short_type_name(d.produces).len())
        .chain(std::iter::once("PRODUCES".len()))
        .max()
        .unwrap_or_default();

    let mut out = format!("{:<name_width$}  {:<type_width$}  READS\n", "NAME", "PRODUCES");
    for descriptor in descriptors {
        let reads = if descriptor.reads.is_empty() {
            String::from("-")
        } else {
            descriptor.reads.join(", ")
        };
        out.push_str(&format!(
            "{:<name_width$}  {:<type_width$}  {reads}\n",
            descriptor.name,
            short_type_name(descriptor.produces),
        ));
    }
    out
}

/// Strips module paths from a type name, keeping generic structure.
///
/// `alloc::boxed::Box<dyn core::ops::Fn(i64) -> i64>` becomes
/// `Box<dyn Fn(i64) -> i64>`.
#[must_use]
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(last_path_segment(&segment));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(last_path_segment(&segment));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Renders one to-do line: `[x] 3  text`.
#[must_use]
pub fn format_todo(todo: &Todo) -> String {
    let mark = if todo.completed { 'x' } else { ' ' };
    format!("[{mark}] {:<3} {}", todo.id, todo.text)
}
