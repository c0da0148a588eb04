use crate::constants::{MAX_VALUE_PREVIEW, SECRET_MASK};
use crate::staging::{EditSession, Entry};
use num_format::{Locale, ToFormattedString};

/// one-line rendering of a value for listings
pub fn preview(value: &str, masked: bool) -> String {
    if masked {
        return SECRET_MASK.to_string();
    }

    let escaped = value.replace('\n', "\\n").replace('\t', "\\t");
    if escaped.chars().count() <= MAX_VALUE_PREVIEW {
        return escaped;
    }
    let truncated: String = escaped.chars().take(MAX_VALUE_PREVIEW - 1).collect();
    format!("{truncated}…")
}

pub fn size_label(value: &str) -> String {
    let bytes = value.len();
    let unit = if bytes == 1 { "byte" } else { "bytes" };
    format!("{} {unit}", bytes.to_formatted_string(&Locale::en))
}

/// "1 change", "1,200 changes"
pub fn count_label(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{} {noun}{suffix}", count.to_formatted_string(&Locale::en))
}

pub fn changes_label(count: usize) -> String {
    if count == 0 {
        String::from("no pending changes")
    } else {
        count_label(count, "pending change")
    }
}

/// table of every staged entry: marker, key, current value
pub fn entry_lines(session: &EditSession, masked: bool) -> Vec<String> {
    let width = session.entries().map(|(k, _)| k.len()).max().unwrap_or(0);
    session
        .entries()
        .map(|(key, entry)| {
            format!(
                "{} {key:<width$}  {}",
                entry.marker(),
                preview(entry.current(), masked)
            )
        })
        .collect()
}

/// one line per pending change
pub fn change_lines(session: &EditSession, masked: bool) -> Vec<String> {
    session
        .changes()
        .map(|(key, entry)| match entry {
            Entry::New { value } => format!(
                "+ {key} = {} ({})",
                preview(value, masked),
                size_label(value)
            ),
            Entry::Deleted { value } => format!("- {key} ({})", size_label(value)),
            Entry::Edited { value, new_value } => format!(
                "~ {key}: {} → {} ({})",
                preview(value, masked),
                preview(new_value, masked),
                size_label(new_value)
            ),
            Entry::Unmodified { .. } => format!("  {key}"),
        })
        .collect()
}

#[cfg(test)]
mod tests;
