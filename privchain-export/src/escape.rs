//! Free-text escaping for each export format.
//!
//! Every exporter routes privilege names, technique labels, descriptions
//! and CVE ids through exactly one function here before insertion.

/// Characters LaTeX treats specially. Each is escaped with a leading backslash.
const LATEX_SPECIAL: [char; 9] = ['&', '%', '$', '#', '_', '{', '}', '~', '^'];

/// Wrap a label in double quotes for safe Mermaid rendering.
///
/// Internal double quotes become `#quot;`.
#[must_use]
pub fn quote_label(label: &str) -> String {
    let escaped = label.replace('"', "#quot;");
    format!("\"{escaped}\"")
}

/// Escape characters that break Mermaid parsing (`#`, `&`, `<`, `>`).
///
/// `#` is replaced first so the entities introduced afterwards survive.
#[must_use]
pub fn escape_mermaid_chars(text: &str) -> String {
    text.replace('#', "#35;")
        .replace('&', "#amp;")
        .replace('<', "#lt;")
        .replace('>', "#gt;")
}

/// Escaped and quoted Mermaid label.
#[must_use]
pub fn mermaid_label(text: &str) -> String {
    quote_label(&escape_mermaid_chars(text))
}

/// Keep PlantUML activity text on a single line.
///
/// Line breaks become the literal `\n` sequence PlantUML renders as a
/// break; carriage returns are dropped.
#[must_use]
pub fn escape_plantuml(text: &str) -> String {
    text.replace('\r', "").replace('\n', "\\n")
}

/// Backslash-escape LaTeX special characters in a single pass.
///
/// A single pass matters: escaping `\` after the others would double the
/// backslashes just inserted.
#[must_use]
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if c == '\\' || LATEX_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
