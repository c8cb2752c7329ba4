//! Safe rich-text rendering for assistant output. Everything is escaped
//! first; only the recognized tokens (bold markers, bullet lines, newlines)
//! are turned back into markup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::{Message, Role};

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

/// Render one message body as markup: `**text**` becomes `<strong>`,
/// consecutive `• ` lines coalesce into a single `<ul>`, remaining newlines
/// become `<br>`.
pub fn format_message(content: &str) -> String {
    let escaped = escape(content);
    let bolded = BOLD.replace_all(&escaped, "<strong>$1</strong>");

    let mut out = String::new();
    let mut items: Vec<String> = Vec::new();
    let mut separate = false;

    for line in bolded.lines() {
        if let Some(item) = line.strip_prefix("• ") {
            items.push(item.to_string());
            continue;
        }

        if !items.is_empty() {
            flush_list(&mut out, &mut items);
            separate = false;
        }
        if separate {
            out.push_str("<br>");
        }
        out.push_str(line);
        separate = true;
    }

    flush_list(&mut out, &mut items);
    out
}

/// Render a widget transcript as markup, one block per turn.
pub fn render_transcript(messages: &[Message]) -> String {
    let mut html = String::new();
    for message in messages {
        let (class, author) = match message.role {
            Role::User => ("user", "You"),
            _ => ("assistant", "AI Amino"),
        };
        html.push_str(&format!(
            "<div class=\"message {class}\"><span class=\"author\">{author}</span><div class=\"body\">{}</div></div>\n",
            format_message(&message.content)
        ));
    }
    html
}

fn flush_list(out: &mut String, items: &mut Vec<String>) {
    if items.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for item in items.drain(..) {
        out.push_str("<li>");
        out.push_str(&item);
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
