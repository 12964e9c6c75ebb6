//! Inline element composition.
//!
//! Style markers nest in a fixed order, innermost first: inline code, bold,
//! italic, underline, strikethrough, link. A bold link is therefore
//! `[**text**](url)` and never `**[text](url)**`.

use crate::mention::MentionLookup;
use crate::model::{Inline, TextStyle};
use std::borrow::Cow;

/// Render a run of inline elements into one string.
pub fn compose<M: MentionLookup + ?Sized>(elements: &[Inline], mentions: &mut M) -> String {
    let mut out = String::new();
    for element in elements {
        match element {
            Inline::Text(run) => out.push_str(&apply_style(&run.content, &run.style)),
            Inline::MentionUser { user_id } if user_id.is_empty() => out.push_str("@user"),
            Inline::MentionUser { user_id } => out.push_str(&mentions.mention(user_id)),
            Inline::MentionDoc { title, url } => match url.as_deref().map(decode_url) {
                Some(url) if !url.is_empty() => {
                    out.push('[');
                    out.push_str(title);
                    out.push_str("](");
                    out.push_str(&url);
                    out.push(')');
                },
                _ => out.push_str(title),
            },
            Inline::Equation(latex) => {
                out.push('$');
                out.push_str(latex);
                out.push('$');
            },
            Inline::File { token: Some(token) } => {
                out.push_str("`file:");
                out.push_str(token);
                out.push('`');
            },
            Inline::File { token: None } => out.push_str("`file`"),
            Inline::InlineBlock => out.push_str("`inline_block`"),
        }
    }
    out
}

/// Wrap `text` in the markers selected by `style`.
pub fn apply_style(text: &str, style: &TextStyle) -> String {
    let mut styled = text.to_string();
    if style.inline_code {
        styled = format!("`{styled}`");
    }
    if style.bold {
        styled = format!("**{styled}**");
    }
    if style.italic {
        styled = format!("*{styled}*");
    }
    if style.underline {
        styled = format!("<u>{styled}</u>");
    }
    if style.strikethrough {
        styled = format!("~~{styled}~~");
    }
    match style.link.as_deref().map(decode_url) {
        Some(url) if !url.is_empty() => format!("[{styled}]({url})"),
        _ => styled,
    }
}

/// Percent-decode a link target, keeping the input when it does not decode to
/// valid UTF-8.
fn decode_url(url: &str) -> Cow<'_, str> {
    urlencoding::decode(url).unwrap_or(Cow::Borrowed(url))
}
