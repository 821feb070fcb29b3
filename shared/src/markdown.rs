//! Safe HTML rendering for chat message text.
//!
//! Input is escaped first; only a fixed subset of Discord-style markdown,
//! bare links and mention tokens are turned back into markup. Spans that
//! must not be reformatted (code, links, mentions) are swapped for
//! private-use placeholders while the inline rules run.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::mention::{MentionKind, MentionResolver, MentionToken};

const PH_OPEN: char = '\u{E000}';
const PH_CLOSE: char = '\u{E001}';

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").expect("placeholder pattern compiles"));
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+\-]*\n)?(.*?)```").expect("fence pattern compiles")
});
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("inline code pattern compiles"));
static ESCAPED_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&lt;@(!|&amp;)?(\d+)&gt;").expect("escaped mention pattern compiles")
});
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s<>\x{E000}\x{E001}]+").expect("url pattern compiles")
});
static SPOILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\|(.+?)\|\|").expect("spoiler pattern compiles"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern compiles"));
static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("underline pattern compiles"));
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").expect("italic pattern compiles")
});
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\w])_([^_\s](?:[^_]*[^_\s])?)_($|[^\w])")
        .expect("underscore italic pattern compiles")
});
static STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~(.+?)~~").expect("strike pattern compiles"));

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Default)]
struct Stash(Vec<String>);

impl Stash {
    fn put(&mut self, html: String) -> String {
        let idx = self.0.len();
        self.0.push(html);
        format!("{PH_OPEN}{idx}{PH_CLOSE}")
    }

    fn restore(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.0.get(idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// Render message text to HTML that is safe to assign to `innerHTML`.
pub fn render_content(text: &str, mentions: &MentionResolver) -> String {
    let mut stash = Stash::default();
    let text: String = text
        .chars()
        .filter(|c| *c != PH_OPEN && *c != PH_CLOSE)
        .collect();

    let text = FENCE.replace_all(&text, |caps: &Captures| {
        let body = caps[1].trim_end_matches('\n');
        stash.put(format!(
            r#"<pre class="md-codeblock"><code>{}</code></pre>"#,
            escape_html(body)
        ))
    });
    let text = INLINE_CODE.replace_all(&text, |caps: &Captures| {
        stash.put(format!(
            r#"<code class="md-code">{}</code>"#,
            escape_html(&caps[1])
        ))
    });

    let escaped = escape_html(&text);

    let escaped = ESCAPED_MENTION.replace_all(&escaped, |caps: &Captures| {
        let token = if caps.get(1).is_some_and(|m| m.as_str() == "&amp;") {
            MentionToken::role(&caps[2])
        } else {
            MentionToken::user(&caps[2])
        };
        stash.put(mention_html(&token, mentions))
    });

    let escaped = URL.replace_all(&escaped, |caps: &Captures| {
        let (url, trailing) = split_trailing_punctuation(&caps[0]);
        let link = stash.put(format!(
            r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
        ));
        format!("{link}{trailing}")
    });

    let html = SPOILER.replace_all(&escaped, r#"<span class="md-spoiler">${1}</span>"#);
    let html = BOLD.replace_all(&html, "<strong>${1}</strong>");
    let html = UNDERLINE.replace_all(&html, "<u>${1}</u>");
    let html = ITALIC_STAR.replace_all(&html, "<em>${1}</em>");
    let html = ITALIC_UNDERSCORE.replace_all(&html, "${1}<em>${2}</em>${3}");
    let html = STRIKE.replace_all(&html, "<s>${1}</s>");
    let html = html.replace('\n', "<br>");

    stash.restore(&html)
}

fn mention_html(token: &MentionToken, mentions: &MentionResolver) -> String {
    let kind = match token.kind {
        MentionKind::User => "user",
        MentionKind::Role => "role",
    };
    match mentions.name_for(token) {
        Some(name) => format!(
            r#"<span class="mention" data-mention="{kind}" data-id="{}">@{}</span>"#,
            token.id,
            escape_html(name)
        ),
        None => format!(
            r#"<span class="mention mention-unresolved" data-mention="{kind}" data-id="{id}">@{id}</span>"#,
            id = token.id
        ),
    }
}

/// Split sentence punctuation and escaped quotes off the end of a matched URL.
fn split_trailing_punctuation(url: &str) -> (&str, &str) {
    let mut end = url.len();
    loop {
        let head = &url[..end];
        if let Some(stripped) = ["&quot;", "&#39;", "&gt;"]
            .iter()
            .find_map(|entity| head.strip_suffix(entity))
        {
            end = stripped.len();
            continue;
        }
        match head.chars().last() {
            Some('.' | ',' | ';' | ':' | '!' | '?' | ')') => end -= 1,
            _ => break,
        }
    }
    (&url[..end], &url[end..])
}
