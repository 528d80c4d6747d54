//! Display helpers for URLs shown as link text.

use super::{Heuristics, SearchEngine};
use url::Url;

/// Default longest URL shown verbatim.
pub const DEFAULT_MAX_URL_DISPLAY: usize = 60;

/// Shorten a URL for display using the default search engine names.
pub fn truncate_url(url: &str, max: usize) -> String {
    truncate_url_with(url, max, &Heuristics::default().search_engines)
}

/// Shorten a URL for display.
///
/// URLs within `max` chars are returned unchanged. Wikipedia and search
/// engine URLs get a readable name. Anything else keeps its host and as much
/// of the path as fits, with `...` marking what was cut.
pub fn truncate_url_with(url: &str, max: usize, engines: &[SearchEngine]) -> String {
    if url.chars().count() <= max {
        return url.to_string();
    }
    if is_wikipedia(url) {
        return wikipedia_display(url);
    }
    let lower = url.to_ascii_lowercase();
    if let Some(engine) = engines.iter().find(|e| lower.contains(&e.pattern)) {
        return engine.name.clone();
    }

    let candidate = if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    let parsed = Url::parse(&candidate);
    let Some((host, path, has_query)) = parsed
        .as_ref()
        .ok()
        .and_then(|u| Some((u.host_str()?.to_string(), u.path().to_string(), u.query().is_some())))
    else {
        return format!("{}...", take_chars(url, max.saturating_sub(3)));
    };

    if path.is_empty() || path == "/" {
        return host;
    }
    let host_len = host.chars().count();
    if host_len + 5 >= max {
        return format!("{}...", take_chars(&host, max.saturating_sub(3)));
    }

    let room = max - host_len - 5;
    if path.chars().count() <= room {
        let tail = if has_query { "..." } else { "" };
        format!("{}{}{}", host, path, tail)
    } else {
        format!("{}{}...", host, take_chars(&path, room))
    }
}

/// Heuristics-aware shortcut for [`truncate_url_with`].
pub fn display_url(url: &str, heuristics: &Heuristics) -> String {
    truncate_url_with(url, heuristics.max_url_display, &heuristics.search_engines)
}

/// Whether a URL points at Wikipedia.
pub fn is_wikipedia(url: &str) -> bool {
    url.to_ascii_lowercase().contains("wikipedia.org")
}

/// Whether a URL is a Google search.
pub fn is_google_search(url: &str) -> bool {
    url.to_ascii_lowercase().contains("google.com/search")
}

/// The raw article segment of a Wikipedia `/wiki/` URL.
pub fn wikipedia_article(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/wiki/")?;
    let article = rest.split(['#', '?', '&']).next().unwrap_or("");
    (!article.is_empty()).then_some(article)
}

/// `Wikipedia: Title Cased Article`, or plain `Wikipedia` without an article.
pub fn wikipedia_display(url: &str) -> String {
    match wikipedia_article(url) {
        Some(article) => {
            let decoded = urlencoding::decode(article)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| article.to_string());
            format!("Wikipedia: {}", title_case(&decoded.replace('_', " ")))
        }
        None => "Wikipedia".to_string(),
    }
}

/// Canonical English Wikipedia URL for an article link.
pub fn wikipedia_canonical(url: &str) -> Option<String> {
    wikipedia_article(url).map(|article| format!("https://en.wikipedia.org/wiki/{}", article))
}

/// Whether text looks like a URL rather than prose.
pub fn looks_like_url(text: &str) -> bool {
    let text = text.trim();
    !text.contains(char::is_whitespace)
        && (text.starts_with("http://") || text.starts_with("https://") || text.starts_with("www."))
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
