//! Helpers for leaving fenced code blocks alone while rewriting Markdown.

/// Apply `f` to every stretch of text outside fenced code blocks.
///
/// Fence lines and their contents are copied through untouched. An unclosed
/// fence runs to the end of the text, as in CommonMark.
pub(crate) fn map_unfenced<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut chunk = String::new();
    let mut open_fence: Option<(char, usize)> = None;

    for line in text.split_inclusive('\n') {
        match open_fence {
            Some((ch, len)) => {
                out.push_str(line);
                if closes_fence(line, ch, len) {
                    open_fence = None;
                }
            }
            None => {
                if let Some(fence) = opening_fence(line) {
                    out.push_str(&f(&chunk));
                    chunk.clear();
                    out.push_str(line);
                    open_fence = Some(fence);
                } else {
                    chunk.push_str(line);
                }
            }
        }
    }
    if !chunk.is_empty() {
        out.push_str(&f(&chunk));
    }
    out
}

/// Lines outside fenced code blocks as `(byte offset, line)` pairs.
///
/// The line excludes its `\n`. Fence delimiter lines are not returned.
pub(crate) fn unfenced_lines(text: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut open_fence: Option<(char, usize)> = None;
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        match open_fence {
            Some((ch, len)) => {
                if closes_fence(line, ch, len) {
                    open_fence = None;
                }
            }
            None => match opening_fence(line) {
                Some(fence) => open_fence = Some(fence),
                None => lines.push((offset, line)),
            },
        }
        offset += raw.len();
    }
    lines
}

fn fence_prefix(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    Some(&line[indent..])
}

fn opening_fence(line: &str) -> Option<(char, usize)> {
    let rest = fence_prefix(line)?;
    let ch = rest.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = rest.chars().take_while(|&c| c == ch).count();
    if len < 3 {
        return None;
    }
    // A backtick fence's info string may not contain backticks.
    if ch == '`' && rest[len..].contains('`') {
        return None;
    }
    Some((ch, len))
}

fn closes_fence(line: &str, ch: char, len: usize) -> bool {
    let Some(rest) = fence_prefix(line) else {
        return false;
    };
    let run = rest.chars().take_while(|&c| c == ch).count();
    run >= len && rest[run * ch.len_utf8()..].trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_untouched() {
        let text = "a\n```\na\n```\na\n";
        let out = map_unfenced(text, |s| s.replace('a', "b"));
        assert_eq!(out, "b\n```\na\n```\nb\n");
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let text = "a\n~~~~\na\n~~~\na";
        let out = map_unfenced(text, |s| s.replace('a', "b"));
        assert_eq!(out, "b\n~~~~\na\n~~~\na");
    }

    #[test]
    fn test_unfenced_lines() {
        let text = "a\n```rust\ncode\n```\nb";
        assert_eq!(unfenced_lines(text), vec![(0, "a"), (19, "b")]);
    }

    #[test]
    fn test_no_fence() {
        assert_eq!(map_unfenced("abc", |s| s.to_uppercase()), "ABC");
        assert_eq!(map_unfenced("", |s| s.to_uppercase()), "");
    }
}
