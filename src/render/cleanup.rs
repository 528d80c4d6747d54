//! Character normalization and escape repair for pasted Markdown.

use super::fences::map_unfenced;
use super::ConvertOptions;
use regex::Regex;
use unicode_bidi::{bidi_class, BidiClass};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// GSM 03.38 basic character set.
const GSM_BASIC: &str = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞ\u{1B}ÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?¡\
                         ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";

/// GSM 03.38 extension table.
const GSM_EXTENSION: &str = "{}[~]|^€\\";

/// Symbols with a fixed GSM spelling.
const GSM_SYMBOLS: &[(char, &str)] = &[
    ('•', "*"),
    ('…', "..."),
    ('≤', "<="),
    ('≥', ">="),
    ('×', "x"),
    ('÷', "/"),
    ('°', "deg"),
];

/// Options for text cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Strip invisible characters and straighten punctuation
    pub normalize_characters: bool,

    /// Undo erroneous backslash escapes
    pub fix_escapes: bool,

    /// Drop every backslash escape and collapse blank lines
    pub fix_gdocs: bool,

    /// Reduce the text to the GSM 03.38 character set
    pub transliterate: bool,
}

impl CleanupOptions {
    /// Character normalization only.
    pub fn minimal() -> Self {
        Self {
            normalize_characters: true,
            fix_escapes: false,
            fix_gdocs: false,
            transliterate: false,
        }
    }

    /// Normalization and escape repair.
    pub fn standard() -> Self {
        Self {
            fix_escapes: true,
            ..Self::minimal()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<&ConvertOptions> for CleanupOptions {
    fn from(options: &ConvertOptions) -> Self {
        Self {
            normalize_characters: true,
            fix_escapes: options.fix_escapes,
            fix_gdocs: options.fix_gdocs,
            transliterate: !options.preserve_unicode,
        }
    }
}

/// Text cleanup pipeline.
pub struct CleanupPipeline {
    options: CleanupOptions,
    escaped_number: Regex,
    escaped_markdown: Regex,
    escaped_any: Regex,
    blank_runs: Regex,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self {
            options,
            escaped_number: Regex::new(r"(\d+)\\+\.").unwrap(),
            escaped_markdown: Regex::new(r"\\+([._*{}\[\]()#+\-!])").unwrap(),
            // Fence characters stay escaped so no new code block appears
            escaped_any: Regex::new(r"\\+([^\s`~])").unwrap(),
            blank_runs: Regex::new(r"\n{3,}").unwrap(),
        }
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.options.normalize_characters {
            result = normalize_characters(&result);
        }

        if self.options.transliterate {
            result = to_gsm(&result);
        }

        // Code blocks keep their backslashes
        if self.options.fix_escapes || self.options.fix_gdocs {
            result = map_unfenced(&result, |chunk| self.repair_escapes(chunk));
        }

        if self.options.fix_gdocs {
            result = self.blank_runs.replace_all(&result, "\n\n").into_owned();
        }

        result
    }

    fn repair_escapes(&self, text: &str) -> String {
        let mut result = text.to_string();
        if self.options.fix_escapes {
            result = self.escaped_number.replace_all(&result, "$1.").into_owned();
            result = self.escaped_markdown.replace_all(&result, "$1").into_owned();
        }
        if self.options.fix_gdocs {
            result = self.escaped_any.replace_all(&result, "$1").into_owned();
        }
        result
    }
}

impl Default for CleanupPipeline {
    fn default() -> Self {
        Self::new(CleanupOptions::default())
    }
}

/// Strip invisible code points and canonicalize typographic punctuation.
///
/// Idempotent, never lengthens the text.
pub fn normalize_characters(text: &str) -> String {
    text.chars()
        .filter(|&c| !is_invisible(c))
        .map(|c| match c {
            '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => ' ',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            other => other,
        })
        .collect()
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    ) || matches!(
        bidi_class(c),
        BidiClass::LRE
            | BidiClass::RLE
            | BidiClass::LRO
            | BidiClass::RLO
            | BidiClass::PDF
            | BidiClass::LRI
            | BidiClass::RLI
            | BidiClass::FSI
            | BidiClass::PDI
    )
}

/// Whether a character can be sent in the GSM 03.38 alphabet.
pub fn is_gsm_char(c: char) -> bool {
    GSM_BASIC.contains(c) || GSM_EXTENSION.contains(c)
}

/// Transliterate to the GSM 03.38 character set.
///
/// Whitespace survives, known symbols get a fixed spelling, accented letters
/// lose their marks, and anything else is dropped.
pub fn to_gsm(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_gsm_char(c) || c.is_whitespace() {
            out.push(c);
        } else if let Some((_, spelled)) = GSM_SYMBOLS.iter().find(|(s, _)| *s == c) {
            out.push_str(spelled);
        } else {
            let single = c.to_string();
            let mut base = single.nfd().filter(|&m| !is_combining_mark(m));
            if let (Some(b), None) = (base.next(), base.next()) {
                if is_gsm_char(b) {
                    out.push(b);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invisible_characters_removed() {
        let text = "a\u{200B}b\u{FEFF}c\u{202E}d\u{2066}e";
        assert_eq!(normalize_characters(text), "abcde");
    }

    #[test]
    fn test_punctuation_straightened() {
        let text = "\u{201C}Quote\u{201D} \u{2018}it\u{2019}s\u{2019} 2020\u{2013}2024\u{00A0}ok";
        assert_eq!(normalize_characters(text), "\"Quote\" 'it's' 2020-2024 ok");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let text = "\u{201C}x\u{201D}\u{2014}\u{3000}y\u{200D}";
        let once = normalize_characters(text);
        assert_eq!(normalize_characters(&once), once);
    }

    #[test]
    fn test_escaped_numbered_list() {
        let pipeline = CleanupPipeline::default();
        assert_eq!(pipeline.process("1\\. First item"), "1. First item");
        assert_eq!(
            pipeline.process("\\*\\*bold\\*\\* \\[link\\]\\(x\\) \\#tag"),
            "**bold** [link](x) #tag"
        );
    }

    #[test]
    fn test_backslash_runs_removed_at_once() {
        let pipeline = CleanupPipeline::default();
        let once = pipeline.process("a \\\\* b 2\\\\. c");
        assert_eq!(once, "a * b 2. c");
        assert_eq!(pipeline.process(&once), once);
    }

    #[test]
    fn test_gdocs_keeps_escaped_fences() {
        let pipeline = CleanupPipeline::new(CleanupOptions {
            fix_gdocs: true,
            ..CleanupOptions::standard()
        });
        let once = pipeline.process("\\`\\`\\` x\\\\y\n");
        assert_eq!(once, "\\`\\`\\` xy\n");
        assert_eq!(pipeline.process(&once), once);
    }

    #[test]
    fn test_escapes_kept_when_disabled() {
        let pipeline = CleanupPipeline::new(CleanupOptions::minimal());
        assert_eq!(pipeline.process("1\\. First"), "1\\. First");
    }

    #[test]
    fn test_escapes_in_code_kept() {
        let pipeline = CleanupPipeline::default();
        let text = "a\\_b\n```\nre = \\.\\*\n```\n";
        assert_eq!(pipeline.process(text), "a_b\n```\nre = \\.\\*\n```\n");
    }

    #[test]
    fn test_gdocs_mode() {
        let pipeline = CleanupPipeline::new(CleanupOptions {
            fix_gdocs: true,
            ..CleanupOptions::standard()
        });
        assert_eq!(pipeline.process("a\\>b\n\n\n\nc"), "a>b\n\nc");
    }

    #[test]
    fn test_gsm_transliteration() {
        assert_eq!(to_gsm("• 5°C ≥ 3 … ×"), "* 5degC >= 3 ... x");
        assert_eq!(to_gsm("naïve façade"), "naive facade");
        assert_eq!(to_gsm("é stays"), "é stays");
        assert_eq!(to_gsm("漢字 ok"), " ok");
    }

    #[test]
    fn test_from_convert_options() {
        let options = ConvertOptions::default().with_preserve_unicode(false);
        let cleanup = CleanupOptions::from(&options);
        assert!(cleanup.transliterate);
        assert!(cleanup.fix_escapes);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(CleanupPipeline::default().process(""), "");
    }
}
