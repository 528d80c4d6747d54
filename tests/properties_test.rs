//! Property tests for the invariants of the text and table stages.

use mdreport::parser::parse_html;
use mdreport::render::summary::cleanup_bullets;
use mdreport::render::tables::{
    document_font_scale, widths_from_scores, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH,
    MIN_DOCUMENT_SCALE,
};
use mdreport::render::{
    is_gsm_char, normalize_characters, normalize_markdown_spacing, to_gsm, CleanupOptions,
    CleanupPipeline,
};
use mdreport::Heuristics;
use proptest::prelude::*;

fn markdown_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("# Heading".to_string()),
        Just("## Executive Summary".to_string()),
        Just("## Details".to_string()),
        Just("Drive growth in new markets".to_string()),
        Just("- bullet".to_string()),
        Just("1. numbered".to_string()),
        "[a-z ]{1,20}",
    ]
}

fn markdown_document() -> impl Strategy<Value = String> {
    (prop::collection::vec(markdown_line(), 0..20), any::<bool>()).prop_map(|(lines, crlf)| {
        lines.join(if crlf { "\r\n" } else { "\n" })
    })
}

fn bullet_list() -> impl Strategy<Value = String> {
    let item = (
        prop::collection::vec(prop::sample::select(vec!['•', '-', '–', '—']), 0..3),
        "[A-Za-z0-9%]{1,10}",
    )
        .prop_map(|(glyphs, text)| {
            let prefix: String = glyphs.iter().map(|g| format!("{} ", g)).collect();
            format!("<li>{}{}</li>", prefix, text)
        });
    prop::collection::vec(item, 1..6).prop_map(|items| format!("<ul>{}</ul>", items.concat()))
}

proptest! {
    #[test]
    fn test_character_normalization_idempotent(text in ".*") {
        let once = normalize_characters(&text);
        prop_assert_eq!(normalize_characters(&once), once.clone());
        prop_assert!(once.chars().count() <= text.chars().count());
    }

    #[test]
    fn test_cleanup_idempotent(
        text in r"[a1 .*_#`~\\\n-]{0,40}",
        gdocs in any::<bool>(),
        transliterate in any::<bool>(),
    ) {
        let pipeline = CleanupPipeline::new(CleanupOptions {
            fix_gdocs: gdocs,
            transliterate,
            ..CleanupOptions::standard()
        });
        let once = pipeline.process(&text);
        prop_assert_eq!(pipeline.process(&once), once);
    }

    #[test]
    fn test_gsm_output_alphabet(text in ".*") {
        let gsm = to_gsm(&text);
        prop_assert!(gsm.chars().all(|c| is_gsm_char(c) || c.is_whitespace()));
    }

    #[test]
    fn test_spacing_idempotent(text in markdown_document()) {
        let heuristics = Heuristics::default();
        let once = normalize_markdown_spacing(&text, &heuristics);
        let twice = normalize_markdown_spacing(&once, &heuristics);
        prop_assert_eq!(&twice, &once);
        prop_assert!(!once.contains("\n\n\n"));
        prop_assert!(!once.contains('\r'));
    }

    #[test]
    fn test_bullet_cleanup_idempotent(html in bullet_list()) {
        let heuristics = Heuristics::default();
        let mut dom = parse_html(&html);
        cleanup_bullets(&mut dom, &heuristics);
        let once = dom.to_html();
        prop_assert_eq!(cleanup_bullets(&mut dom, &heuristics), 0);
        prop_assert_eq!(dom.to_html(), once);
    }

    #[test]
    fn test_column_widths_bounded(scores in prop::collection::vec(0.0f64..500.0, 2..=20)) {
        let widths = widths_from_scores(&scores);
        prop_assert_eq!(widths.len(), scores.len());
        for width in &widths {
            prop_assert!(*width >= MIN_COLUMN_WIDTH - 1e-6);
            prop_assert!(*width <= MAX_COLUMN_WIDTH + 1e-6);
        }
        let total: f64 = widths.iter().sum();
        prop_assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_document_scale_floor(scales in prop::collection::vec(0.0f64..1.5, 0..10)) {
        prop_assert!(document_font_scale(&scales) >= MIN_DOCUMENT_SCALE);
    }
}
