//! Section Sanitizer — normalizes raw free-text blocks into canonical
//! `(id, title, text)` records before anything else touches them.
//!
//! Pure and idempotent: `sanitize(sanitize(x)) == sanitize(x)`.

use crate::review::models::{RawSection, Section};

/// Normalizes caller-submitted sections.
///
/// - Missing/blank id → `section-{index+1}`
/// - Missing/blank title → `セクション{index+1}`
/// - Text is trimmed; sections whose trimmed text is empty are dropped.
///
/// Indices refer to the position in the *input* list, so ids stay stable
/// when blank sections are dropped.
pub fn sanitize_sections(raw: &[RawSection]) -> Vec<Section> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, section)| {
            let text = section.text.trim();
            if text.is_empty() {
                return None;
            }

            let id = section
                .id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("section-{}", index + 1));

            let title = section
                .title
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("セクション{}", index + 1));

            Some(Section {
                id,
                title,
                text: text.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: Option<&str>, title: Option<&str>, text: &str) -> RawSection {
        RawSection {
            id: id.map(String::from),
            title: title.map(String::from),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_blank_section_is_dropped() {
        let input = vec![
            raw(Some("s1"), Some("自己紹介"), "  "),
            raw(Some("s2"), Some("経験"), "5年間開発"),
        ];
        let out = sanitize_sections(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "s2");
        assert_eq!(out[0].text, "5年間開発");
    }

    #[test]
    fn test_missing_id_gets_positional_fallback() {
        let input = vec![raw(None, Some("経験"), "text"), raw(None, None, "more")];
        let out = sanitize_sections(&input);
        assert_eq!(out[0].id, "section-1");
        assert_eq!(out[1].id, "section-2");
    }

    #[test]
    fn test_missing_title_gets_placeholder() {
        let input = vec![raw(Some("s1"), None, "text"), raw(Some("s2"), Some("  "), "t")];
        let out = sanitize_sections(&input);
        assert_eq!(out[0].title, "セクション1");
        assert_eq!(out[1].title, "セクション2");
    }

    #[test]
    fn test_text_is_trimmed() {
        let input = vec![raw(Some("s1"), Some("t"), "  body \n")];
        let out = sanitize_sections(&input);
        assert_eq!(out[0].text, "body");
    }

    #[test]
    fn test_dropped_sections_do_not_shift_fallback_ids() {
        // The blank first section still consumes index 1.
        let input = vec![raw(None, None, "   "), raw(None, None, "kept")];
        let out = sanitize_sections(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "section-2");
        assert_eq!(out[0].title, "セクション2");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let input = vec![
            raw(None, None, " 自己紹介の本文 "),
            raw(Some(" s2 "), Some("経験"), "開発経験"),
            raw(Some("s3"), Some("空"), "\t\n"),
        ];
        let once = sanitize_sections(&input);
        let again_input: Vec<RawSection> = once.iter().cloned().map(RawSection::from).collect();
        let twice = sanitize_sections(&again_input);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(sanitize_sections(&[]).is_empty());
    }
}
