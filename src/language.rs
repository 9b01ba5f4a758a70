use crate::config::LanguageKeywords;

/// Keyword-first language detection with Unicode range fallback. Keyword
/// sets come from configuration and are checked in order; the first set
/// with a hit wins. When no keyword matches, character ranges decide, and
/// anything left over is reported as English.
pub struct LanguageDetector {
    keyword_sets: Vec<LanguageKeywords>,
}

impl LanguageDetector {
    pub fn new(keyword_sets: &[LanguageKeywords]) -> Self {
        Self {
            keyword_sets: keyword_sets.to_vec(),
        }
    }

    pub fn detect(&self, text: &str) -> String {
        let text_lower = text.to_lowercase();
        for set in &self.keyword_sets {
            if set
                .keywords
                .iter()
                .any(|keyword| text_lower.contains(&keyword.to_lowercase()))
            {
                return set.language.clone();
            }
        }

        if Self::contains_cyrillic(text) {
            return "Russian".to_string();
        }
        if Self::contains_hangul(text) {
            return "Korean".to_string();
        }
        if Self::contains_cjk(text) {
            return "Chinese/Japanese".to_string();
        }
        if Self::contains_arabic(text) {
            return "Arabic".to_string();
        }
        if Self::contains_accented_latin(text) {
            return "Spanish".to_string();
        }

        "English".to_string()
    }

    fn contains_cyrillic(text: &str) -> bool {
        text.chars().any(|c| {
            // Cyrillic: U+0400–U+04FF
            // Cyrillic Supplement: U+0500–U+052F
            matches!(c,
                '\u{0400}'..='\u{04FF}' |
                '\u{0500}'..='\u{052F}'
            )
        })
    }

    fn contains_hangul(text: &str) -> bool {
        text.chars().any(|c| {
            // Hangul Syllables: U+AC00–U+D7AF
            // Hangul Jamo: U+1100–U+11FF
            // Hangul Compatibility Jamo: U+3130–U+318F
            matches!(c,
                '\u{AC00}'..='\u{D7AF}' |
                '\u{1100}'..='\u{11FF}' |
                '\u{3130}'..='\u{318F}'
            )
        })
    }

    fn contains_cjk(text: &str) -> bool {
        text.chars().any(|c| {
            // CJK Unified Ideographs: U+4E00–U+9FAF
            // CJK Unified Ideographs Extension A: U+3400–U+4DBF
            matches!(c,
                '\u{4E00}'..='\u{9FAF}' |
                '\u{3400}'..='\u{4DBF}'
            )
        })
    }

    fn contains_arabic(text: &str) -> bool {
        text.chars().any(|c| {
            // Arabic: U+0600–U+06FF
            // Arabic Supplement: U+0750–U+077F
            matches!(c,
                '\u{0600}'..='\u{06FF}' |
                '\u{0750}'..='\u{077F}'
            )
        })
    }

    fn contains_accented_latin(text: &str) -> bool {
        text.chars().any(|c| {
            matches!(
                c,
                'á' | 'é' | 'í' | 'ó' | 'ú' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'ñ' | 'Ñ' | 'ü' | 'Ü'
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn detector() -> LanguageDetector {
        LanguageDetector::new(&AnalysisConfig::default().language_keywords)
    }

    #[test]
    fn test_keyword_detection() {
        let detector = detector();
        assert_eq!(detector.detect("hola, como estas"), "Spanish");
        assert_eq!(detector.detect("bonjour tout le monde"), "French");
        assert_eq!(detector.detect("hallo, danke!"), "German");
    }

    #[test]
    fn test_cyrillic_fallback() {
        // not in the keyword lists, caught by the character range
        assert_eq!(detector().detect("Срочное уведомление"), "Russian");
    }

    #[test]
    fn test_hangul_fallback() {
        assert_eq!(detector().detect("긴급 보안 알림"), "Korean");
    }

    #[test]
    fn test_cjk_fallback() {
        assert_eq!(detector().detect("你好"), "Chinese/Japanese");
        assert_eq!(detector().detect("こんにちは漢字"), "Chinese/Japanese");
    }

    #[test]
    fn test_arabic_fallback() {
        assert_eq!(detector().detect("مرحبا"), "Arabic");
    }

    #[test]
    fn test_accented_latin_fallback() {
        assert_eq!(detector().detect("atención inmediata"), "Spanish");
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(detector().detect("Hello World"), "English");
        assert_eq!(detector().detect(""), "English");
    }

    #[test]
    fn test_keywords_win_over_ranges() {
        // Russian keyword present alongside Korean characters; keyword
        // lists are checked first and Russian is listed first
        assert_eq!(detector().detect("привет 안녕"), "Russian");
    }
}
