//! Single-button direction heuristic: CJK-heavy text goes to the Latin
//! language, everything else goes to CJK.

use crate::constants::CJK_RATIO_THRESHOLD;
use crate::models::TranslateDirection;

fn is_cjk(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// Share of CJK ideographs relative to the UTF-16 length of `text`.
pub fn cjk_ratio(text: &str) -> f64 {
    let total = text.encode_utf16().count();
    if total == 0 {
        return 0.0;
    }
    let cjk = text.chars().filter(|c| is_cjk(*c)).count();
    cjk as f64 / total as f64
}

pub fn detect_direction(text: &str) -> TranslateDirection {
    let total = text.encode_utf16().count() as f64;
    let cjk = text.chars().filter(|c| is_cjk(*c)).count() as f64;
    if cjk > total * CJK_RATIO_THRESHOLD {
        TranslateDirection::CjkToLatin
    } else {
        TranslateDirection::LatinToCjk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_text_targets_cjk() {
        let dir = detect_direction("hello world");
        assert_eq!(dir, TranslateDirection::LatinToCjk);
        assert_eq!(dir.from_lang(), "auto");
        assert_eq!(dir.to_lang(), "zh");
    }

    #[test]
    fn cjk_text_targets_latin() {
        assert_eq!(detect_direction("你好世界"), TranslateDirection::CjkToLatin);
        assert_eq!(detect_direction("你好世界").to_lang(), "en");
    }

    #[test]
    fn threshold_is_strictly_greater() {
        // 1 ideograph in 5 units is exactly 20%: stays Latin -> CJK.
        assert_eq!(detect_direction("猫abcd"), TranslateDirection::LatinToCjk);
        assert_eq!(detect_direction("猫abc"), TranslateDirection::CjkToLatin);
        assert!((cjk_ratio("猫abcd") - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn mixed_prompt_with_few_ideographs_targets_cjk() {
        assert_eq!(
            detect_direction("masterpiece, best quality, 1girl, 猫"),
            TranslateDirection::LatinToCjk
        );
    }
}
