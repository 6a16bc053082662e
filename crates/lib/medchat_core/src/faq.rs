//! FAQ question matching.
//!
//! Matching is exact equality after normalization: lowercase, trim, and
//! fold accented Latin letters to their base letter. There is no ranking.

use crate::models::FaqEntry;

/// Answer returned when no stored question matches.
pub const FALLBACK_ANSWER: &str = "Désolé, je n'ai pas de réponse à cela.";

/// Fold one lowercase Latin-1 / Latin Extended-A letter to ASCII.
/// Returns an empty string when there is nothing to strip.
fn fold_char(c: char) -> &'static str {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => "",
    }
}

/// Lowercase, trim and strip diacritics.
pub fn normalize_question(question: &str) -> String {
    let lowered = question.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match fold_char(c) {
            "" => out.push(c),
            folded => out.push_str(folded),
        }
    }
    out
}

/// First entry whose normalized question equals the normalized input.
pub fn find_match<'a>(entries: &'a [FaqEntry], question: &str) -> Option<&'a FaqEntry> {
    let wanted = normalize_question(question);
    entries
        .iter()
        .find(|entry| normalize_question(&entry.question) == wanted)
}

/// The matched answer, or [`FALLBACK_ANSWER`].
pub fn answer_for(entries: &[FaqEntry], question: &str) -> String {
    find_match(entries, question)
        .map(|entry| entry.answer.clone())
        .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
}
