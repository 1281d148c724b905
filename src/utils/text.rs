/// 問句正規化：轉小寫、非英數字元換成空白、合併連續空白
pub fn normalize(text: &str) -> String {
    let lowered: String = text
        .chars()
        .flat_map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![' ']
            }
        })
        .collect();

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 判斷 `phrase` 是否以完整單字片語出現在 `haystack` 中
///
/// 兩者都必須先經過 [`normalize`]。
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let padded_haystack = format!(" {} ", haystack);
    let padded_phrase = format!(" {} ", phrase);
    padded_haystack.contains(&padded_phrase)
}
