//! Подготовка текста уведомлений.

/// Маркер обрезки, занимает ровно один символ.
pub const ELLIPSIS: char = '…';

/// Схлопывает любые последовательности пробельных символов в один пробел
/// и убирает пробелы по краям.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Обрезает строку до `max_chars` символов (не байт).
///
/// Если строка длиннее лимита, остаются первые `max_chars - 1` символов и `…`,
/// так что результат всегда укладывается в лимит.
pub fn truncate_body(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push(ELLIPSIS);
    truncated
}
