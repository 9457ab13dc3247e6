//! One-line task entry: `"Buy milk #personal"`.

use super::NewTask;

/// Split quick-add text into a title and category.
///
/// A trailing `#word` token (ASCII letters, digits, underscore) after
/// whitespace becomes the category; otherwise `fallback_category` is used.
/// Returns `None` for blank input. The result is not yet validated.
pub fn parse_quick_add(text: &str, fallback_category: &str) -> Option<NewTask> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((title, tag)) = split_hashtag(text) {
        return Some(NewTask::new(title, tag.to_lowercase()));
    }

    Some(NewTask::new(text, fallback_category))
}

fn split_hashtag(text: &str) -> Option<(&str, &str)> {
    let split_at = text.rfind(char::is_whitespace)?;
    let (head, last) = text.split_at(split_at);
    let tag = last.trim_start().strip_prefix('#')?;
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if tag.is_empty() || !tag.chars().all(is_word) {
        return None;
    }

    let title = head.trim_end();
    if title.is_empty() {
        return None;
    }
    Some((title, tag))
}
