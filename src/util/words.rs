/// Turns an underscore-separated identifier into a label (e.g., "in_progress" -> "In Progress").
///
/// Every token is capitalized and the rest lowercased. Empty tokens are kept, so repeated
/// underscores produce repeated spaces.
pub fn format_words(words: &str) -> String {
    words
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}
