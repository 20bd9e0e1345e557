//! Metric value normalization.

/// Characters allowed around the digits of a "pure" number.
const NUMBER_DECORATIONS: [char; 4] = ['K', 'M', '.', ','];

/// True for plain numbers such as `125`, `40K` or `1.5M`.
pub fn is_plain_number(metric: &str) -> bool {
    let mut digits = metric.chars().filter(|c| !NUMBER_DECORATIONS.contains(c)).peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}

/// Mark plain numbers with a trailing `+` and cap the result at `max_chars`.
pub fn normalize(metric: &str, max_chars: usize) -> String {
    let metric = metric.trim();
    let capped: String = metric.chars().take(max_chars).collect();
    if !is_plain_number(&capped) {
        return capped;
    }
    let mut marked: String = capped.chars().take(max_chars.saturating_sub(1)).collect();
    marked.push('+');
    marked
}
