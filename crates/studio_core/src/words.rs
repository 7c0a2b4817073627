/// Count the billable units in a generation request.
///
/// One unit per whitespace-delimited word; empty or whitespace-only text is zero.
///
/// # Examples
///
/// ```
/// use studio_core::count_words;
///
/// assert_eq!(count_words("  hello   brave\tnew\nworld "), 4);
/// assert_eq!(count_words(" \n\t "), 0);
/// ```
pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count().try_into().unwrap_or(u32::MAX)
}
