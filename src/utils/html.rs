use ammonia;

/// Clean user-supplied text using the ammonia library.
///
/// Comment text and profile bios are stored verbatim and rendered by the
/// client, so they are sanitized on the way in: safe tags survive, script
/// tags, iframes and event-handler attributes are stripped. This is the
/// fail-safe against Stored XSS.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
