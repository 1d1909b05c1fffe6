/// Reduces a client-supplied filename to a safe single path component,
/// the way werkzeug's `secure_filename` does.
///
/// Path separators become word breaks, whitespace runs join with `_`,
/// anything other than ASCII alphanumerics, `.`, `_` and `-` is removed,
/// and `.`/`_` are stripped from both ends. Unlike werkzeug, non-ASCII
/// letters are dropped rather than transliterated first. May return an
/// empty string.
pub fn secure_filename(raw: &str) -> String {
    let spaced = raw.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
        .collect();
    kept.trim_matches(['.', '_']).to_owned()
}

/// Whether `name` is a plain file name safe to join onto a directory.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}
