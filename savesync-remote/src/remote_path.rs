//! Remote path normalization.
//!
//! Operators type remote paths the way their desktop shows them, which is
//! often `C:\Users\...`. SFTP servers on Windows disagree on whether such a
//! path must be written `/C:/Users/...`, so callers probe every candidate
//! returned by [`candidates`] in order.

/// Canonical POSIX form: backslashes become slashes, surrounding whitespace
/// and trailing slashes are trimmed, repeated slashes collapse.
///
/// A path made only of slashes normalizes to `/`.
pub fn normalize(raw: &str) -> String {
    let replaced = raw.trim().replace('\\', "/");
    let mut out = String::with_capacity(replaced.len());
    let mut prev_slash = false;
    for c in replaced.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    let trimmed = out.trim_end_matches('/').trim_end();
    if trimmed.is_empty() && out.starts_with('/') {
        return "/".to_string();
    }
    trimmed.to_string()
}

fn looks_like_drive_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

/// Ordered, deduplicated reinterpretations of `raw`.
///
/// A drive-letter path `X:/...` yields `/X:/...` first, then the plain
/// normalized form. Anything else yields only the normalized form.
pub fn candidates(raw: &str) -> Vec<String> {
    let cleaned = normalize(raw);
    let mut list = Vec::with_capacity(2);
    if looks_like_drive_path(&cleaned) && !cleaned.starts_with('/') {
        list.push(format!("/{cleaned}"));
    }
    if !list.contains(&cleaned) {
        list.push(cleaned);
    }
    list
}

/// First candidate; the path used when something has to be created.
pub fn primary(raw: &str) -> String {
    candidates(raw)
        .into_iter()
        .next()
        .unwrap_or_else(|| normalize(raw))
}

/// `parent/name` without doubling the separator.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Last non-empty path segment, if any.
pub fn last_segment(raw: &str) -> Option<String> {
    normalize(raw)
        .split('/')
        .filter(|s| !s.trim().is_empty())
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_mixed_separators() {
        assert_eq!(normalize("C:\\saves\\\\game\\"), "C:/saves/game");
        assert_eq!(normalize("  /srv//saves/ "), "/srv/saves");
        assert_eq!(normalize("relative/dir///"), "relative/dir");
    }

    #[test]
    fn normalize_keeps_root() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("\\\\"), "/");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn drive_path_gets_rooted_candidate_first() {
        assert_eq!(
            candidates("C:/saves/game"),
            vec!["/C:/saves/game".to_string(), "C:/saves/game".to_string()]
        );
        assert_eq!(
            candidates("d:\\Games\\Saves\\"),
            vec!["/d:/Games/Saves".to_string(), "d:/Games/Saves".to_string()]
        );
    }

    #[test]
    fn posix_path_has_single_candidate() {
        assert_eq!(candidates("/srv/saves"), vec!["/srv/saves".to_string()]);
        assert_eq!(candidates("/C:/saves"), vec!["/C:/saves".to_string()]);
        assert_eq!(candidates("saves/slot1"), vec!["saves/slot1".to_string()]);
    }

    #[test]
    fn bare_drive_letter_is_not_a_drive_path() {
        // `C:` without a following slash is ambiguous; leave it alone.
        assert_eq!(candidates("C:"), vec!["C:".to_string()]);
    }

    #[test]
    fn primary_is_first_candidate() {
        assert_eq!(primary("C:\\saves"), "/C:/saves");
        assert_eq!(primary("/srv/x/"), "/srv/x");
    }

    #[test]
    fn join_and_last_segment() {
        assert_eq!(join("/srv/saves", "slot1"), "/srv/saves/slot1");
        assert_eq!(join("/", "srv"), "/srv");
        assert_eq!(join("", "rel"), "rel");
        assert_eq!(last_segment("C:\\Users\\me\\Saves\\").as_deref(), Some("Saves"));
        assert_eq!(last_segment("/"), None);
    }
}
