/// Derives the base directory slug from a display name: lowercased ASCII
/// alphanumerics with every other run of characters collapsed to a single
/// hyphen. Collision suffixing happens at reservation time, not here.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        "alumni".to_string()
    } else {
        slug
    }
}

/// Candidate slugs for a base: `amit-sharma`, `amit-sharma-1`, `amit-sharma-2`, ...
pub fn candidate(base: &str, attempt: usize) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Amit Sharma"), "amit-sharma");
        assert_eq!(slugify("  Dr. A. P. J. Abdul Kalam  "), "dr-a-p-j-abdul-kalam");
        assert_eq!(slugify("Wing Cdr (Retd) Rakesh"), "wing-cdr-retd-rakesh");
    }

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify("a---b"), "a-b");
        assert_eq!(slugify("a & b"), "a-b");
    }

    #[test]
    fn slugify_never_returns_empty() {
        assert_eq!(slugify("!!!"), "alumni");
        assert_eq!(slugify(""), "alumni");
    }

    #[test]
    fn candidate_suffixes_after_first_attempt() {
        assert_eq!(candidate("amit-sharma", 0), "amit-sharma");
        assert_eq!(candidate("amit-sharma", 1), "amit-sharma-1");
        assert_eq!(candidate("amit-sharma", 7), "amit-sharma-7");
    }
}
