//! Resolve user-typed references (full id, short id, or name) to records.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Pick the single item whose id starts with `query` or whose name equals
/// it, ignoring case. An exact name match wins over id prefixes.
pub fn find_unique<T>(
    items: impl IntoIterator<Item = T>,
    kind: &'static str,
    query: &str,
    id_of: impl Fn(&T) -> Uuid,
    name_of: impl Fn(&T) -> &str,
) -> CoreResult<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(CoreError::NoMatch {
            kind,
            query: query.to_string(),
        });
    }

    let mut by_name = Vec::new();
    let mut by_id = Vec::new();
    for item in items {
        if name_of(&item).to_lowercase() == needle {
            by_name.push(item);
        } else if id_of(&item).to_string().starts_with(&needle) {
            by_id.push(item);
        }
    }

    let candidates = if by_name.is_empty() { by_id } else { by_name };
    let mut candidates = candidates.into_iter();
    match (candidates.next(), candidates.next()) {
        (Some(found), None) => Ok(found),
        (None, _) => Err(CoreError::NoMatch {
            kind,
            query: query.to_string(),
        }),
        (Some(_), Some(_)) => Err(CoreError::Ambiguous {
            kind,
            query: query.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<(Uuid, &'static str)> {
        vec![
            (Uuid::parse_str("aaaa1111-0000-4000-8000-000000000000").unwrap(), "Nick"),
            (Uuid::parse_str("aaaa2222-0000-4000-8000-000000000000").unwrap(), "Hancock"),
            (Uuid::parse_str("bbbb3333-0000-4000-8000-000000000000").unwrap(), "aaaa"),
        ]
    }

    fn find(query: &str) -> CoreResult<(Uuid, &'static str)> {
        find_unique(items(), "character", query, |i| i.0, |i| i.1)
    }

    #[test]
    fn by_name_ignores_case() {
        assert_eq!(find("hancock").unwrap().1, "Hancock");
    }

    #[test]
    fn by_id_prefix() {
        assert_eq!(find("aaaa1").unwrap().1, "Nick");
        assert_eq!(find("aaaa1111-0000-4000-8000-000000000000").unwrap().1, "Nick");
    }

    #[test]
    fn name_beats_prefix() {
        assert_eq!(find("AAAA").unwrap().1, "aaaa");
    }

    #[test]
    fn ambiguous_and_missing() {
        assert_eq!(find("aaaa").unwrap().1, "aaaa");
        assert_eq!(
            find_unique(items(), "character", "aaa", |i| i.0, |i| i.1)
                .unwrap_err()
                .code(),
            "ambiguous"
        );
        assert_eq!(find("zzz").unwrap_err().code(), "no_match");
        assert_eq!(find("  ").unwrap_err().code(), "no_match");
    }
}
