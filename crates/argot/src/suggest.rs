//! Typo suggestions for unresolved subcommands.

/// Minimum overlap score for a name to be suggested.
pub const SUGGESTION_THRESHOLD: usize = 3;

/// Positional character overlap between an unresolved token and a name.
///
/// For each position `i` of `token`, one point is scored when `name` has the
/// same character at `i` or `i + 1`.
pub fn overlap_score(token: &str, name: &str) -> usize {
    let name: Vec<char> = name.chars().collect();
    token
        .chars()
        .enumerate()
        .filter(|(i, c)| name.get(*i) == Some(c) || name.get(i + 1) == Some(c))
        .count()
}

/// Names scoring at least [`SUGGESTION_THRESHOLD`], in the order given.
pub fn suggest<'a, I>(token: &str, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| overlap_score(token, name) >= SUGGESTION_THRESHOLD)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_same_or_next_position() {
        assert_eq!(overlap_score("image", "image"), 5);
        // g and e match one position later in the name
        assert_eq!(overlap_score("imge", "image"), 4);
        // the swapped `a` finds neither `g` nor `e`
        assert_eq!(overlap_score("imgae", "image"), 4);
        assert_eq!(overlap_score("mgi", "image"), 1);
        assert_eq!(overlap_score("xyz", "image"), 0);
        assert_eq!(overlap_score("", "image"), 0);
    }

    #[test]
    fn keeps_declaration_order() {
        let names = ["images", "image", "container"];
        assert_eq!(suggest("imag", names), ["images", "image"]);
    }

    #[test]
    fn invalid_scores_container_but_not_image() {
        assert_eq!(overlap_score("invalid", "image"), 1);
        assert_eq!(overlap_score("invalid", "container"), 3);
        assert_eq!(suggest("invalid", ["image", "container"]), ["container"]);
    }
}
