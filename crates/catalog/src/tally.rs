use std::collections::HashMap;
use std::hash::Hash;

/// Count how often each item occurs and return the most frequent one.
///
/// Ties go to the item that was seen first: counts are kept in first-seen
/// order and the winner is only replaced by a strictly greater count.
/// Returns `None` for an empty input.
pub(crate) fn first_max<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Option<(T, u64)> {
    let mut index: HashMap<T, usize> = HashMap::new();
    let mut tallies: Vec<(T, u64)> = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&i) => tallies[i].1 += 1,
            None => {
                index.insert(item.clone(), tallies.len());
                tallies.push((item, 1));
            },
        }
    }
    let mut winner: Option<(T, u64)> = None;
    for (item, count) in tallies {
        if winner.as_ref().is_none_or(|(_, best)| count > *best) {
            winner = Some((item, count));
        }
    }
    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec!["A", "A", "B"], Some(("A", 2)))]
    #[case(vec!["B", "A", "A"], Some(("A", 2)))]
    #[case(vec!["A", "B"], Some(("A", 1)))]
    #[case(vec!["B", "A", "A", "B"], Some(("B", 2)))]
    #[case(vec!["C"], Some(("C", 1)))]
    #[case(vec![], None)]
    fn test_first_max(#[case] items: Vec<&str>, #[case] expected: Option<(&str, u64)>) {
        assert_eq!(first_max(items), expected);
    }
}
