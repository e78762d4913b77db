use std::collections::HashSet;
use uuid::Uuid;

/// Rows to insert and delete to turn one id set into another.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetDiff {
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
}

impl SetDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Keeps the requested ids that are eligible, dropping the rest and any
/// duplicates. Request order is preserved.
pub fn eligible_subset(requested: &[Uuid], eligible: &HashSet<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .copied()
        .filter(|id| eligible.contains(id) && seen.insert(*id))
        .collect()
}

pub fn diff(current: &[Uuid], desired: &[Uuid]) -> SetDiff {
    let current_set: HashSet<Uuid> = current.iter().copied().collect();
    let desired_set: HashSet<Uuid> = desired.iter().copied().collect();

    SetDiff {
        added: desired
            .iter()
            .copied()
            .filter(|id| !current_set.contains(id))
            .collect(),
        removed: current
            .iter()
            .copied()
            .filter(|id| !desired_set.contains(id))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ineligible_ids_are_dropped() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let eligible: HashSet<Uuid> = [a, b].into_iter().collect();

        assert_eq!(eligible_subset(&[b, stranger, b], &eligible), vec![b]);
        assert!(eligible_subset(&[stranger], &eligible).is_empty());
    }

    #[test]
    fn test_diff_only_touches_changes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let d = diff(&[a, b], &[b, c]);
        assert_eq!(d.added, vec![c]);
        assert_eq!(d.removed, vec![a]);

        assert!(diff(&[a, b], &[b, a]).is_empty());
    }

    #[test]
    fn test_diff_from_and_to_empty() {
        let a = Uuid::new_v4();
        assert_eq!(diff(&[], &[a]).added, vec![a]);
        assert_eq!(diff(&[a], &[]).removed, vec![a]);
    }
}
