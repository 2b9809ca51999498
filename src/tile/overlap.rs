//! Overlap resolution rules
//!
//! Resolution table, first matching row wins:
//!
//! | condition                               | dominated          |
//! |-----------------------------------------|--------------------|
//! | both blockers                           | none               |
//! | exactly one blocker                     | the non-blocker    |
//! | identical priority, age and scale       | none               |
//! | `Shade`, less fit species shade-tolerant| none               |
//! | otherwise                               | the less fit one   |
//!
//! Fitness compares overlap priority, then age, then scale.

use std::cmp::Ordering;

use crate::spatial::OverlapKind;
use crate::tile::instance::Instance;

/// Which side of an overlapping pair loses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Orders two instances by fitness; `Less` means `a` is less fit
fn compare_fitness(a: &Instance, b: &Instance) -> Ordering {
    a.species
        .overlap_priority
        .cmp(&b.species.overlap_priority)
        .then_with(|| a.age.total_cmp(&b.age))
        .then_with(|| a.scale.total_cmp(&b.scale))
}

/// Decide which instance of an overlapping pair is suppressed
pub fn domination(a: &Instance, b: &Instance, kind: OverlapKind) -> Option<Side> {
    let loser = match (a.blocker, b.blocker) {
        (true, true) => return None,
        (true, false) => Side::B,
        (false, true) => Side::A,
        (false, false) => match compare_fitness(a, b) {
            Ordering::Less => Side::A,
            Ordering::Greater => Side::B,
            Ordering::Equal => return None,
        },
    };

    if kind == OverlapKind::Shade {
        let loser_species = match loser {
            Side::A => &a.species,
            Side::B => &b.species,
        };
        if loser_species.can_grow_in_shade {
            return None;
        }
    }
    Some(loser)
}
