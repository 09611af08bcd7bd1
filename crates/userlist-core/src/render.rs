//! Projection of a user set onto the mount.
//!
//! `FullReplace` discards the list node and inserts a fresh one on every
//! call. `InPlace` keeps the node and patches it. It holds at most one card
//! per id, so repeated loads never accumulate duplicates.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::User;
use crate::mount::{Card, ListHandle, Mount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    #[default]
    FullReplace,
    InPlace,
}

impl FromStr for RenderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "full_replace" | "full" => Ok(RenderStrategy::FullReplace),
            "in_place" | "inplace" => Ok(RenderStrategy::InPlace),
            other => Err(format!("unknown render strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderProjector {
    strategy: RenderStrategy,
}

impl RenderProjector {
    pub fn new(strategy: RenderStrategy) -> Self {
        Self { strategy }
    }

    /// Make the mounted list show exactly `users`, in order.
    pub fn render(&self, mount: &mut Mount, users: &[User]) -> ListHandle {
        match self.strategy {
            RenderStrategy::FullReplace => {
                mount.replace_list(users.iter().map(card_for).collect())
            }
            RenderStrategy::InPlace => render_in_place(mount, users),
        }
    }
}

pub fn card_for(user: &User) -> Card {
    Card {
        id: user.id,
        header: user.name.clone(),
        fields: vec![
            ("Username", user.username.clone()),
            ("Email", user.email.clone()),
        ],
        address: user.address.summary(),
    }
}

fn render_in_place(mount: &mut Mount, users: &[User]) -> ListHandle {
    // First card for an id wins
    let mut seen = HashSet::new();
    let wanted: Vec<Card> = users
        .iter()
        .filter(|u| seen.insert(u.id))
        .map(card_for)
        .collect();

    let handle = mount.ensure_list();
    mount.retain_cards(|c| seen.contains(&c.id));

    let current = mount.visible_ids();
    let is_prefix = current.len() <= wanted.len()
        && current.iter().zip(&wanted).all(|(id, card)| *id == card.id);

    if is_prefix {
        mount.update_cards(&wanted[..current.len()]);
        mount.append_cards(wanted[current.len()..].to_vec());
    } else {
        mount.clear_list();
        mount.append_cards(wanted);
    }

    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;
    use crate::mount::Mutation;
    use proptest::prelude::*;

    fn user(id: i64) -> User {
        User {
            id,
            name: format!("User {}", id),
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            address: Address {
                street: "Main St".to_string(),
                suite: "Apt. 1".to_string(),
                city: "Springfield".to_string(),
                zipcode: "12345".to_string(),
            },
        }
    }

    fn users(ids: &[i64]) -> Vec<User> {
        ids.iter().map(|&id| user(id)).collect()
    }

    #[test]
    fn test_card_layout() {
        let card = card_for(&user(4));
        assert_eq!(card.id, 4);
        assert_eq!(card.header, "User 4");
        assert_eq!(
            card.fields,
            vec![
                ("Username", "user4".to_string()),
                ("Email", "user4@example.com".to_string()),
            ]
        );
        assert_eq!(card.address, "Springfield, Main St, Apt. 1, 12345");
    }

    #[test]
    fn test_full_replace_is_idempotent_and_fresh() {
        let projector = RenderProjector::new(RenderStrategy::FullReplace);
        let mut mount = Mount::new();
        let set = users(&[1, 2, 3]);

        let first = projector.render(&mut mount, &set);
        let cards_after_first = mount.cards().to_vec();
        let second = projector.render(&mut mount, &set);

        assert_ne!(first, second);
        assert_eq!(mount.cards(), cards_after_first.as_slice());
        assert_eq!(mount.visible_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_in_place_keeps_handle_and_never_duplicates() {
        let projector = RenderProjector::new(RenderStrategy::InPlace);
        let mut mount = Mount::new();
        let set = users(&[1, 2, 3]);

        let first = projector.render(&mut mount, &set);
        let second = projector.render(&mut mount, &set);
        assert_eq!(first, second);
        assert_eq!(mount.visible_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_in_place_delete_only_removes() {
        let projector = RenderProjector::new(RenderStrategy::InPlace);
        let mut mount = Mount::new();
        let handle = projector.render(&mut mount, &users(&[1, 2, 3]));
        let mut sub = mount.subscribe();

        projector.render(&mut mount, &users(&[1, 3]));
        assert_eq!(mount.visible_ids(), vec![1, 3]);
        assert_eq!(
            sub.drain(),
            vec![Mutation::CardsRemoved { list: handle, count: 1 }]
        );
    }

    #[test]
    fn test_in_place_reorder_rebuilds() {
        let projector = RenderProjector::new(RenderStrategy::InPlace);
        let mut mount = Mount::new();
        projector.render(&mut mount, &users(&[1, 2, 3]));

        projector.render(&mut mount, &users(&[3, 1, 4]));
        assert_eq!(mount.visible_ids(), vec![3, 1, 4]);
    }

    #[test]
    fn test_in_place_drops_duplicate_ids() {
        let projector = RenderProjector::new(RenderStrategy::InPlace);
        let mut mount = Mount::new();

        projector.render(&mut mount, &users(&[1, 2, 1]));
        assert_eq!(mount.visible_ids(), vec![1, 2]);
    }

    #[test]
    fn test_in_place_refreshes_card_content() {
        let projector = RenderProjector::new(RenderStrategy::InPlace);
        let mut mount = Mount::new();
        projector.render(&mut mount, &users(&[1]));

        let mut renamed = user(1);
        renamed.name = "Renamed".to_string();
        projector.render(&mut mount, &[renamed]);
        assert_eq!(mount.cards()[0].header, "Renamed");
    }

    #[test]
    fn test_render_empty_set() {
        for strategy in [RenderStrategy::FullReplace, RenderStrategy::InPlace] {
            let projector = RenderProjector::new(strategy);
            let mut mount = Mount::new();
            projector.render(&mut mount, &users(&[1]));
            projector.render(&mut mount, &[]);
            assert!(mount.list().is_some());
            assert_eq!(mount.card_count(), 0);
        }
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("full_replace".parse::<RenderStrategy>(), Ok(RenderStrategy::FullReplace));
        assert_eq!("In-Place".parse::<RenderStrategy>(), Ok(RenderStrategy::InPlace));
        assert!("sideways".parse::<RenderStrategy>().is_err());
    }

    fn unique_ids() -> impl Strategy<Value = Vec<i64>> {
        proptest::collection::hash_set(0i64..500, 0..40)
            .prop_flat_map(|set| Just(set.into_iter().collect::<Vec<_>>()).prop_shuffle())
    }

    proptest! {
        #[test]
        fn prop_readback_matches_input(before in unique_ids(), after in unique_ids()) {
            for strategy in [RenderStrategy::FullReplace, RenderStrategy::InPlace] {
                let projector = RenderProjector::new(strategy);
                let mut mount = Mount::new();
                projector.render(&mut mount, &users(&before));
                projector.render(&mut mount, &users(&after));
                prop_assert_eq!(mount.visible_ids(), after.clone());
            }
        }
    }
}
