//! Mention extraction for chat messages.
//!
//! Messages may embed `@Display Name` and `#ORDER-REF` tokens. Tokens are
//! resolved against the known profile and order lists at send time and the
//! resolved ids are stored on the message, so later renames do not break
//! old messages. Unresolved tokens are left as plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static ORDER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Za-z0-9][A-Za-z0-9_-]*)").expect("valid order token regex"));

#[derive(Debug, Clone)]
pub struct ProfileRef {
    pub id: Uuid,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct OrderRef {
    pub id: Uuid,
    pub order_number: String,
}

/// Resolved mention ids, in order of first appearance in the body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Mentions {
    pub user_ids: Vec<Uuid>,
    pub order_ids: Vec<Uuid>,
}

/// Extracts and resolves all mentions in `body`.
///
/// Display names may contain spaces, so user mentions are matched by
/// scanning for each known name rather than by a token regex; when one
/// name is a prefix of another ("John" / "John Doe"), the longer name
/// wins at that position.
pub fn extract_mentions(body: &str, profiles: &[ProfileRef], orders: &[OrderRef]) -> Mentions {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut user_hits: Vec<(usize, Uuid)> = Vec::new();

    let mut by_length: Vec<&ProfileRef> = profiles.iter().collect();
    by_length.sort_by_key(|p| std::cmp::Reverse(p.display_name.len()));

    for profile in by_length {
        if profile.display_name.is_empty() {
            continue;
        }
        let needle = format!("@{}", profile.display_name);
        for (start, _) in body.match_indices(&needle) {
            let end = start + needle.len();
            let boundary_ok = body[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            let overlaps = claimed.iter().any(|&(s, e)| start < e && end > s);
            if boundary_ok && !overlaps {
                claimed.push((start, end));
                user_hits.push((start, profile.id));
            }
        }
    }
    user_hits.sort_by_key(|&(start, _)| start);

    let mut mentions = Mentions::default();
    for (_, id) in user_hits {
        if !mentions.user_ids.contains(&id) {
            mentions.user_ids.push(id);
        }
    }

    for capture in ORDER_TOKEN.captures_iter(body) {
        let token = &capture[1];
        if let Some(order) = orders.iter().find(|o| o.order_number == token) {
            if !mentions.order_ids.contains(&order.id) {
                mentions.order_ids.push(order.id);
            }
        }
    }

    mentions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> ProfileRef {
        ProfileRef {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
        }
    }

    fn order(number: &str) -> OrderRef {
        OrderRef {
            id: Uuid::new_v4(),
            order_number: number.to_string(),
        }
    }

    #[test]
    fn resolves_user_and_order_mentions() {
        let john = profile("John Doe");
        let ord = order("ORD123");
        let mentions = extract_mentions(
            "hey @John Doe please check #ORD123 today",
            &[john.clone()],
            &[ord.clone()],
        );
        assert_eq!(mentions.user_ids, vec![john.id]);
        assert_eq!(mentions.order_ids, vec![ord.id]);
    }

    #[test]
    fn longer_display_name_wins() {
        let john = profile("John");
        let john_doe = profile("John Doe");
        let mentions = extract_mentions(
            "@John Doe, can you take this?",
            &[john.clone(), john_doe.clone()],
            &[],
        );
        assert_eq!(mentions.user_ids, vec![john_doe.id]);
    }

    #[test]
    fn unresolved_tokens_are_ignored() {
        let mentions = extract_mentions("@Nobody and #MISSING", &[profile("John")], &[]);
        assert!(mentions.user_ids.is_empty());
        assert!(mentions.order_ids.is_empty());
    }

    #[test]
    fn repeated_mentions_are_deduplicated() {
        let john = profile("John");
        let ord = order("ORD1");
        let mentions = extract_mentions(
            "@John @John see #ORD1 and #ORD1",
            &[john.clone()],
            &[ord.clone()],
        );
        assert_eq!(mentions.user_ids, vec![john.id]);
        assert_eq!(mentions.order_ids, vec![ord.id]);
    }

    #[test]
    fn partial_word_is_not_a_mention() {
        let john = profile("John");
        let mentions = extract_mentions("@Johnny is someone else", &[john], &[]);
        assert!(mentions.user_ids.is_empty());
    }

    #[test]
    fn mention_order_follows_first_appearance() {
        let a = profile("Ana");
        let b = profile("Bo");
        let mentions = extract_mentions("@Bo then @Ana", &[a.clone(), b.clone()], &[]);
        assert_eq!(mentions.user_ids, vec![b.id, a.id]);
    }
}
