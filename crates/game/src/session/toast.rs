use std::time::{Duration, Instant};

use crate::net::{RankEntry, RemoteSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Danger,
    Warning,
}

/// A transient notification. A newer toast replaces the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

impl Toast {
    pub fn new(
        message: impl Into<String>,
        severity: Severity,
        now: Instant,
        ttl: Duration,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.message.lines()
    }
}

/// Ranking text for the end of a round, best score first.
///
/// Ties on score fall back to the server's rank; entries without a rank sort last.
/// Returns `None` when the server sent no ranks.
pub fn ranking_message(ranks: &[RankEntry], session: &RemoteSession) -> Option<String> {
    if ranks.is_empty() {
        return None;
    }

    let mut ranks = ranks.to_vec();
    ranks.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.rank.unwrap_or(u32::MAX).cmp(&b.rank.unwrap_or(u32::MAX)))
    });

    let mut message = String::from("Round ranking");
    for (idx, entry) in ranks.iter().enumerate() {
        let name = match entry.id.as_deref() {
            Some(id) if !id.is_empty() => session.display_name(id),
            _ => format!("P{}", idx + 1),
        };
        message.push_str(&format!("\n{}. {} - {}", idx + 1, name, entry.score));
    }
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::PlayerEntry;

    fn rank(id: Option<&str>, score: u32, rank: Option<u32>) -> RankEntry {
        RankEntry {
            id: id.map(str::to_string),
            score,
            rank,
        }
    }

    #[test]
    fn expires_after_ttl() {
        let now = Instant::now();
        let toast = Toast::new("hi", Severity::Warning, now, Duration::from_secs(3));

        assert!(!toast.is_expired(now + Duration::from_millis(2999)));
        assert!(toast.is_expired(now + Duration::from_secs(3)));
    }

    #[test]
    fn ranking_orders_by_score_then_rank() {
        let mut session = RemoteSession::default();
        session
            .players
            .insert(String::from("p1"), PlayerEntry::new("alice"));

        let message = ranking_message(
            &[
                rank(Some("p2"), 30, Some(2)),
                rank(Some("p1"), 50, None),
                rank(None, 30, Some(1)),
            ],
            &session,
        )
        .unwrap();

        assert_eq!(message, "Round ranking\n1. alice - 50\n2. P2 - 30\n3. p2 - 30");
    }

    #[test]
    fn no_ranks_no_message() {
        assert!(ranking_message(&[], &RemoteSession::default()).is_none());
    }
}
