//! Merging per-context results into global views.
//!
//! Every function here is synchronous and works on immutable per-context
//! results collected after the fan-out. Input order is the fixed context
//! iteration order, which makes tie-breaks deterministic.

use chrono::{DateTime, Duration, Utc};
use transcript_store::{ActivityCounts, Context, PendingHead, Role, SessionActivity, SessionHead};

use crate::session_id::CompositeSessionId;
use crate::stats::{mean, percentile_cont};
use crate::tokens::{TokenCount, TokenCounter};
use crate::views::{ActivitySummary, LatencyStats, PendingSession, RecentSession, SessionListItem};

/// Snippets longer than this are cut.
const SNIPPET_MAX_CHARS: usize = 80;
/// Characters kept from a cut snippet, before the ellipsis.
const SNIPPET_KEEP_CHARS: usize = 77;

/// Sum session and message counts across contexts.
pub fn sum_activity(per_context: &[(Context, ActivityCounts)]) -> ActivitySummary {
    per_context
        .iter()
        .fold(ActivitySummary::default(), |mut summary, (_, counts)| {
            summary.total_sessions += counts.session_count;
            summary.total_messages += counts.message_count;
            summary
        })
}

/// Concatenate each context's top sessions, re-sort by last activity
/// descending, and keep `limit`.
///
/// Each context only contributed its own top `limit`, so this is not a true
/// global top-K: with asymmetric volumes a context can hold more of the
/// globally newest sessions than it was allowed to return. The result is
/// exact whenever no single context has more than `limit` sessions newer
/// than the merged list's last entry.
pub fn merge_recent(
    per_context: &[(Context, Vec<SessionActivity>)],
    limit: usize,
) -> Vec<RecentSession> {
    let mut sessions: Vec<RecentSession> = per_context
        .iter()
        .flat_map(|(context, rows)| rows.iter().map(move |row| recent_session(context, row)))
        .collect();

    sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity).then_with(|| a.id.cmp(&b.id)));
    sessions.truncate(limit);
    sessions
}

fn recent_session(context: &Context, row: &SessionActivity) -> RecentSession {
    RecentSession {
        id: CompositeSessionId::new(context.key, row.session_id.clone()).to_string(),
        session_id: row.session_id.clone(),
        office: context.unit(),
        bot: context.bot(),
        context_label: context.label.to_string(),
        last_activity: row.last_activity,
        message_count: row.message_count,
        human_count: row.human_count,
        ai_count: row.ai_count,
    }
}

/// Concatenate pending sessions, sort by last human message descending, and
/// keep `limit`.
pub fn merge_pending(
    per_context: &[(Context, Vec<PendingHead>)],
    limit: usize,
) -> Vec<PendingSession> {
    let mut sessions: Vec<PendingSession> = per_context
        .iter()
        .flat_map(|(context, rows)| {
            rows.iter().map(move |row| PendingSession {
                id: CompositeSessionId::new(context.key, row.session_id.clone()).to_string(),
                session_id: row.session_id.clone(),
                office: context.unit(),
                bot: context.bot(),
                context_label: context.label.to_string(),
                last_human_at: row.last_human_at,
            })
        })
        .collect();

    sessions.sort_by(|a, b| b.last_human_at.cmp(&a.last_human_at).then_with(|| a.id.cmp(&b.id)));
    sessions.truncate(limit);
    sessions
}

/// Average each context's own p50 and p95 reply gap.
///
/// This is a mean of per-context estimates, not a percentile over the pooled
/// samples. Contexts without samples contribute nothing; with no samples
/// anywhere both figures are `None`.
pub fn merge_latency(per_context: &[(Context, Vec<f64>)]) -> LatencyStats {
    let mut medians = Vec::new();
    let mut p95s = Vec::new();

    for (_, gaps) in per_context {
        if let Some(p50) = percentile_cont(gaps, 0.5) {
            medians.push(p50);
        }
        if let Some(p95) = percentile_cont(gaps, 0.95) {
            p95s.push(p95);
        }
    }

    match (mean(&medians), mean(&p95s)) {
        (Some(median), Some(p95)) => LatencyStats {
            median_seconds: Some(median),
            p95_seconds: Some(p95),
        },
        _ => LatencyStats::default(),
    }
}

/// Global token frequency over every context's human messages.
pub fn merge_tokens(per_context: &[(Context, Vec<String>)], limit: usize) -> Vec<TokenCount> {
    let mut counter = TokenCounter::new();
    for (_, contents) in per_context {
        for content in contents {
            counter.add_text(content);
        }
    }
    counter.top(limit)
}

/// Build one page of the session listing.
///
/// Rows are merged, sorted by last activity descending and truncated to
/// `limit` first; the search filter then narrows that page. A matching
/// session outside the page is therefore not returned.
pub fn merge_session_heads(
    per_context: &[(Context, Vec<SessionHead>)],
    now: DateTime<Utc>,
    pending_threshold: Duration,
    limit: usize,
    search: Option<&str>,
) -> Vec<SessionListItem> {
    let cutoff = pending_cutoff(now, pending_threshold);

    let mut items: Vec<SessionListItem> = per_context
        .iter()
        .flat_map(|(context, rows)| {
            rows.iter().map(move |row| {
                let last_speaker = row.last_role();
                SessionListItem {
                    id: CompositeSessionId::new(context.key, row.session_id.clone()).to_string(),
                    session_id: row.session_id.clone(),
                    office: context.unit(),
                    bot: context.bot(),
                    last_activity: row.last_activity,
                    last_speaker,
                    last_message_snippet: snippet(row.last_content.as_deref().unwrap_or_default()),
                    message_count: row.message_count,
                    is_overdue: last_speaker == Role::Human && row.last_activity < cutoff,
                }
            })
        })
        .collect();

    items.sort_by(|a, b| b.last_activity.cmp(&a.last_activity).then_with(|| a.id.cmp(&b.id)));
    items.truncate(limit);
    apply_search(items, search, |item| item.session_id.as_str())
}

/// Instant before which an unanswered human message is overdue.
///
/// Saturates at the earliest representable instant instead of overflowing.
pub fn pending_cutoff(now: DateTime<Utc>, threshold: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(threshold).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Keep rows whose session id contains `search`, ignoring case.
pub fn apply_search<T>(
    rows: Vec<T>,
    search: Option<&str>,
    session_id: impl Fn(&T) -> &str,
) -> Vec<T> {
    let Some(needle) = search.map(str::to_lowercase).filter(|s| !s.is_empty()) else {
        return rows;
    };
    rows.into_iter()
        .filter(|row| session_id(row).to_lowercase().contains(&needle))
        .collect()
}

/// Shorten message content for list display.
pub fn snippet(content: &str) -> String {
    if content.chars().count() > SNIPPET_MAX_CHARS {
        let kept: String = content.chars().take(SNIPPET_KEEP_CHARS).collect();
        format!("{kept}…")
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use transcript_store::CONTEXTS;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, minute, 0).unwrap()
    }

    fn activity(session_id: &str, minute: u32) -> SessionActivity {
        SessionActivity {
            session_id: session_id.to_string(),
            last_activity: at(minute),
            message_count: 2,
            human_count: 1,
            ai_count: 1,
        }
    }

    fn head(session_id: &str, minute: u32, last_type: &str, content: &str) -> SessionHead {
        SessionHead {
            session_id: session_id.to_string(),
            last_activity: at(minute),
            message_count: 3,
            last_type: Some(last_type.to_string()),
            last_content: Some(content.to_string()),
        }
    }

    #[test]
    fn test_sum_activity() {
        let summary = sum_activity(&[
            (
                CONTEXTS[0],
                ActivityCounts {
                    session_count: 3,
                    message_count: 10,
                },
            ),
            (
                CONTEXTS[2],
                ActivityCounts {
                    session_count: 1,
                    message_count: 4,
                },
            ),
        ]);
        assert_eq!(summary.total_sessions, 4);
        assert_eq!(summary.total_messages, 14);
        assert_eq!(sum_activity(&[]), ActivitySummary::default());
    }

    #[test]
    fn test_merge_recent_sorts_truncates_and_keeps_ids_unique() {
        let per_context = vec![
            (CONTEXTS[0], vec![activity("a", 50), activity("b", 30), activity("c", 10)]),
            (CONTEXTS[2], vec![activity("a", 40), activity("d", 20)]),
        ];
        let merged = merge_recent(&per_context, 3);

        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["AMG:sales:a", "LMP:sales:a", "AMG:sales:b"]);
        assert!(merged.windows(2).all(|w| w[0].last_activity > w[1].last_activity));

        let unique: HashSet<_> = merged.iter().map(|s| &s.id).collect();
        assert_eq!(unique.len(), merged.len());
    }

    #[test]
    fn test_merge_recent_is_not_a_true_global_top_k() {
        // Context A holds the four newest sessions overall but, like every
        // context, only contributes its own top 2. Session a3 (minute 47) is
        // newer than b1 (minute 20) yet never reaches the merged list.
        let per_context = vec![
            (CONTEXTS[0], vec![activity("a1", 50), activity("a2", 49)]),
            (CONTEXTS[1], vec![activity("b1", 20), activity("b2", 10)]),
        ];
        let merged = merge_recent(&per_context, 3);
        let ids: Vec<_> = merged.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_merge_pending_orders_by_last_human_message() {
        let row = |id: &str, minute| PendingHead {
            session_id: id.to_string(),
            last_human_at: at(minute),
        };
        let merged = merge_pending(
            &[
                (CONTEXTS[0], vec![row("x", 5), row("y", 1)]),
                (CONTEXTS[3], vec![row("z", 3)]),
            ],
            2,
        );
        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["AMG:sales:x", "LMP:customer:z"]);
        assert_eq!(merged[1].context_label, "LMP Customer");
    }

    #[test]
    fn test_merge_latency_averages_per_context_estimates() {
        let stats = merge_latency(&[
            (CONTEXTS[0], vec![10.0, 20.0, 30.0]),
            (CONTEXTS[1], vec![100.0]),
            (CONTEXTS[2], vec![]),
        ]);
        // p50: (20 + 100) / 2; p95: (29 + 100) / 2.
        assert_eq!(stats.median_seconds, Some(60.0));
        let p95 = stats.p95_seconds.unwrap();
        assert!((p95 - 64.5).abs() < 1e-9);
    }

    #[test]
    fn test_merge_latency_differs_from_pooled_percentile() {
        let stats = merge_latency(&[
            (CONTEXTS[0], vec![10.0, 20.0, 30.0]),
            (CONTEXTS[1], vec![100.0]),
        ]);
        let pooled = percentile_cont(&[10.0, 20.0, 30.0, 100.0], 0.5).unwrap();
        assert_eq!(pooled, 25.0);
        assert_ne!(stats.median_seconds, Some(pooled));
    }

    #[test]
    fn test_merge_latency_without_samples_is_unavailable() {
        let stats = merge_latency(&[(CONTEXTS[0], vec![]), (CONTEXTS[1], vec![])]);
        assert_eq!(stats, LatencyStats::default());
        assert!(!stats.has_samples());
    }

    #[test]
    fn test_merge_tokens_follows_context_order_on_ties() {
        let tokens = merge_tokens(
            &[
                (CONTEXTS[0], vec!["servis".to_string()]),
                (CONTEXTS[1], vec!["harga servis harga".to_string()]),
                (CONTEXTS[2], vec!["promo".to_string()]),
            ],
            10,
        );
        let words: Vec<_> = tokens.iter().map(|t| (t.word.as_str(), t.count)).collect();
        assert_eq!(words, vec![("servis", 2), ("harga", 2), ("promo", 1)]);
    }

    #[test]
    fn test_session_heads_mark_overdue() {
        let now = at(30);
        let items = merge_session_heads(
            &[(
                CONTEXTS[0],
                vec![
                    head("late", 25, "human", "halo?"),
                    head("fresh", 29, "human", "halo"),
                    head("answered", 20, "ai", "siap"),
                ],
            )],
            now,
            Duration::minutes(2),
            50,
            None,
        );
        let overdue: Vec<_> = items
            .iter()
            .map(|i| (i.session_id.as_str(), i.is_overdue))
            .collect();
        assert_eq!(overdue, vec![("fresh", false), ("late", true), ("answered", false)]);
    }

    #[test]
    fn test_search_applies_after_truncation() {
        let per_context = vec![(
            CONTEXTS[0],
            vec![
                head("abc123", 40, "ai", ""),
                head("zzz", 30, "ai", ""),
                head("ABC999", 20, "ai", ""),
            ],
        )];
        let items = merge_session_heads(&per_context, at(50), Duration::minutes(2), 2, Some("ABC"));
        let ids: Vec<_> = items.iter().map(|i| i.session_id.as_str()).collect();
        // ABC999 matches but fell outside the two-row page.
        assert_eq!(ids, vec!["abc123"]);
    }

    #[test]
    fn test_pending_cutoff_saturates() {
        assert_eq!(pending_cutoff(at(10), Duration::minutes(2)), at(8));
        // A million years reaches past the earliest representable instant.
        let eons = Duration::days(365 * 1_000_000);
        assert_eq!(pending_cutoff(at(10), eons), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("short"), "short");
        let long = "x".repeat(81);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), 78);
        assert!(cut.ends_with('…'));
        assert_eq!(snippet(&"y".repeat(80)), "y".repeat(80));
    }
}
