//! Token usage rollup by model, agent and UTC day.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};

use super::sessions::{stats_for, MONTH_WINDOW_MS};
use crate::types::{Agent, AgentUsage, DailyUsage, ModelUsage, Session, TokenUsage};

pub const DAILY_WINDOW_DAYS: i64 = 30;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn utc_day(epoch_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(epoch_ms).map(|dt| dt.date_naive())
}

/// Roll up every agent's sessions in one pass.
///
/// Lifetime totals include every session; the daily series only counts
/// sessions updated strictly after `now - 30d`, and only when their UTC
/// day is one of the 30 seeded days.
pub fn rollup<'a>(
    agents: impl IntoIterator<Item = (&'a Agent, &'a [Session])>,
    now_ms: i64,
) -> TokenUsage {
    let cutoff = now_ms - MONTH_WINDOW_MS;

    let mut daily: Vec<(NaiveDate, u64)> = (0..DAILY_WINDOW_DAYS)
        .rev()
        .filter_map(|i| utc_day(now_ms - i * DAY_MS))
        .map(|day| (day, 0))
        .collect();
    let day_index: HashMap<NaiveDate, usize> = daily
        .iter()
        .enumerate()
        .map(|(idx, (day, _))| (*day, idx))
        .collect();

    let mut by_model: HashMap<String, ModelUsage> = HashMap::new();
    let mut by_agent = Vec::new();
    let (mut total_tokens, mut monthly_tokens, mut total_sessions) = (0u64, 0u64, 0usize);

    for (agent, sessions) in agents {
        let stats = stats_for(sessions, now_ms);
        total_tokens = total_tokens.saturating_add(stats.total_tokens);
        monthly_tokens = monthly_tokens.saturating_add(stats.monthly_tokens);
        total_sessions += stats.session_count;

        for session in sessions {
            let model = if session.model.is_empty() {
                "unknown"
            } else {
                session.model.as_str()
            };
            let entry = by_model.entry(model.to_string()).or_insert_with(|| ModelUsage {
                model: model.to_string(),
                total_tokens: 0,
                session_count: 0,
            });
            entry.total_tokens = entry.total_tokens.saturating_add(session.total_tokens);
            entry.session_count += 1;

            if session.updated_at > cutoff {
                if let Some(idx) = utc_day(session.updated_at).and_then(|d| day_index.get(&d)) {
                    daily[*idx].1 = daily[*idx].1.saturating_add(session.total_tokens);
                }
            }
        }

        by_agent.push(AgentUsage {
            agent_id: agent.id.clone(),
            agent_name: agent.identity.name.clone(),
            emoji: agent.identity.emoji.clone(),
            total_tokens: stats.total_tokens,
            monthly_tokens: stats.monthly_tokens,
            session_count: stats.session_count,
        });
    }

    let mut by_model: Vec<ModelUsage> = by_model.into_values().collect();
    by_model.sort_by(|a, b| {
        b.total_tokens
            .cmp(&a.total_tokens)
            .then_with(|| a.model.cmp(&b.model))
    });
    by_agent.sort_by(|a, b| b.total_tokens.cmp(&a.total_tokens));

    TokenUsage {
        total_tokens,
        monthly_tokens,
        total_sessions,
        by_model,
        by_agent,
        daily: daily
            .into_iter()
            .map(|(day, tokens)| DailyUsage {
                date: day.format("%Y-%m-%d").to_string(),
                tokens,
            })
            .collect(),
    }
}
