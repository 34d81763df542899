//! Stateful, in-memory usage analytics.
//!
//! Holds user records and generation events for the lifetime of one server
//! process; a restart silently resets everything. The dashboard polls the
//! read queries, which recompute from current state on every call. The event
//! log grows without eviction, which is acceptable for a short-lived demo
//! deployment.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Local, NaiveTime, Weekday};
use parking_lot::Mutex;
use serde::Serialize;

use crate::display::{capitalize, mask_identity, time_ago};

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UserKind {
    Registered,
    Anonymous,
}

#[derive(Debug)]
struct UserRecord {
    identity: String,
    kind: UserKind,
    first_seen: DateTime<Local>,
    last_seen: DateTime<Local>,
    /// Indices into the global event log, in insertion order.
    events: Vec<usize>,
}

/// Immutable once appended to the log.
#[derive(Debug)]
struct GenerationEvent {
    identity: String,
    timestamp: DateTime<Local>,
    language: String,
    visual_style: String,
    scenes_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total_generations: u64,
    pub total_users: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyGenerations {
    pub day: &'static str,
    pub generations: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub label: String,
    pub percent: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FavoriteStyle {
    pub name: String,
    pub count: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub registered: usize,
    pub anonymous: usize,
    pub generations_per_user: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecentUser {
    pub identity: String,
    pub kind: UserKind,
    pub generations: u64,
    pub last_seen: String,
    pub first_seen: String,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<UserRecord>,
    index: HashMap<String, usize>,
    events: Vec<GenerationEvent>,
}

impl Inner {
    fn insert_user(&mut self, identity: &str, kind: UserKind, now: DateTime<Local>) -> usize {
        let idx = self.users.len();
        self.users.push(UserRecord {
            identity: identity.to_string(),
            kind,
            first_seen: now,
            last_seen: now,
            events: Vec::new(),
        });
        self.index.insert(identity.to_string(), idx);
        idx
    }
}

/// In-memory store of users and generation events.
///
/// All operations are total over possibly-empty state: queries return zero
/// counts or empty collections instead of erroring. A single mutex guards
/// the user roster and event log together, so each track or query is atomic
/// under a multi-threaded runtime.
#[derive(Debug, Default)]
pub struct AnalyticsStore {
    inner: Mutex<Inner>,
}

impl AnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a well-known registered record exists, e.g. the admin user.
    /// Seeding an identity that is already present leaves it untouched.
    pub fn seed_registered(&self, identity: &str) {
        self.seed_registered_at(identity, Local::now());
    }

    pub fn seed_registered_at(&self, identity: &str, now: DateTime<Local>) {
        let mut inner = self.inner.lock();
        if !inner.index.contains_key(identity) {
            inner.insert_user(identity, UserKind::Registered, now);
        }
    }

    /// Record one generation for `identity`, creating an anonymous user
    /// record on first sight. Empty labels default to "Unknown".
    pub fn track_generation(
        &self,
        identity: &str,
        language: &str,
        visual_style: &str,
        scenes_count: u32,
    ) {
        self.track_generation_at(identity, language, visual_style, scenes_count, Local::now());
    }

    pub fn track_generation_at(
        &self,
        identity: &str,
        language: &str,
        visual_style: &str,
        scenes_count: u32,
        now: DateTime<Local>,
    ) {
        let mut inner = self.inner.lock();
        let user_idx = match inner.index.get(identity).copied() {
            Some(idx) => idx,
            None => inner.insert_user(identity, UserKind::Anonymous, now),
        };
        inner.users[user_idx].last_seen = now;

        let event = GenerationEvent {
            identity: identity.to_string(),
            timestamp: now,
            language: or_unknown(language),
            visual_style: or_unknown(visual_style),
            scenes_count,
        };
        tracing::debug!(
            identity = %event.identity,
            language = %event.language,
            visual_style = %event.visual_style,
            scenes = event.scenes_count,
            "generation tracked"
        );

        let event_idx = inner.events.len();
        inner.events.push(event);
        inner.users[user_idx].events.push(event_idx);
    }

    /// Headline numbers for the dashboard.
    pub fn overview(&self) -> Overview {
        let inner = self.inner.lock();
        Overview {
            total_generations: total_scenes(&inner.events),
            total_users: inner.users.len(),
        }
    }

    /// Scenes generated per weekday since the most recent Monday 00:00:00
    /// local time, always reported in Mon..Sun order.
    pub fn weekly_generations(&self) -> Vec<DailyGenerations> {
        self.weekly_generations_at(Local::now())
    }

    pub fn weekly_generations_at(&self, now: DateTime<Local>) -> Vec<DailyGenerations> {
        let week_start = now
            .date_naive()
            .week(Weekday::Mon)
            .first_day()
            .and_time(NaiveTime::MIN);

        let mut buckets = [0u64; 7];
        let inner = self.inner.lock();
        for event in &inner.events {
            if event.timestamp.naive_local() >= week_start {
                let day = event.timestamp.weekday().num_days_from_monday() as usize;
                buckets[day] += u64::from(event.scenes_count);
            }
        }

        WEEKDAY_LABELS
            .into_iter()
            .zip(buckets)
            .map(|(day, generations)| DailyGenerations { day, generations })
            .collect()
    }

    /// Top 3 languages by event count plus an "Other" remainder bucket.
    ///
    /// Labels are compared case-insensitively and counted per event, not per
    /// scene. Ties keep first-encountered order. Percentages are rounded
    /// independently and need not sum to 100. The remainder bucket appears
    /// only when its sum is nonzero.
    pub fn language_distribution(&self) -> Vec<LanguageShare> {
        let inner = self.inner.lock();

        let mut counts: Vec<(String, u64)> = Vec::new();
        for event in &inner.events {
            let language = event.language.to_lowercase();
            match counts.iter_mut().find(|(name, _)| *name == language) {
                Some((_, count)) => *count += 1,
                None => counts.push((language, 1)),
            }
        }

        let total: u64 = counts.iter().map(|(_, count)| count).sum();
        if total == 0 {
            return Vec::new();
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let mut shares: Vec<LanguageShare> = counts
            .iter()
            .take(3)
            .map(|(name, count)| LanguageShare {
                name: name.clone(),
                label: capitalize(name),
                percent: percent_of(*count, total),
            })
            .collect();

        let remainder: u64 = counts.iter().skip(3).map(|(_, count)| count).sum();
        if remainder > 0 {
            shares.push(LanguageShare {
                name: "other".to_string(),
                label: "Other".to_string(),
                percent: percent_of(remainder, total),
            });
        }

        shares
    }

    /// The visual style with the most events, first-encountered winning
    /// ties; `("N/A", 0)` when nothing has been tracked.
    pub fn favorite_visual_style(&self) -> FavoriteStyle {
        let inner = self.inner.lock();

        let mut counts: Vec<(&str, u64)> = Vec::new();
        for event in &inner.events {
            match counts.iter_mut().find(|(name, _)| *name == event.visual_style) {
                Some((_, count)) => *count += 1,
                None => counts.push((event.visual_style.as_str(), 1)),
            }
        }

        let mut favorite: Option<(&str, u64)> = None;
        for &(name, count) in &counts {
            if favorite.map_or(true, |(_, best)| count > best) {
                favorite = Some((name, count));
            }
        }

        match favorite {
            Some((name, count)) => FavoriteStyle {
                name: name.to_string(),
                count,
            },
            None => FavoriteStyle {
                name: "N/A".to_string(),
                count: 0,
            },
        }
    }

    /// Registered/anonymous breakdown with average generations per user.
    pub fn user_stats(&self) -> UserStats {
        let inner = self.inner.lock();

        let registered = inner
            .users
            .iter()
            .filter(|user| user.kind == UserKind::Registered)
            .count();
        let total = inner.users.len();
        let total_generations = total_scenes(&inner.events);

        UserStats {
            total,
            registered,
            anonymous: total - registered,
            generations_per_user: if total > 0 {
                total_generations as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// At most `limit` users by descending last activity. Registered users
    /// show their raw identity; anonymous tracking tokens are masked.
    pub fn recent_users(&self, limit: usize) -> Vec<RecentUser> {
        self.recent_users_at(limit, Local::now())
    }

    pub fn recent_users_at(&self, limit: usize, now: DateTime<Local>) -> Vec<RecentUser> {
        let inner = self.inner.lock();

        let mut users: Vec<&UserRecord> = inner.users.iter().collect();
        users.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));

        users
            .into_iter()
            .take(limit)
            .map(|user| RecentUser {
                identity: match user.kind {
                    UserKind::Registered => user.identity.clone(),
                    UserKind::Anonymous => mask_identity(&user.identity),
                },
                kind: user.kind,
                generations: user
                    .events
                    .iter()
                    .map(|&idx| u64::from(inner.events[idx].scenes_count))
                    .sum(),
                last_seen: time_ago(user.last_seen, now),
                first_seen: time_ago(user.first_seen, now),
            })
            .collect()
    }
}

fn or_unknown(label: &str) -> String {
    if label.is_empty() {
        "Unknown".to_string()
    } else {
        label.to_string()
    }
}

fn total_scenes(events: &[GenerationEvent]) -> u64 {
    events.iter().map(|event| u64::from(event.scenes_count)).sum()
}

fn percent_of(count: u64, total: u64) -> u32 {
    (count as f64 / total as f64 * 100.0).round() as u32
}
