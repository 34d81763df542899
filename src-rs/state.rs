use std::sync::Arc;

use crate::{analytics::AnalyticsStore, config::Config, rate_limit::SlidingWindowLimiter};

/// Shared handles to the process-wide limiter and analytics state.
///
/// Construct one per process (or one per test, for isolation) and hand
/// clones to the request layer. Everything behind the handles is in memory
/// only; a restart resets all counters, user records, and events.
///
/// Scene, image, and login throttling use three separate limiter instances
/// rather than suffixed key strings, so an identity can never collide with
/// another purpose's key space.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scene_limiter: Arc<SlidingWindowLimiter>,
    pub image_limiter: Arc<SlidingWindowLimiter>,
    pub login_limiter: Arc<SlidingWindowLimiter>,
    pub analytics: Arc<AnalyticsStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let analytics = AnalyticsStore::new();
        analytics.seed_registered(&config.admin_identity);
        tracing::info!(admin = %config.admin_identity, "in-memory analytics state initialized");

        Self {
            scene_limiter: Arc::new(SlidingWindowLimiter::new(
                config.rate_limit_window,
                config.scene_rate_limit,
            )),
            image_limiter: Arc::new(SlidingWindowLimiter::new(
                config.rate_limit_window,
                config.image_rate_limit,
            )),
            login_limiter: Arc::new(SlidingWindowLimiter::new(
                config.rate_limit_window,
                config.login_rate_limit,
            )),
            analytics: Arc::new(analytics),
            config: Arc::new(config),
        }
    }

    /// Gate a scene generation request for this end-user identity.
    pub fn allow_scene_generation(&self, identity: &str) -> bool {
        let allowed = self.scene_limiter.check_and_record(identity);
        if !allowed {
            tracing::warn!(identity = %identity, "scene generation rate limited");
        }
        allowed
    }

    /// Gate an image generation request for this end-user identity.
    pub fn allow_image_generation(&self, identity: &str) -> bool {
        let allowed = self.image_limiter.check_and_record(identity);
        if !allowed {
            tracing::warn!(identity = %identity, "image generation rate limited");
        }
        allowed
    }

    /// Gate an admin login attempt from this client address.
    pub fn allow_login_attempt(&self, client_ip: &str) -> bool {
        let allowed = self.login_limiter.check_and_record(client_ip);
        if !allowed {
            tracing::warn!(client_ip = %client_ip, "login attempts rate limited");
        }
        allowed
    }

    /// Clear the login throttle for an address after a successful login,
    /// removing any rejection history immediately.
    pub fn note_login_success(&self, client_ip: &str) {
        self.login_limiter.reset(client_ip);
    }

    /// Record one successful generation in the analytics store. Called by
    /// the orchestration layer with the number of scenes actually produced.
    pub fn record_generation(
        &self,
        identity: &str,
        language: &str,
        visual_style: &str,
        scenes_count: u32,
    ) {
        self.analytics
            .track_generation(identity, language, visual_style, scenes_count);
    }
}
