//! Game-over notifications
//!
//! The session hands a [`GameOverReport`] to a [`GameOverSink`] exactly once
//! per run. The bundled [`ShareSink`] turns it into a Warpcast compose link
//! and decides whether the mint offer is shown; the mint itself happens
//! outside this crate.

use url::Url;

use crate::consts::MINT_MIN_SCORE;

/// Warpcast compose endpoint
pub const COMPOSE_URL: &str = "https://warpcast.com/~/compose";

/// Terminal result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub score: u64,
    /// Best score before this run
    pub previous_best: u64,
    pub new_high_score: bool,
    /// Score is high enough for the mint offer
    pub mint_eligible: bool,
}

impl GameOverReport {
    pub fn new(score: u64, previous_best: u64) -> Self {
        Self {
            score,
            previous_best,
            new_high_score: score > previous_best,
            mint_eligible: score >= MINT_MIN_SCORE,
        }
    }
}

/// Receiver of the one-shot game-over event
pub trait GameOverSink {
    fn game_over(&mut self, report: &GameOverReport);
}

/// Sink that keeps every report (useful for tests and replays)
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<GameOverReport>,
}

impl GameOverSink for RecordingSink {
    fn game_over(&mut self, report: &GameOverReport) {
        self.reports.push(*report);
    }
}

/// Share offer shown on the game-over screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOffer {
    pub text: String,
    pub compose_url: String,
    pub offer_mint: bool,
}

/// Builds share offers for the page the game is embedded in
#[derive(Debug, Clone)]
pub struct ShareSink {
    page_url: String,
    latest: Option<ShareOffer>,
}

impl ShareSink {
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            latest: None,
        }
    }

    /// Offer for the most recent run, if any
    pub fn latest(&self) -> Option<&ShareOffer> {
        self.latest.as_ref()
    }

    /// Forget the current offer (new run started)
    pub fn clear(&mut self) {
        self.latest = None;
    }
}

impl GameOverSink for ShareSink {
    fn game_over(&mut self, report: &GameOverReport) {
        let compose_url = compose_url(report.score, &self.page_url);
        log::info!(
            "Share offer ready (score {}, mint offer: {})",
            report.score,
            report.mint_eligible
        );
        self.latest = Some(ShareOffer {
            text: share_text(report.score),
            compose_url,
            offer_mint: report.mint_eligible,
        });
    }
}

/// Text posted when sharing a score
pub fn share_text(score: u64) -> String {
    format!(
        "Just scored {} points in Dino Game! Can you beat my score?",
        score
    )
}

/// Warpcast compose link embedding the game page
pub fn compose_url(score: u64, page_url: &str) -> String {
    let text = share_text(score);
    let mut params = vec![("text", text.as_str())];
    if !page_url.is_empty() {
        params.push(("embeds[]", page_url));
    }
    match Url::parse_with_params(COMPOSE_URL, &params) {
        Ok(url) => url.into(),
        Err(err) => {
            log::warn!("Could not build compose URL: {}", err);
            COMPOSE_URL.to_string()
        }
    }
}
