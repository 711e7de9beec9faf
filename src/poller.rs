// src/poller.rs

use crate::domain::RecipientConfig;
use crate::notifications::{DedupNotifier, MessageSender, NotificationBuilder, TelegramError};
use crate::scraper::{ListingParser, PageFetcher, ScraperError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(600);
const SLEEP_SLICE: Duration = Duration::from_secs(1);

pub const ONLINE_MESSAGE: &str =
    "🟢 Le bot est en ligne. Vous serez prévenu dès qu'un logement correspondant à votre recherche est disponible.";
pub const OFFLINE_MESSAGE: &str =
    "🔴 Le bot est hors ligne. Vous ne recevrez plus de notifications jusqu'à son redémarrage.";

#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll cycle panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
enum RecipientError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Telegram(#[from] TelegramError),
}

/// Outcome of one pass over all recipients.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub sent: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Fetch, parse, compose and notify for every recipient, forever.
pub struct Poller<F, S> {
    fetcher: F,
    parser: ListingParser,
    builder: NotificationBuilder,
    notifier: DedupNotifier<S>,
    recipients: Vec<RecipientConfig>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl<F: PageFetcher, S: MessageSender> Poller<F, S> {
    pub fn new(fetcher: F, sender: S, recipients: Vec<RecipientConfig>) -> Result<Self, ScraperError> {
        Ok(Self {
            fetcher,
            parser: ListingParser::new()?,
            builder: NotificationBuilder::default(),
            notifier: DedupNotifier::new(sender),
            recipients,
            interval: DEFAULT_INTERVAL,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn with_builder(mut self, builder: NotificationBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Clearing this flag stops `run` after the current recipient.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn notifier(&self) -> &DedupNotifier<S> {
        &self.notifier
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn announce_online(&self) -> usize {
        self.notifier.broadcast(&self.recipients, ONLINE_MESSAGE)
    }

    pub fn announce_offline(&self) -> usize {
        tracing::info!("Sending offline notice to {} recipients", self.recipients.len());
        self.notifier.broadcast(&self.recipients, OFFLINE_MESSAGE)
    }

    /// Loops until the running flag is cleared. A panic inside a cycle is
    /// caught and returned so the caller can still say goodbye.
    pub fn run(&mut self) -> Result<(), PollError> {
        while self.is_running() {
            let started = Instant::now();
            let report = panic::catch_unwind(AssertUnwindSafe(|| self.run_cycle()))
                .map_err(|payload| PollError::Panicked(panic_message(payload.as_ref())))?;

            tracing::info!(
                "✅ Cycle done in {:?}: {} sent, {} unchanged, {} failed",
                started.elapsed(),
                report.sent,
                report.unchanged,
                report.failed
            );

            self.sleep_interval();
        }

        tracing::info!("Poller stopped");
        Ok(())
    }

    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let recipients = self.recipients.clone();

        for recipient in &recipients {
            if !self.is_running() {
                break;
            }

            tracing::info!("Handling configuration: {}", recipient.label);

            match self.check_recipient(recipient) {
                Ok(true) => {
                    tracing::info!("📨 Notified {}", recipient.label);
                    report.sent += 1;
                }
                Ok(false) => report.unchanged += 1,
                Err(RecipientError::Scraper(ScraperError::SessionExpired(at))) => {
                    tracing::warn!("Session expired while checking {} ({at})", recipient.label);
                    report.failed += 1;
                    self.reauthenticate();
                }
                // Not a results page: rules page, login wall or a site redesign.
                Err(RecipientError::Scraper(e @ ScraperError::UnrecognizedPage(_))) => {
                    tracing::warn!("⚠️ {e} while checking {}", recipient.label);
                    report.failed += 1;
                    self.reauthenticate();
                }
                Err(e) => {
                    tracing::error!("❌ Check failed for {}: {e}", recipient.label);
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn check_recipient(&mut self, recipient: &RecipientConfig) -> Result<bool, RecipientError> {
        let html = self.fetcher.fetch(&recipient.search_url)?;
        let results = self.parser.parse(&html, &recipient.search_url);

        match results.count {
            Some(count) => tracing::info!(
                "Found {count} accommodations, {} on the first page",
                results.listings.len()
            ),
            None if results.listings.is_empty() => {
                return Err(ScraperError::UnrecognizedPage(recipient.search_url.to_string()).into());
            }
            None => tracing::warn!(
                "Result count not found on page, {} listings extracted",
                results.listings.len()
            ),
        }
        for listing in &results.listings {
            tracing::debug!(
                id = ?listing.id,
                image = ?listing.image_url,
                "{}: {}",
                listing.title.as_deref().unwrap_or_default(),
                listing.overview_details.replace('\n', ", ")
            );
        }

        let notification = self
            .builder
            .search_results_notification(&results, &recipient.ignored_ids);

        Ok(self
            .notifier
            .notify_if_changed(&recipient.telegram_id, notification.as_ref())?)
    }

    fn reauthenticate(&mut self) {
        match self.fetcher.authenticate() {
            Ok(()) => tracing::info!("🔐 Session renewed"),
            Err(e) => tracing::error!("Re-authentication failed: {e}"),
        }
    }

    fn sleep_interval(&self) {
        let deadline = Instant::now() + self.interval;

        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
