use crate::notifications::{NotificationBuilder, TelegramBot};
use crate::poller::Poller;
use crate::scraper::{Credentials, CrousSession, PageFetcher};
use crate::settings::Settings;
use anyhow::{Context, Result};
use std::sync::atomic::Ordering;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod domain;
mod errors;
mod notifications;
mod poller;
mod scraper;
mod settings;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        tracing::error!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // 1️⃣ Configuration and credentials
    let settings = Settings::from_env().context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded: {} recipients, polling every {:?}",
        settings.recipients.len(),
        settings.poll_interval
    );

    // 2️⃣ Messaging bot
    let bot = TelegramBot::new(settings.telegram_bot_token.clone())?;
    let me = bot.get_me().context("Telegram bot token rejected")?;
    tracing::info!(
        "Telegram bot ready: {} ({})",
        me.username.as_deref().unwrap_or("unnamed"),
        me.id
    );

    // 3️⃣ Authenticated site session
    let mut session = CrousSession::new(
        Credentials {
            email: settings.mse_email.clone(),
            password: settings.mse_password.clone(),
        },
        settings.mse_login_url.clone(),
        settings.navigation_delay,
    )?;
    session
        .authenticate()
        .context("Could not authenticate to the CROUS website")?;

    // 4️⃣ Poll until interrupted
    let mut poller = Poller::new(session, bot, settings.recipients)?
        .with_builder(NotificationBuilder::new(settings.notify_when_no_results))
        .with_interval(settings.poll_interval);

    let running = poller.running_flag();
    ctrlc::set_handler(move || {
        tracing::info!("Interrupt received, stopping after the current step");
        running.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    poller.announce_online();
    let outcome = poller.run();
    poller.announce_offline();

    outcome.context("Polling stopped on a fatal error")?;
    tracing::info!("Shut down cleanly.");
    Ok(())
}
