mod builder;
mod notifier;
mod telegram;

pub use builder::{Notification, NotificationBuilder};
pub use notifier::DedupNotifier;
pub use telegram::{MessageSender, ParseMode, TelegramBot, TelegramError};
