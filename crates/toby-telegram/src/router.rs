use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio::sync::Mutex;
use tracing::info;

use toby_core::{
    commands::WalkBot,
    config::Config,
    messaging::{port::MessagingPort, timeout::TimeoutMessenger},
    scheduler::ReminderScheduler,
    store::EventStore,
    throttle::NotificationThrottle,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub walk_bot: Arc<WalkBot>,
}

/// Run the bot until Ctrl-C: reminder scheduler in the background, long
/// polling for commands in the foreground.
pub async fn run_polling(cfg: Arc<Config>, store: Arc<EventStore>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!("toby started: @{}", me.username());
    }
    info!(
        group = cfg.broadcast_chat_id.0,
        db = %cfg.db_path.display(),
        ask_enabled = cfg.ask_enabled,
        "configuration loaded"
    );

    // Every outbound send is bounded so a hung request cannot stall a tick.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> =
        Arc::new(TimeoutMessenger::new(raw_messenger, cfg.send_timeout));

    let throttle = Arc::new(Mutex::new(NotificationThrottle::new(
        cfg.notification_interval,
    )));
    let scheduler = ReminderScheduler::new(
        cfg.clone(),
        store.clone(),
        throttle,
        messenger.clone(),
    );
    scheduler.start().await;

    let state = Arc::new(AppState {
        walk_bot: Arc::new(WalkBot::new(cfg, store, messenger)),
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    scheduler.stop().await;
    info!("toby stopped");

    Ok(())
}
