use std::sync::Arc;

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::webhooks,
};
use tracing::info;

use gurupa_core::{
    config::Config,
    ports::{RegistryPort, TransportPort},
    registry::JsonFileRegistry,
    Relay,
};

use crate::handlers;
use crate::TelegramTransport;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// Relay over a fresh bot built from the configured token.
pub fn relay_from_config(cfg: &Config) -> Relay {
    build_relay(cfg, Bot::new(cfg.telegram_bot_token.clone()))
}

/// Wire the relay to a Telegram bot with the file-backed registry.
pub fn build_relay(cfg: &Config, bot: Bot) -> Relay {
    let registry: Arc<dyn RegistryPort> = Arc::new(JsonFileRegistry::new(cfg.registry_path.clone()));
    let transport: Arc<dyn TransportPort> = Arc::new(TelegramTransport::new(bot));
    Relay::new(cfg, registry, transport)
}

/// Run the dispatcher until shutdown: webhook when configured, long polling
/// otherwise.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!("gurupa started: @{}", me.username());
    }
    info!(
        registry = %cfg.registry_path.display(),
        nicknames = cfg.nicknames.len(),
        "relay configured"
    );

    let state = Arc::new(AppState {
        relay: Arc::new(build_relay(&cfg, bot.clone())),
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_edited_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .build();

    match &cfg.webhook {
        Some(hook) => {
            info!(url = %hook.url, addr = %hook.listen_addr, "listening for webhook updates");
            let options = webhooks::Options::new(hook.listen_addr, hook.url.parse()?);
            let listener = webhooks::axum(bot, options).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("webhook listener error"),
                )
                .await;
        }
        None => {
            info!("long polling for updates");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}
