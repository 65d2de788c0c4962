use chrono::{DateTime, Utc};
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn, error, debug};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;

use api::predictor::PredictorClient;
use config::Settings;
use services::panel_service::PredictionPanels;

struct Handler;

/// Bot start time
struct BotData;

impl TypeMapKey for BotData {
    type Value = DateTime<Utc>;
}

struct BotSettings;

impl TypeMapKey for BotSettings {
    type Value = Settings;
}

/// Shared client for the prediction endpoint
struct Predictor;

impl TypeMapKey for Predictor {
    type Value = PredictorClient;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        commands::handle_interaction(&ctx, &interaction).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        // Check for rate limits now that bot is connected
        debug!("Checking Discord rate limit status...");
        match ctx.http.get_current_user().await {
            Ok(_) => {
                info!("No rate limit detected - Bot is fully ready!");
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("429") || error_msg.contains("rate limit") || error_msg.contains("Ratelimited") {
                    warn!("Bot is being rate limited by Discord! Error: {}", error_msg);
                } else {
                    warn!("Failed to check rate limit status: {}", error_msg);
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let mut filter = EnvFilter::from_default_env();
    for directive in ["stock_oracle=debug", "serenity=warn"] {
        match directive.parse::<tracing_subscriber::filter::Directive>() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("Invalid log directive {}: {}", directive, e),
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("🔮 Starting Stock Oracle bot...");

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let predictor = match PredictorClient::new(settings.predict_endpoint.clone(), settings.request_timeout) {
        Ok(c) => {
            info!("Prediction endpoint: {}", c.endpoint());
            c
        }
        Err(e) => {
            error!("Failed to create prediction client: {}", e);
            return;
        }
    };

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&settings.discord_token, intents)
        .event_handler(Handler)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    // Store the start time, settings and shared state in client data
    {
        let mut data = client.data.write().await;
        data.insert::<BotData>(Utc::now());
        data.insert::<BotSettings>(settings);
        data.insert::<Predictor>(predictor);
        data.insert::<PredictionPanels>(Arc::new(Mutex::new(HashMap::new())));
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
