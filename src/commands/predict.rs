use serenity::all::{ChannelId, ComponentInteraction, CreateInteractionResponse, MessageId, ModalInteraction};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::config::Settings;
use crate::services::panel_service::{self, AlertTarget, DiscordPanel};
use crate::services::prediction_service::Outcome;

const BUSY_NOTICE: &str = "⏳ A prediction is already running in this channel.";

/// `$predict` posts a panel, `$predict <SYMBOL>` runs a prediction right away
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    tracing::info!("🔮 Predict command called with args: {:?}", args);

    match args.first() {
        None => open_panel(ctx, msg).await,
        Some(symbol) => submit(ctx, msg.channel_id, None, symbol, AlertTarget::Reply(msg.clone())).await,
    }
}

async fn open_panel(ctx: &Context, msg: &Message) -> Result<(), String> {
    let panel = panel_service::get_or_create_panel(ctx, msg.channel_id).await?;
    let Ok(mut guard) = panel.try_lock() else {
        msg.reply(ctx, BUSY_NOTICE).await.map_err(|e| e.to_string())?;
        return Ok(());
    };

    let message_id = panel_service::post_panel(&ctx.http, msg.channel_id, &mut guard.state).await?;
    tracing::info!("Posted prediction panel {} in channel {}", message_id, msg.channel_id);
    Ok(())
}

/// Panel button: open the symbol form
pub async fn open_form(ctx: &Context, component: &ComponentInteraction) -> Result<(), String> {
    tracing::debug!("Opening symbol form for user {}", component.user.id);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(panel_service::symbol_form()))
        .await
        .map_err(|e| format!("Failed to open symbol form: {}", e))
}

/// Symbol form submitted
pub async fn submit_form(ctx: &Context, modal: &ModalInteraction) -> Result<(), String> {
    modal
        .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
        .await
        .map_err(|e| format!("Failed to acknowledge form: {}", e))?;

    let input = panel_service::submitted_symbol(modal);
    let origin = modal.message.as_ref().map(|m| m.id);

    submit(ctx, modal.channel_id, origin, &input, AlertTarget::Interaction(modal.clone())).await
}

async fn submit(
    ctx: &Context,
    channel_id: ChannelId,
    origin: Option<MessageId>,
    input: &str,
    alerts: AlertTarget,
) -> Result<(), String> {
    let panel = panel_service::get_or_create_panel(ctx, channel_id).await?;

    // A held lock means the submit button is disabled
    let Ok(mut guard) = panel.try_lock() else {
        tracing::debug!("Prediction already running in channel {}", channel_id);
        panel_service::send_alert(&ctx.http, &alerts, BUSY_NOTICE)
            .await
            .map_err(|e| e.to_string())?;
        return Ok(());
    };

    let chart_size = {
        let data = ctx.data.read().await;
        data.get::<crate::BotSettings>()
            .map(|s| (s.chart_width, s.chart_height))
            .unwrap_or((Settings::DEFAULT_CHART_WIDTH, Settings::DEFAULT_CHART_HEIGHT))
    };

    let panel = &mut *guard;
    panel.state.message_id = panel_service::resolve_panel(origin, panel.state.message_id);
    if panel.state.message_id.is_none() {
        panel_service::post_panel(&ctx.http, channel_id, &mut panel.state).await?;
    }

    let mut view = DiscordPanel::new(ctx.http.clone(), channel_id, &mut panel.state, alerts, chart_size);
    match panel.controller.submit(&mut view, input).await {
        Outcome::Rendered { symbol } => {
            tracing::info!("✓ Prediction for {} posted in channel {}", symbol, channel_id);
        }
        Outcome::Failed { symbol, message } => {
            tracing::warn!("Prediction for {} failed in channel {}: {}", symbol, channel_id, message);
        }
        Outcome::Rejected => {
            tracing::debug!("Empty symbol submitted in channel {}", channel_id);
        }
    }

    Ok(())
}
