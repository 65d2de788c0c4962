pub mod help;
pub mod ping;
pub mod predict;

use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::panel_service::{FORM_ID, OPEN_FORM_ID};

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    // Parse command and arguments
    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    if parts.is_empty() {
        return;
    }

    let command = parts[0];
    let args = &parts[1..];

    let result = match command {
        "$ping" => ping::execute(ctx, msg).await,
        "$help" => help::execute(ctx, msg).await,
        "$predict" | "$forecast" => predict::execute(ctx, msg, args).await,
        _ => return,
    };

    if let Err(e) = result {
        tracing::error!("❌ Error executing command {}: {}", command, e);

        let user_message = if e.contains("429") || e.contains("rate limit") {
            "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string()
        } else if e.is_empty() {
            "❌ An error occurred while executing the command.".to_string()
        } else {
            format!("❌ {}", e)
        };

        // Send error to user as Discord message embed
        let embed = serenity::builder::CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);

        let _ = msg.channel_id
            .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
            .await;
    }
}

pub async fn handle_interaction(ctx: &Context, interaction: &Interaction) {
    let result = match interaction {
        Interaction::Component(component) if component.data.custom_id == OPEN_FORM_ID => {
            predict::open_form(ctx, component).await
        }
        Interaction::Modal(modal) if modal.data.custom_id == FORM_ID => {
            predict::submit_form(ctx, modal).await
        }
        _ => return,
    };

    if let Err(e) = result {
        tracing::error!("❌ Error handling interaction: {}", e);
    }
}
