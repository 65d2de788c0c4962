use serenity::builder::{CreateMessage, EditMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::time::Instant;
use crate::services::ping_service;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let start_time = Instant::now();

    // The placeholder's roundtrip is the measured latency
    let mut response = msg
        .channel_id
        .send_message(ctx, CreateMessage::new().content("📊 Calculating metrics..."))
        .await
        .map_err(|e| e.to_string())?;

    let metrics = ping_service::get_ping_metrics(ctx, start_time).await?;
    tracing::debug!("Ping roundtrip {}ms", metrics.response_roundtrip);

    response
        .edit(ctx, EditMessage::new().content("").embed(ping_service::create_ping_embed(&metrics)))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
