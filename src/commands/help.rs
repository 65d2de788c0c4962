use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Stock Oracle Help")
        .description("Forecast a stock's next few closing prices and chart them next to its recent history.")
        .color(0x00b0f4)
        .field(
            "🔮 Predictions",
            "`$predict` - Post a prediction panel in this channel\n`$predict <SYMBOL>` - Predict a symbol right away",
            false,
        )
        .field(
            "📋 Panel",
            "Press **PREDICT THE FUTURE** and enter a ticker symbol.\nThe button is disabled while a prediction is running; each new prediction replaces the previous chart.",
            false,
        )
        .field(
            "🎯 General",
            "`$ping` - Check bot latency and prediction endpoint\n`$help` - Show this help message",
            false,
        );

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
