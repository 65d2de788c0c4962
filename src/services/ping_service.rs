use chrono::{DateTime, Utc};
use serenity::prelude::*;
use std::time::Instant;

use crate::models::PingMetrics;

/// Format an elapsed span as "1h 2m 3s"
pub fn format_uptime(started: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - started).num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

pub async fn get_ping_metrics(ctx: &Context, start_time: Instant) -> Result<PingMetrics, String> {
    let response_roundtrip = start_time.elapsed().as_millis() as u64;

    // Get bot uptime and endpoint from client data
    let (uptime, predict_endpoint) = {
        let data = ctx.data.read().await;
        let uptime = match data.get::<crate::BotData>() {
            Some(&started) => format_uptime(started, Utc::now()),
            None => "Unknown".to_string(),
        };
        let endpoint = data
            .get::<crate::Predictor>()
            .map(|client| client.endpoint().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        (uptime, endpoint)
    };

    Ok(PingMetrics {
        response_roundtrip,
        uptime,
        predict_endpoint,
    })
}

pub fn create_ping_embed(metrics: &PingMetrics) -> serenity::builder::CreateEmbed {
    serenity::builder::CreateEmbed::default()
        .title("Pong! 🏓")
        .field("Response Roundtrip", format!("{}ms", metrics.response_roundtrip), true)
        .field("Uptime", &metrics.uptime, true)
        .field("Prediction Endpoint", format!("`{}`", metrics.predict_endpoint), false)
        .color(0x00b0f4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_uptime() {
        let started = Utc::now();
        let now = started + Duration::seconds(3 * 3600 + 25 * 60 + 7);
        assert_eq!(format_uptime(started, now), "3h 25m 7s");
        assert_eq!(format_uptime(now, started), "0h 0m 0s");
    }
}
