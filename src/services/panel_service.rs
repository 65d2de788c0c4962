//! Discord prediction panel
//!
//! A panel is one channel message carrying the "Prediction" and "Sentiment"
//! fields and the submit button. Pressing the button opens the symbol form
//! (a modal); the chart is posted as a separate image message.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::all::{
    ActionRowComponent, ButtonStyle, ChannelId, CreateActionRow, CreateAttachment, CreateButton,
    CreateEmbed, CreateInputText, CreateInteractionResponseFollowup, CreateMessage, CreateModal,
    EditMessage, Http, InputTextStyle, Message, MessageId, ModalInteraction,
};
use serenity::async_trait;
use serenity::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::predictor::PredictorClient;
use crate::models::ChartConfig;
use crate::services::chart_service;
use crate::services::prediction_service::{
    PredictionController, PredictionView, ViewError, BUSY_LABEL, ERROR_TEXT, SUBMIT_LABEL,
};

pub const OPEN_FORM_ID: &str = "predict:open";
pub const FORM_ID: &str = "predict:form";
pub const SYMBOL_INPUT_ID: &str = "symbol";

const IDLE_TEXT: &str = "-";

/// Registry of panels, one per channel.
///
/// Entries live for the bot's lifetime; a panel whose message was deleted is
/// reposted on its next use rather than evicted.
pub struct PredictionPanels;

impl TypeMapKey for PredictionPanels {
    type Value = Arc<Mutex<HashMap<ChannelId, Arc<Mutex<PredictionPanel>>>>>;
}

/// What a panel message currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub message_id: Option<MessageId>,
    pub prediction: String,
    pub sentiment: String,
    pub button_label: String,
    pub button_enabled: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            message_id: None,
            prediction: IDLE_TEXT.to_string(),
            sentiment: IDLE_TEXT.to_string(),
            button_label: SUBMIT_LABEL.to_string(),
            button_enabled: true,
        }
    }
}

impl PanelState {
    fn color(&self) -> u32 {
        if self.prediction == ERROR_TEXT {
            0xff0000
        } else if self.button_label == BUSY_LABEL {
            0xffa500
        } else {
            0x00b0f4
        }
    }
}

/// A channel's controller together with its panel message
pub struct PredictionPanel {
    pub controller: PredictionController<PredictorClient, MessageId>,
    pub state: PanelState,
}

impl PredictionPanel {
    pub fn new(client: PredictorClient) -> Self {
        Self {
            controller: PredictionController::new(client),
            state: PanelState::default(),
        }
    }
}

pub fn panel_embed(state: &PanelState) -> CreateEmbed {
    CreateEmbed::new()
        .title("🔮 Stock Prediction")
        .description("Press the button and enter a ticker symbol to forecast its price.")
        .field("Prediction", &state.prediction, true)
        .field("Sentiment", &state.sentiment, true)
        .color(state.color())
}

pub fn panel_components(state: &PanelState) -> Vec<CreateActionRow> {
    let button = CreateButton::new(OPEN_FORM_ID)
        .label(&state.button_label)
        .style(ButtonStyle::Primary)
        .disabled(!state.button_enabled);
    vec![CreateActionRow::Buttons(vec![button])]
}

/// The symbol form opened by the panel button
pub fn symbol_form() -> CreateModal {
    let input = CreateInputText::new(InputTextStyle::Short, "Stock symbol", SYMBOL_INPUT_ID)
        .placeholder("e.g. AAPL")
        .required(false);
    CreateModal::new(FORM_ID, "Stock Prediction").components(vec![CreateActionRow::InputText(input)])
}

/// Raw text entered in the symbol form
pub fn submitted_symbol(modal: &ModalInteraction) -> String {
    modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == SYMBOL_INPUT_ID => input.value.clone(),
            _ => None,
        })
        .unwrap_or_default()
}

/// Panel message a submission should drive: the one whose button was
/// pressed, else the tracked one
pub fn resolve_panel(origin: Option<MessageId>, tracked: Option<MessageId>) -> Option<MessageId> {
    origin.or(tracked)
}

/// Post a fresh panel message and track it
pub async fn post_panel(http: &Arc<Http>, channel_id: ChannelId, state: &mut PanelState) -> Result<MessageId, String> {
    let message = channel_id
        .send_message(
            http,
            CreateMessage::new()
                .embed(panel_embed(state))
                .components(panel_components(state)),
        )
        .await
        .map_err(|e| format!("Failed to post prediction panel: {}", e))?;

    if let Some(previous) = state.message_id.replace(message.id) {
        if let Err(e) = channel_id.delete_message(http, previous).await {
            debug!("Old panel {} already gone: {}", previous, e);
        }
    }

    Ok(message.id)
}

/// Fetch the channel's panel, creating an empty one on first use
pub async fn get_or_create_panel(ctx: &Context, channel_id: ChannelId) -> Result<Arc<Mutex<PredictionPanel>>, String> {
    let (panels, client) = {
        let data = ctx.data.read().await;
        let panels = data
            .get::<PredictionPanels>()
            .ok_or("Prediction panels not initialized".to_string())?
            .clone();
        let client = data
            .get::<crate::Predictor>()
            .ok_or("Prediction client not initialized".to_string())?
            .clone();
        (panels, client)
    };

    let mut panels = panels.lock().await;
    let panel = panels
        .entry(channel_id)
        .or_insert_with(|| Arc::new(Mutex::new(PredictionPanel::new(client))))
        .clone();
    Ok(panel)
}

/// Where user-facing alerts are delivered
#[derive(Clone)]
pub enum AlertTarget {
    /// Ephemeral follow-up to a form submission
    Interaction(ModalInteraction),
    /// Reply to a text command
    Reply(Message),
}

pub async fn send_alert(http: &Arc<Http>, target: &AlertTarget, text: &str) -> Result<(), ViewError> {
    let sent = match target {
        AlertTarget::Interaction(modal) => modal
            .create_followup(http, CreateInteractionResponseFollowup::new().content(text).ephemeral(true))
            .await
            .map(|_| ()),
        AlertTarget::Reply(msg) => msg.reply(http, text).await.map(|_| ()),
    };
    sent.map_err(|e| ViewError::Surface(e.to_string()))
}

/// [`PredictionView`] backed by a panel message
pub struct DiscordPanel<'a> {
    http: Arc<Http>,
    channel_id: ChannelId,
    state: &'a mut PanelState,
    alerts: AlertTarget,
    chart_size: (u32, u32),
}

impl<'a> DiscordPanel<'a> {
    pub fn new(
        http: Arc<Http>,
        channel_id: ChannelId,
        state: &'a mut PanelState,
        alerts: AlertTarget,
        chart_size: (u32, u32),
    ) -> Self {
        Self { http, channel_id, state, alerts, chart_size }
    }

    /// Edit the panel message, reposting it when the tracked one is gone
    async fn refresh(&mut self) -> Result<(), ViewError> {
        if let Some(message_id) = self.state.message_id {
            let edited = self
                .channel_id
                .edit_message(
                    &self.http,
                    message_id,
                    EditMessage::new()
                        .embed(panel_embed(self.state))
                        .components(panel_components(self.state)),
                )
                .await;

            match edited {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!("Panel {} in channel {} not editable, reposting: {}", message_id, self.channel_id, e);
                    self.state.message_id = None;
                }
            }
        }

        post_panel(&self.http, self.channel_id, &mut *self.state)
            .await
            .map(|_| ())
            .map_err(ViewError::Surface)
    }
}

#[async_trait]
impl<'a> PredictionView for DiscordPanel<'a> {
    type Chart = MessageId;

    async fn set_submit_control(&mut self, label: &str, enabled: bool) -> Result<(), ViewError> {
        self.state.button_label = label.to_string();
        self.state.button_enabled = enabled;
        self.refresh().await
    }

    async fn set_results(&mut self, prediction: &str, sentiment: &str) -> Result<(), ViewError> {
        self.state.prediction = prediction.to_string();
        self.state.sentiment = sentiment.to_string();
        self.refresh().await
    }

    async fn alert(&mut self, message: &str) -> Result<(), ViewError> {
        send_alert(&self.http, &self.alerts, message).await
    }

    async fn draw_chart(&mut self, config: &ChartConfig) -> Result<MessageId, ViewError> {
        let (width, height) = self.chart_size;
        let image = chart_service::render_png_blocking(config.clone(), width, height).await?;
        debug!("Posting chart to channel {} ({} bytes)", self.channel_id, image.len());

        let message = self
            .channel_id
            .send_message(
                &self.http,
                CreateMessage::new()
                    .content(format!("📈 **{}**", config.title))
                    .add_file(CreateAttachment::bytes(image, "prediction.png")),
            )
            .await
            .map_err(|e| ViewError::Surface(format!("Failed to send chart: {}", e)))?;

        Ok(message.id)
    }

    async fn destroy_chart(&mut self, chart: MessageId) -> Result<(), ViewError> {
        // A moderator may have removed the chart already
        if let Err(e) = self.channel_id.delete_message(&self.http, chart).await {
            warn!("Failed to delete previous chart {}: {}", chart, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state = PanelState::default();
        assert_eq!(state.button_label, "PREDICT THE FUTURE");
        assert!(state.button_enabled);
        assert_eq!(state.message_id, None);
        assert_eq!(state.color(), 0x00b0f4);
    }

    #[test]
    fn test_state_colors() {
        let busy = PanelState {
            button_label: BUSY_LABEL.to_string(),
            button_enabled: false,
            ..Default::default()
        };
        assert_eq!(busy.color(), 0xffa500);

        let failed = PanelState {
            prediction: ERROR_TEXT.to_string(),
            sentiment: ERROR_TEXT.to_string(),
            ..Default::default()
        };
        assert_eq!(failed.color(), 0xff0000);
    }

    #[test]
    fn test_pressed_panel_wins_over_tracked() {
        let pressed = MessageId::new(10);
        let tracked = MessageId::new(20);

        assert_eq!(resolve_panel(Some(pressed), Some(tracked)), Some(pressed));
        assert_eq!(resolve_panel(None, Some(tracked)), Some(tracked));
        assert_eq!(resolve_panel(Some(pressed), None), Some(pressed));
        assert_eq!(resolve_panel(None, None), None);
    }
}
