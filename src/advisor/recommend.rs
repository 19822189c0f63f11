//! Recommendation requester: turns current readings and trends into a
//! natural-language prompt and returns whatever the completion API says.
//!
//! Failures are absorbed into the returned text. The caller always gets a
//! displayable string, never an error to handle; the UI contract of the
//! original monitor is "show something".

use std::sync::Arc;
use tracing::error;

use crate::advisor::provider::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::monitor::{HistorySnapshot, LiveSnapshot, SensorKind, Trend};

/// Shown when the transport fails or the response shape is unusable.
pub const UNAVAILABLE_REPLY: &str =
    "The recommendation service could not be reached. Please try again.";

pub struct Advisor {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    baby_name: String,
}

impl Advisor {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: String, baby_name: String) -> Self {
        Self { provider, model, baby_name }
    }

    /// Detailed recommendation from current values plus per-sensor trends.
    pub async fn recommendation(&self, live: &LiveSnapshot, history: &HistorySnapshot) -> String {
        let prompt = self.recommendation_prompt(live, history);
        self.ask(prompt, 0.7, 300).await
    }

    /// Short one-shot observation about the current readings only.
    pub async fn quick_observation(&self, live: &LiveSnapshot) -> String {
        let prompt = self.observation_prompt(live);
        self.ask(prompt, 0.3, 100).await
    }

    async fn ask(&self, prompt: String, temperature: f64, max_completion_tokens: u32) -> String {
        let request = CompletionRequest {
            model: self.model.clone(),
            temperature,
            max_completion_tokens,
            top_p: 1.0,
            messages: vec![ChatMessage::user(prompt)],
        };

        match self.provider.complete(request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!("recommendation request failed: {e:#}");
                UNAVAILABLE_REPLY.to_string()
            }
        }
    }

    fn current_block(&self, live: &LiveSnapshot) -> String {
        format!(
            "Current readings:\n\
             - Temperature: {:.1}°C\n\
             - Humidity: {:.1}%\n\
             - Gas level: {:.2} ppa",
            live.temperature.value, live.humidity.value, live.gas.value
        )
    }

    fn trend_block(&self, history: &HistorySnapshot) -> String {
        let line = |kind: SensorKind| format!("- {}: {}", kind, Trend::of(history.series(kind)));
        format!(
            "Recent trends:\n{}\n{}\n{}",
            line(SensorKind::Temperature),
            line(SensorKind::Humidity),
            line(SensorKind::Gas)
        )
    }

    fn recommendation_prompt(&self, live: &LiveSnapshot, history: &HistorySnapshot) -> String {
        format!(
            "You are an expert in infant care and environmental monitoring. Analyze the \
             following data from the monitor in {name}'s room and give the parents a \
             detailed recommendation (100 words maximum):\n\n\
             {current}\n\n\
             {trends}\n\n\
             Consider:\n\
             1. Current room conditions\n\
             2. Recent trends\n\
             3. Possible risks or improvements\n\
             4. Recommended actions\n\
             5. Good times of day to ventilate\n\n\
             Reply with the recommendation directly, without an introduction.",
            name = self.baby_name,
            current = self.current_block(live),
            trends = self.trend_block(history),
        )
    }

    fn observation_prompt(&self, live: &LiveSnapshot) -> String {
        format!(
            "Based on these readings from the baby monitor:\n\
             - Temperature: {temp:.0}°C\n\
             - Humidity: {hum:.0}%\n\
             - Gas level: {gas:.2} ppa\n\n\
             Give one concise observation (40 words maximum) about the environment in the \
             baby's room. Be specific and include recommendations if needed. \
             Reply with the observation directly, without an introduction.",
            temp = live.temperature.value,
            hum = live.humidity.value,
            gas = live.gas.value,
        )
    }
}
