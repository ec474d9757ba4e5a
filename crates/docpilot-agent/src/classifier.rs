//! LLM-backed intent classifier and its tolerant decoder.
//!
//! The classifier only runs while a document session is active. Its output is
//! free-form model text, so decoding accepts code fences, commentary around
//! the JSON object, camelCase keys, loose action spellings and missing
//! optional fields. Anything that cannot be understood decodes to
//! [`RoutingDecision::safe_default`].

use std::sync::Arc;

use docpilot_models::{DocType, DocumentSession, RoutingAction, RoutingDecision};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::context::TurnContext;
use crate::error::Result;
use crate::model::ModelClient;
use crate::parse::{extract_json_object, strip_code_fences};
use crate::prompts::classifier_prompt;

/// Confidence assumed when the model omits it.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Routes utterances during an active session.
#[derive(Clone)]
pub struct IntentClassifier {
    model: Arc<dyn ModelClient>,
}

impl IntentClassifier {
    /// Create a classifier backed by `model`.
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Classify `utterance` in the context of the active `session`.
    ///
    /// Returns an error only if the model call itself fails; unparseable
    /// output yields the safe default.
    pub async fn classify(
        &self,
        utterance: &str,
        session: &DocumentSession,
        ctx: &TurnContext,
    ) -> Result<RoutingDecision> {
        let prompt = classifier_prompt(utterance, session, ctx.history_window);
        let raw = self.model.complete(&prompt).await?;
        trace!(raw = %raw, "Classifier output");

        let decision = parse_routing_decision(&raw);
        debug!(
            session_id = %session.id,
            action = %decision.action,
            confidence = decision.confidence,
            requires_confirmation = decision.requires_confirmation,
            "Classified utterance"
        );
        Ok(decision)
    }
}

/// Decode model text, falling back to the safe default.
pub fn parse_routing_decision(text: &str) -> RoutingDecision {
    decode_routing_decision(text).unwrap_or_else(|| {
        warn!("Unparseable classifier output, routing to agent");
        RoutingDecision::safe_default("classifier output could not be parsed")
    })
}

/// Decode model text into a decision, or `None` if it makes no sense.
pub fn decode_routing_decision(text: &str) -> Option<RoutingDecision> {
    let body = strip_code_fences(text);
    let json = extract_json_object(body)?;
    let wire: WireDecision = serde_json::from_str(json).ok()?;

    let action = parse_action(&wire.action)?;
    let confidence = wire
        .confidence
        .as_ref()
        .and_then(parse_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);
    let reason = wire
        .reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| format!("classified as {}", action));

    let mut decision = RoutingDecision::new(action, confidence, reason).with_confirmation(
        wire.requires_confirmation
            .as_ref()
            .and_then(parse_flag)
            .unwrap_or(false),
    );

    if let Some(doc_type) = wire
        .target_doc_type
        .as_deref()
        .and_then(|s| s.parse::<DocType>().ok())
    {
        decision = decision.with_target_doc_type(doc_type);
    }
    if let Some(agent) = wire
        .target_agent
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
    {
        decision = decision.with_target_agent(agent);
    }

    Some(decision)
}

#[derive(Debug, Deserialize)]
struct WireDecision {
    #[serde(alias = "routingAction", alias = "decision")]
    action: String,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default, alias = "reasoning", alias = "rationale")]
    reason: Option<String>,
    #[serde(default, alias = "requiresConfirmation")]
    requires_confirmation: Option<Value>,
    #[serde(default, alias = "targetDocType", alias = "doc_type", alias = "docType")]
    target_doc_type: Option<String>,
    #[serde(default, alias = "targetAgent", alias = "agent")]
    target_agent: Option<String>,
}

fn parse_action(raw: &str) -> Option<RoutingAction> {
    let normalized = raw.trim().to_lowercase().replace(['-', ' '], "_");
    match normalized.as_str() {
        "route_to_agent" | "routetoagent" | "agent" | "route_agent" => {
            Some(RoutingAction::RouteToAgent)
        }
        "continue_doc" | "continuedoc" | "continue" | "continue_document" => {
            Some(RoutingAction::ContinueDoc)
        }
        "start_new_doc" | "startnewdoc" | "new_doc" | "start_new" | "start_new_document"
        | "switch" => Some(RoutingAction::StartNewDoc),
        _ => None,
    }
}

fn parse_confidence(value: &Value) -> Option<f32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    // Accept percentages ("85" or "85%")
    let scaled = if raw > 1.0 && raw <= 100.0 { raw / 100.0 } else { raw };
    Some(scaled as f32)
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
