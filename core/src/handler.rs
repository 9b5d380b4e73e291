//! Command handler: one user action applied to one session.
//!
//! State is only written after every generation call of the action has
//! succeeded, so a failed call leaves the session exactly as it was.

use eventplan_common::{Language, PlanRequest};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::client::{GenerationError, ModelClient};
use crate::error::Result;
use crate::prompt::{analysis_prompt, manual_chat_prompt, plan_prompt, step_chat_prompt};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GeneratePlan(PlanRequest),
    SendStep { text: String },
    ResetStep,
    SendManual { text: String, language: Language },
    ResetManual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Session state changed.
    Updated,
    /// Nothing to do: blank input, or a follow-up with no plan to follow up on.
    Ignored,
}

pub async fn handle(
    client: &dyn ModelClient,
    session: &mut Session,
    action: Action,
) -> Result<Outcome> {
    match action {
        Action::GeneratePlan(request) => {
            let plan = generate_plan(client, &request).await?;
            session.step.start_plan(plan);
            session.plan_request = Some(request);
            info!(session = %session.id, "plan generated");
            Ok(Outcome::Updated)
        }
        Action::SendStep { text } => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Outcome::Ignored);
            }
            let Some(context) = session.step.context() else {
                debug!(session = %session.id, "follow-up without a plan ignored");
                return Ok(Outcome::Ignored);
            };
            let transcript = session.step.transcript_with(text);
            let prompt = step_chat_prompt(session.step_language(), context, &transcript);
            let reply = call(client, "step_chat", &prompt).await?;
            session.step.record_exchange(text.to_string(), reply);
            Ok(Outcome::Updated)
        }
        Action::ResetStep => {
            session.reset_step();
            info!(session = %session.id, "step-wise chat reset");
            Ok(Outcome::Updated)
        }
        Action::SendManual { text, language } => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Outcome::Ignored);
            }
            let prompt = manual_chat_prompt(language, &session.manual.transcript_with(text));
            let reply = call(client, "manual_chat", &prompt).await?;
            session.manual.record_exchange(text.to_string(), reply);
            session.manual_language = language;
            Ok(Outcome::Updated)
        }
        Action::ResetManual => {
            session.reset_manual();
            info!(session = %session.id, "manual chat reset");
            Ok(Outcome::Updated)
        }
    }
}

/// Two-stage generation: analyse priorities, then write the plan from that analysis.
pub async fn generate_plan(client: &dyn ModelClient, request: &PlanRequest) -> Result<String> {
    let analysis = call(client, "analysis", &analysis_prompt(request)).await?;
    let plan = call(client, "plan", &plan_prompt(request, &analysis)).await?;
    Ok(plan)
}

async fn call(
    client: &dyn ModelClient,
    stage: &'static str,
    prompt: &str,
) -> std::result::Result<String, GenerationError> {
    let started = Instant::now();
    match client.generate(prompt).await {
        Ok(text) => {
            debug!(
                stage,
                prompt_chars = prompt.chars().count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "generation done"
            );
            Ok(text.trim().to_string())
        }
        Err(err) => {
            warn!(stage, error = %err, "generation failed");
            Err(err)
        }
    }
}
