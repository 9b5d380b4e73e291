//! Prompt templates for plan generation and follow-up chat.
//!
//! Everything here is a pure function of its inputs: the same request always
//! renders the same text.

use eventplan_common::{ConversationEntry, Language, PlanRequest, Role};

pub const COST_SAVING_CLAUSE: &str =
    "Focus on cost-saving essentials. Avoid luxury items unless necessary.";
pub const BALANCE_CLAUSE: &str =
    "Maintain balance between quality and cost. Optimize across major categories.";
pub const PREMIUM_CLAUSE: &str =
    "Emphasize premium experiences with top-tier vendors and personalization.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    CostSaving,
    Balanced,
    Premium,
}

impl BudgetTier {
    pub fn for_budget(budget: u64) -> Self {
        match budget {
            b if b < 50_000 => BudgetTier::CostSaving,
            b if b < 200_000 => BudgetTier::Balanced,
            _ => BudgetTier::Premium,
        }
    }

    pub fn clause(&self) -> &'static str {
        match self {
            BudgetTier::CostSaving => COST_SAVING_CLAUSE,
            BudgetTier::Balanced => BALANCE_CLAUSE,
            BudgetTier::Premium => PREMIUM_CLAUSE,
        }
    }
}

/// Focus guidance keyed by event type label. Unknown labels get no guidance.
pub fn event_focus_clause(event_type: &str) -> &'static str {
    match event_type {
        "Wedding" => "Give more attention to decoration, catering, and venue ambiance.",
        "Birthday" => "Focus on entertainment, cake, and decoration suited to age group.",
        "Corporate" => "Prioritize venue quality, audio/visual setup, and branding.",
        "Festival" => "Emphasize theme-based decoration, lighting, and cultural elements.",
        _ => "",
    }
}

/// First stage: ask the model to analyse priorities before planning.
pub fn analysis_prompt(request: &PlanRequest) -> String {
    let lang = request.language.prompt_name();
    let priority = BudgetTier::for_budget(request.budget).clause();
    let focus = event_focus_clause(request.event_type.as_str());

    format!(
        "You are an experienced Indian event planner. Strictly respond in {lang}. \
Analyze the user's budget priorities and needs.

Inputs:
- Event Type: {event_type}
- Guests: {guests}
- Location: {location}
- Budget: ₹{budget}
- Preference: {preference}

Guidelines:
{priority}
{focus}

Summarize key goals and planning strategy.
",
        event_type = request.event_type,
        guests = request.guest_count,
        location = request.location,
        budget = request.budget,
        preference = request.preference,
    )
}

/// Second stage: the full plan, grounded on the first stage's analysis.
pub fn plan_prompt(request: &PlanRequest, analysis: &str) -> String {
    let lang = request.language.prompt_name();

    format!(
        "You are an expert Indian event planner. Generate a complete event budget plan \
with categories like venue, catering, decoration, etc. Only respond in {lang} without \
mixing English. Include smart tips.

Details:
- Type: {event_type}
- Guests: {guests}
- Location: {location}
- Budget: ₹{budget}
- Preference: {preference}
- Planning Context: {analysis}
",
        event_type = request.event_type,
        guests = request.guest_count,
        location = request.location,
        budget = request.budget,
        preference = request.preference,
        analysis = analysis.trim(),
    )
}

/// Role-labelled transcript, one line per entry, with an optional not-yet-recorded user turn.
pub fn render_transcript(entries: &[ConversationEntry], pending_user: Option<&str>) -> String {
    entries
        .iter()
        .map(|e| (e.role, e.text.as_str()))
        .chain(pending_user.map(|text| (Role::User, text)))
        .map(|(role, text)| format!("{}: {text}", role.speaker()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Follow-up on a generated plan: the stored plan context, then the whole transcript.
pub fn step_chat_prompt(language: Language, context: &str, transcript: &str) -> String {
    format!(
        "You are an event planner. Always reply in {}.\n\n{context}\n\n{transcript}",
        language.prompt_name()
    )
}

/// Free chat without plan context.
pub fn manual_chat_prompt(language: Language, transcript: &str) -> String {
    format!(
        "You are an Indian event planner. Always reply in {}.\n\n{transcript}",
        language.prompt_name()
    )
}
