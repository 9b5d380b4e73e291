use eventplan_common::{
    EventType, Language, PlanRequest, Preference, MIN_BUDGET, MIN_GUEST_COUNT,
};
use serde::Deserialize;

pub const DEFAULT_GUEST_COUNT: u32 = 100;
pub const DEFAULT_BUDGET: u64 = MIN_BUDGET;

/// Raw widget values as they arrive from the planning form.
///
/// `collect` never fails: numbers are clamped to their minimums and unknown
/// choices fall back to the first option of each selector.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanForm {
    pub event_type: String,
    pub guest_count: String,
    pub location: String,
    pub budget: String,
    pub preference: String,
    pub language: String,
}

impl PlanForm {
    pub fn collect(&self) -> PlanRequest {
        let guests = parse_number(&self.guest_count).unwrap_or(u64::from(DEFAULT_GUEST_COUNT));
        let budget = parse_number(&self.budget).unwrap_or(DEFAULT_BUDGET);

        PlanRequest {
            event_type: self.event_type.parse().unwrap_or(EventType::ALL[0]),
            guest_count: clamp_guest_count(guests),
            location: self.location.trim().to_string(),
            budget: clamp_budget(budget),
            preference: self.preference.parse().unwrap_or(Preference::ALL[0]),
            language: parse_language(&self.language),
        }
    }
}

pub fn parse_language(raw: &str) -> Language {
    raw.parse().unwrap_or_default()
}

/// Accepts plain integers, tolerating `₹`, commas and a fractional part.
/// Digit strings too long for `u64` saturate rather than fall back to the default.
fn parse_number(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.starts_with('-') {
        return Some(0);
    }
    let whole = cleaned.split('.').next().unwrap_or_default();
    match whole.parse() {
        Ok(value) => Some(value),
        Err(_) if !whole.is_empty() && whole.bytes().all(|b| b.is_ascii_digit()) => {
            Some(u64::MAX)
        }
        Err(_) => None,
    }
}

pub fn clamp_guest_count(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX).max(MIN_GUEST_COUNT)
}

pub fn clamp_budget(value: u64) -> u64 {
    value.max(MIN_BUDGET)
}
