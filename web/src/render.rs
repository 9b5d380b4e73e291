//! HTML rendering for the planner page.

use eventplan_common::{ConversationEntry, EventType, Language, PlanRequest, Preference, Role};
use eventplan_core::Session;
use html_escape::{encode_double_quoted_attribute, encode_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Plan,
    Step,
    Manual,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub slot: Slot,
    pub message: String,
}

/// Everything the page needs besides the session itself.
#[derive(Debug, Clone)]
pub struct PageView {
    /// Values to pre-fill the planning form with.
    pub form: PlanRequest,
    pub notice: Option<Notice>,
}

impl PageView {
    pub fn for_session(session: &Session) -> Self {
        Self {
            form: session
                .plan_request
                .clone()
                .unwrap_or_else(|| eventplan_core::form::PlanForm::default().collect()),
            notice: None,
        }
    }
}

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#222}\
section{border:1px solid #ddd;border-radius:10px;padding:1rem 1.5rem;margin:1.5rem 0}\
label{display:block;margin:.5rem 0 .2rem}input,select,textarea{width:100%;padding:.4rem;box-sizing:border-box}\
.plan{border:2px solid #ccc;padding:15px;border-radius:10px;background:#fefefe;white-space:pre-wrap}\
.msg{padding:10px;border-radius:8px;margin:5px 0;white-space:pre-wrap}\
.error{background:#ffebee;border:1px solid #e57373;padding:10px;border-radius:8px;margin:8px 0}\
.row{display:flex;gap:1rem}.row form{flex:1}button{margin-top:.5rem;padding:.4rem 1rem}";

pub fn page(session: &Session, view: &PageView) -> String {
    let base = format!("/s/{}", session.id);
    let mut html = String::new();

    html.push_str("<!doctype html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>AI Event Budget Planner</title>");
    html.push_str(&format!("<style>{STYLE}</style></head><body>"));
    html.push_str("<h1>🎯 AI Event Budget Planner</h1>");
    html.push_str("<p>Get a personalized budget plan based on your event 🎉</p>");

    html.push_str("<section id=\"step\"><h2>Step-wise</h2>");
    render_plan_form(&mut html, &base, &view.form);
    render_notice(&mut html, view, Slot::Plan);

    if let Some(plan) = session.plan() {
        html.push_str("<h3>📝 Personalized Budget Plan</h3>");
        html.push_str(&format!("<div class=\"plan\">{}</div>", encode_text(plan)));
        html.push_str(&format!(
            "<p><a href=\"{base}/plan.txt\" download>📄 Download Plan</a></p>"
        ));

        html.push_str("<h3>💬 Ask follow-up questions</h3>");
        render_messages(&mut html, session.step.follow_ups(), "#e1f5fe", "#f1f8e9");
        render_notice(&mut html, view, Slot::Step);
        html.push_str(&format!(
            "<div class=\"row\"><form method=\"post\" action=\"{base}/step/send\">\
<label for=\"step-message\">Your question</label>\
<textarea id=\"step-message\" name=\"message\" rows=\"4\"></textarea>\
<button type=\"submit\">Send</button></form>\
<form method=\"post\" action=\"{base}/step/reset\"><button type=\"submit\">Reset Chat</button></form></div>"
        ));
    }
    html.push_str("</section>");

    html.push_str("<section id=\"manual\"><h2>💬 Chat with the Event Planner</h2>");
    render_messages(&mut html, session.manual.entries(), "#e3f2fd", "#fff8e1");
    render_notice(&mut html, view, Slot::Manual);
    let language = select(
        "manual-language",
        "language",
        Language::ALL.iter().map(|l| l.label()),
        session.manual_language.label(),
    );
    html.push_str(&format!(
        "<div class=\"row\"><form method=\"post\" action=\"{base}/manual/send\">\
<label for=\"manual-language\">Language</label>{language}\
<label for=\"manual-message\">Type your message</label>\
<textarea id=\"manual-message\" name=\"message\" rows=\"4\"></textarea>\
<button type=\"submit\">Send</button></form>\
<form method=\"post\" action=\"{base}/manual/reset\"><button type=\"submit\">Reset Chat</button></form></div>"
    ));
    html.push_str("</section>");

    html.push_str(&format!(
        "<form method=\"post\" action=\"{base}/end\"><button type=\"submit\">End session</button></form>"
    ));
    html.push_str("</body></html>");
    html
}

fn render_plan_form(html: &mut String, base: &str, form: &PlanRequest) {
    let event_type = select(
        "event_type",
        "event_type",
        EventType::ALL.iter().map(|e| e.as_str()),
        form.event_type.as_str(),
    );
    let preference = select(
        "preference",
        "preference",
        Preference::ALL.iter().map(|p| p.as_str()),
        form.preference.as_str(),
    );
    let language = select(
        "language",
        "language",
        Language::ALL.iter().map(|l| l.label()),
        form.language.label(),
    );
    html.push_str(&format!(
        "<form method=\"post\" action=\"{base}/plan\">\
<label for=\"event_type\">Event Type</label>{event_type}\
<label for=\"guest_count\">Number of Guests</label>\
<input id=\"guest_count\" name=\"guest_count\" type=\"number\" min=\"10\" step=\"1\" value=\"{guests}\">\
<label for=\"location\">Location (City)</label>\
<input id=\"location\" name=\"location\" type=\"text\" value=\"{location}\">\
<label for=\"budget\">Total Budget (₹)</label>\
<input id=\"budget\" name=\"budget\" type=\"number\" min=\"10000\" step=\"1\" value=\"{budget}\">\
<label for=\"preference\">Planning Style</label>{preference}\
<label for=\"language\">Language</label>{language}\
<button type=\"submit\">Generate Plan</button></form>",
        guests = form.guest_count,
        location = encode_double_quoted_attribute(&form.location),
        budget = form.budget,
    ));
}

fn select<'a>(
    id: &str,
    name: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) -> String {
    let mut out = format!("<select id=\"{id}\" name=\"{name}\">");
    for option in options {
        let marker = if option == selected { " selected" } else { "" };
        out.push_str(&format!("<option value=\"{option}\"{marker}>{option}</option>"));
    }
    out.push_str("</select>");
    out
}

fn render_messages(
    html: &mut String,
    entries: &[ConversationEntry],
    user_bg: &str,
    planner_bg: &str,
) {
    for entry in entries {
        let (bg, who) = match entry.role {
            Role::User => (user_bg, "🧑‍💬 <b>You</b>"),
            Role::Assistant => (planner_bg, "🤖 <b>Planner</b>"),
        };
        html.push_str(&format!(
            "<div class=\"msg\" style=\"background:{bg}\">{who}: {}</div>",
            encode_text(&entry.text)
        ));
    }
}

fn render_notice(html: &mut String, view: &PageView, slot: Slot) {
    if let Some(notice) = view.notice.as_ref().filter(|n| n.slot == slot) {
        html.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>",
            encode_text(&notice.message)
        ));
    }
}
