//! Prompt text for the companion requests.

use std::fmt::Write as _;

use venti_core::constants::{COMMUNITY_PERSONAS, CRISIS_MARKER, MAX_COMMUNITY_MESSAGES};
use venti_core::{JournalEntry, MoodEntry, PersonaMessage, UserData};

pub(crate) fn companion_system_prompt(user_data: &UserData) -> String {
    let profile = &user_data.profile;
    let program = profile
        .program
        .map_or("The user has not selected a program yet.", |p| p.focus());

    format!(
        "You are Venti, an empathetic and supportive AI companion.\n\
         Your user's name is {name}. You are helping them through a breakup.\n\n\
         Use their context to personalize the conversation:\n\
         - The chapter of their life involving their ex is called \"{chapter}\".\n\
         - Reason for breakup: \"{reason}\".\n\
         - Their chosen 30-day program: \"{program}\". Align your advice with this goal.\n\n\
         Listen, validate their feelings, and gently reframe pain into motivation. \
         Do not give medical advice.\n\n\
         If the user expresses thoughts of self-harm or suicide, or seems to be in immediate \
         crisis, gently point them to the SOS feature and end your response with {CRISIS_MARKER}",
        name = profile.name,
        chapter = profile.chapter_name,
        reason = profile.breakup_context.reason,
    )
}

pub(crate) fn weekly_summary_prompt(entries: &[JournalEntry], moods: &[MoodEntry]) -> String {
    let mut mood_lines = String::new();
    for m in moods {
        let _ = writeln!(mood_lines, "Date: {}, Mood: {}/10", m.date, m.mood);
    }
    if mood_lines.is_empty() {
        mood_lines.push_str("No mood entries this week.\n");
    }

    let mut journal_lines = String::new();
    for e in entries {
        let _ = writeln!(journal_lines, "Date: {}, Content: \"{}\"", e.created_at.date_naive(), e.content);
    }
    if journal_lines.is_empty() {
        journal_lines.push_str("No journal entries this week.\n");
    }

    format!(
        "You are Venti, an AI companion reviewing a user's journal and mood data from the \
         last week. The user is going through a breakup. Be warm and encouraging, never clinical.\n\n\
         Moods (1=worst, 10=best):\n{mood_lines}\n\
         Journal entries:\n{journal_lines}\n\
         Write a short (2-3 paragraphs) summary. Acknowledge their effort, connect what they \
         wrote to their mood scores, highlight one step forward and end with gentle \
         encouragement. Address the user directly without using their name."
    )
}

pub(crate) fn community_prompt(history: &[PersonaMessage]) -> String {
    let transcript = history.iter().map(|m| format!("{}: {}", m.name, m.text)).collect::<Vec<_>>().join("\n");
    format!(
        "You moderate an AI-simulated support group for people going through a breakup. \
         Reply as up to {MAX_COMMUNITY_MESSAGES} of these personas:\n\
         - Liam: empathetic and gentle, validates feelings.\n\
         - Chloe: practical, gently challenges negative thoughts with small actions.\n\
         - Maya: hopeful and forward-looking.\n\n\
         Respond to the latest message with a JSON object {{\"messages\": [...]}} holding 1 to \
         {MAX_COMMUNITY_MESSAGES} objects with \"name\" (one of {personas}) and \"text\" \
         (1-2 sentences).\n\nChat history:\n{transcript}",
        personas = COMMUNITY_PERSONAS.join(", "),
    )
}

pub(crate) fn community_story_prompt(topic: &str) -> String {
    format!(
        "Based on the topic \"{topic}\", write a short (3-4 paragraphs), anonymous and hopeful \
         first-person story from someone who went through something similar and is now \
         healing. Focus on a small moment of realization and end on an empowering note."
    )
}
