//! Conversation transcripts
//!
//! A [`Transcript`] is the ordered list of role-tagged turns of a session,
//! rendered as `role: text` blocks once the run has finished.

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role the service uses for replies written by the agent
pub const AGENT_ROLE: &str = "assistant";

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who wrote the message ("user" or "assistant")
    pub role: String,

    /// Last text block of the message
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// Ordered conversation log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// All turns, oldest first
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent turn written by `role`
    pub fn last_by_role(&self, role: &str) -> Option<&TranscriptEntry> {
        self.entries.iter().rev().find(|e| e.role == role)
    }

    /// Score and color from the agent's final reply, if it answered in JSON
    pub fn score_badge(&self) -> Option<ScoreBadge> {
        self.last_by_role(AGENT_ROLE)
            .and_then(|entry| ScoreBadge::parse(&entry.text))
    }

    /// Write every turn as `role: text` followed by a blank line
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{}: {}\n", entry.role, entry.text)?;
        }
        Ok(())
    }
}

impl FromIterator<TranscriptEntry> for Transcript {
    fn from_iter<I: IntoIterator<Item = TranscriptEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// `score` and `color` fields of a JSON scorecard reply
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBadge {
    pub score: Option<Value>,
    pub color: Option<String>,
}

impl ScoreBadge {
    /// Parse a reply that is a JSON object, bare or inside a ```json fence
    ///
    /// Returns `None` unless the object carries `score` or `color`.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(strip_code_fence(text)).ok()?;
        let object = value.as_object()?;

        let score = object.get("score").filter(|v| !v.is_null()).cloned();
        let color = object.get("color").and_then(Value::as_str).map(str::to_string);

        if score.is_none() && color.is_none() {
            return None;
        }

        Some(Self { score, color })
    }

    /// Write the fields that are present, one per line
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if let Some(score) = &self.score {
            match score {
                Value::String(s) => writeln!(out, "Score: {}", s)?,
                other => writeln!(out, "Score: {}", other)?,
            }
        }
        if let Some(color) = &self.color {
            writeln!(out, "Color: {}", color)?;
        }
        Ok(())
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") up to the first newline
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
