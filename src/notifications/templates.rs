//! Notification templates.
//!
//! A template kind plus the queued JSON payload render to a subject and an
//! HTML body at drain time, so a payload fix or template change applies to
//! anything still sitting in the queue.

use serde_json::Value;
use std::fmt;

use crate::error::{GauntletError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Strike warning carrying the consecutive-miss level (1 or 2)
    Strike(i32),
    /// Terminal elimination notice
    Elimination,
}

impl TemplateKind {
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    pub fn parse(s: &str) -> Result<Self> {
        if s == "elimination" {
            return Ok(Self::Elimination);
        }
        if let Some(level) = s.strip_prefix("strike_") {
            let level: i32 = level
                .parse()
                .map_err(|_| GauntletError::Template(format!("Unknown template kind: {s}")))?;
            return Ok(Self::Strike(level));
        }
        Err(GauntletError::Template(format!(
            "Unknown template kind: {s}"
        )))
    }

    pub fn subject(&self) -> String {
        match self {
            Self::Strike(level) => format!("Strike {level} - Gauntlet Daily Challenge"),
            Self::Elimination => "Eliminated - Gauntlet Daily Challenge".to_string(),
        }
    }

    /// Render the HTML body from the queued payload
    pub fn render(&self, payload: &Value) -> String {
        let name = str_field(payload, "name", "participant");
        let day = int_field(payload, "day_number");

        match self {
            Self::Strike(level) => {
                let remaining = int_field(payload, "remaining");
                format!(
                    r#"<html><body>
<h1>Strike {level}</h1>
<p>Hi <strong>{name}</strong>,</p>
<p>You missed the day {day} challenge.</p>
<p>Strikes remaining before elimination: <strong>{remaining}</strong>.</p>
<p>Solve today's challenge to reset your streak.</p>
</body></html>"#
                )
            }
            Self::Elimination => {
                let final_score = int_field(payload, "final_score");
                format!(
                    r#"<html><body>
<h1>Eliminated</h1>
<p>Hi <strong>{name}</strong>,</p>
<p>Three consecutive misses ended your run on day {day}.</p>
<p>Final score: <strong>{final_score}</strong>.</p>
<p>Thank you for playing.</p>
</body></html>"#
                )
            }
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strike(level) => write!(f, "strike_{level}"),
            Self::Elimination => write!(f, "elimination"),
        }
    }
}

fn str_field<'a>(payload: &'a Value, key: &str, default: &'a str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn int_field(payload: &Value, key: &str) -> i64 {
    payload.get(key).and_then(Value::as_i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(TemplateKind::Strike(2).as_str(), "strike_2");
        assert_eq!(
            TemplateKind::parse("strike_2").unwrap(),
            TemplateKind::Strike(2)
        );
        assert_eq!(
            TemplateKind::parse("elimination").unwrap(),
            TemplateKind::Elimination
        );
        assert!(TemplateKind::parse("postcard").is_err());
    }

    #[test]
    fn test_strike_render_includes_context() {
        let payload = json!({
            "name": "Ada",
            "day_number": 7,
            "strike_number": 2,
            "remaining": 1,
        });
        let html = TemplateKind::Strike(2).render(&payload);
        assert!(html.contains("Ada"));
        assert!(html.contains("day 7"));
        assert!(html.contains("<strong>1</strong>"));
    }

    #[test]
    fn test_elimination_render_includes_final_score() {
        let payload = json!({
            "name": "Ada",
            "day_number": 9,
            "final_score": 420,
        });
        let html = TemplateKind::Elimination.render(&payload);
        assert!(html.contains("420"));
        assert!(html.contains("day 9"));
    }
}
