//! Lenient parser for the EMOTION/CONFIDENCE/RESPONSE line protocol
//!
//! The remote LLM reports detection and generation over a free-text channel
//! with an informal line contract. The parser is an explicit two-state
//! machine (Seeking / InResponse) so the "ignore unknown lines, never fail"
//! behavior is testable in isolation: unknown lines are skipped, any field
//! may be missing, and a reply with no RESPONSE marker at all is used
//! verbatim as the response.

use solace_common::EmotionLabel;
use tracing::warn;

pub const EMOTION_MARKER: &str = "EMOTION:";
pub const CONFIDENCE_MARKER: &str = "CONFIDENCE:";
pub const RESPONSE_MARKER: &str = "RESPONSE:";

/// Structured fields extracted from one combined-generation reply
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub response: String,
    pub emotion: EmotionLabel,
    pub confidence: f64,
}

enum ParseState {
    Seeking,
    InResponse,
}

/// Coerce a reported label into the 5-set. Accepts the Arabic vocabulary the
/// model sometimes echoes back; anything unknown becomes Neutral with a
/// logged anomaly.
pub fn parse_emotion_value(raw: &str) -> EmotionLabel {
    let trimmed = raw.trim();
    if let Some(label) = EmotionLabel::parse_arabic(trimmed) {
        return label;
    }
    match EmotionLabel::parse(trimmed) {
        Some(label) => label,
        None => {
            warn!("Unexpected emotion label '{}', defaulting to Neutral", trimmed);
            EmotionLabel::Neutral
        }
    }
}

/// Parse a reported confidence, defaulting to 0.5 and clamping into [0, 1]
pub fn parse_confidence_value(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.5).clamp(0.0, 1.0)
}

/// Parse a combined detection+generation reply.
///
/// Never returns an empty response for non-empty input: when no RESPONSE
/// marker was seen, or it carried no text, the whole raw reply stands in.
pub fn parse_combined_reply(raw: &str) -> ParsedReply {
    let mut emotion = EmotionLabel::Neutral;
    let mut confidence = 0.5;
    let mut response_lines: Vec<&str> = Vec::new();
    let mut state = ParseState::Seeking;

    for line in raw.lines() {
        match state {
            ParseState::Seeking => {
                let trimmed = line.trim_start();
                if let Some(rest) = trimmed.strip_prefix(EMOTION_MARKER) {
                    emotion = parse_emotion_value(rest);
                } else if let Some(rest) = trimmed.strip_prefix(CONFIDENCE_MARKER) {
                    confidence = parse_confidence_value(rest);
                } else if let Some(rest) = trimmed.strip_prefix(RESPONSE_MARKER) {
                    let first = rest.trim();
                    if !first.is_empty() {
                        response_lines.push(first);
                    }
                    state = ParseState::InResponse;
                }
                // unknown lines ignored
            }
            // Everything after the RESPONSE marker belongs to the response,
            // embedded newlines preserved
            ParseState::InResponse => response_lines.push(line),
        }
    }

    let response = if response_lines.is_empty() {
        raw.trim().to_string()
    } else {
        response_lines.join("\n")
    };

    ParsedReply {
        response,
        emotion,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_round_trip() {
        let reply = parse_combined_reply("EMOTION: Sad\nCONFIDENCE: 0.7\nRESPONSE: line1\nline2");
        assert_eq!(reply.response, "line1\nline2");
        assert_eq!(reply.emotion, EmotionLabel::Sad);
        assert!((reply.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_no_response_marker_uses_raw_text() {
        let reply = parse_combined_reply("just some text");
        assert_eq!(reply.response, "just some text");
        assert_eq!(reply.emotion, EmotionLabel::Neutral);
        assert!((reply.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fields_without_response_fall_back_to_raw() {
        let raw = "EMOTION: Happy\nCONFIDENCE: 0.9";
        let reply = parse_combined_reply(raw);
        assert_eq!(reply.emotion, EmotionLabel::Happy);
        // no RESPONSE marker: whole reply stands in, never empty
        assert_eq!(reply.response, raw);
    }

    #[test]
    fn test_unknown_label_coerced_to_neutral() {
        let reply = parse_combined_reply("EMOTION: Excited\nRESPONSE: hi there");
        assert_eq!(reply.emotion, EmotionLabel::Neutral);
        assert_eq!(reply.response, "hi there");
    }

    #[test]
    fn test_arabic_label_mapped() {
        let reply = parse_combined_reply("EMOTION: محبط\nCONFIDENCE: 0.9\nRESPONSE: ok");
        assert_eq!(reply.emotion, EmotionLabel::Frustrated);
    }

    #[test]
    fn test_bad_confidence_defaults() {
        let reply = parse_combined_reply("CONFIDENCE: very sure\nRESPONSE: hi");
        assert!((reply.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamped() {
        let reply = parse_combined_reply("CONFIDENCE: 1.7\nRESPONSE: hi");
        assert!((reply.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_lines_ignored_and_whitespace_tolerated() {
        let reply = parse_combined_reply(
            "Here is my analysis:\n  EMOTION: Confused\nnoise line\n   CONFIDENCE: 0.6\nRESPONSE: step one\nstep two",
        );
        assert_eq!(reply.emotion, EmotionLabel::Confused);
        assert!((reply.confidence - 0.6).abs() < 1e-9);
        assert_eq!(reply.response, "step one\nstep two");
    }

    #[test]
    fn test_markers_after_response_belong_to_response() {
        let reply = parse_combined_reply("RESPONSE: first\nEMOTION: Sad");
        assert_eq!(reply.response, "first\nEMOTION: Sad");
        assert_eq!(reply.emotion, EmotionLabel::Neutral);
    }

    #[test]
    fn test_empty_response_marker_with_no_body_falls_back() {
        let raw = "EMOTION: Happy\nRESPONSE:";
        let reply = parse_combined_reply(raw);
        assert_eq!(reply.response, raw);
    }
}
