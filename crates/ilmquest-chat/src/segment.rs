//! Response segmentation: split generated text into an answer and follow-ups.
//!
//! The model is only asked, not forced, to format its output. Three tiers are
//! tried in a fixed order and the first one that recognizes structure wins:
//!
//! 1. **Sentinel** - the literal sentinel separates answer from a JSON payload.
//! 2. **Fenced** - no sentinel, but the text contains triple-backtick blocks;
//!    the last block is taken as the payload.
//! 3. **Plain** - nothing recognizable; the whole text is the answer.
//!
//! Segmentation is total: malformed payloads yield an empty follow-up list,
//! never an error.

use std::sync::LazyLock;

use ilmquest_core::config::{DEFAULT_FALLBACK_ANSWER, DEFAULT_SENTINEL};
use regex::Regex;
use serde_json::Value;

// =============================================================================
// Compiled patterns
// =============================================================================

/// Opening or closing fence marker, optionally tagged `json` (any case).
static FENCE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```json|```").expect("Invalid fence marker regex"));

/// A complete fenced block, shortest match.
static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:json)?[\s\S]*?```").expect("Invalid fenced block regex")
});

/// Outermost bracketed span, greedy across newlines.
static BRACKETED_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").expect("Invalid bracketed array regex"));

/// Object key that may wrap the follow-up array.
const FOLLOWUPS_KEY: &str = "suggested_followups";

// =============================================================================
// Result types
// =============================================================================

/// Which strategy produced a [`Segmentation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Sentinel,
    Fenced,
    Plain,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Sentinel => "sentinel",
            Tier::Fenced => "fenced",
            Tier::Plain => "plain",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the follow-up payload was (or was not) extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Payload parsed as an array or as an object carrying the array.
    Ok,
    /// Payload was not valid JSON, but a bracketed array inside it was.
    Recovered,
    /// Sentinel present, payload unusable.
    SentinelMalformed,
    /// Fenced block present, contents unusable.
    FenceMalformed,
    /// No structure found.
    NoneFound,
}

impl ParseOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseOutcome::Ok => "ok",
            ParseOutcome::Recovered => "recovered",
            ParseOutcome::SentinelMalformed => "sentinel-malformed",
            ParseOutcome::FenceMalformed => "fence-malformed",
            ParseOutcome::NoneFound => "none-found",
        }
    }
}

impl std::fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer text and follow-ups extracted from one block of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub answer_text: String,
    pub suggested_followups: Vec<String>,
    pub tier: Tier,
    pub outcome: ParseOutcome,
}

// =============================================================================
// ResponseSegmenter
// =============================================================================

/// Splits generated text into an answer and suggested follow-up questions.
#[derive(Debug, Clone)]
pub struct ResponseSegmenter {
    sentinel: String,
    fallback_answer: String,
}

impl Default for ResponseSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL, DEFAULT_FALLBACK_ANSWER)
    }
}

impl ResponseSegmenter {
    /// Create a segmenter using `sentinel` as the tier-1 marker.
    ///
    /// `fallback_answer` replaces an empty input in the plain tier.
    pub fn new(sentinel: impl Into<String>, fallback_answer: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            fallback_answer: fallback_answer.into(),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Segment `raw`. Never fails.
    pub fn segment(&self, raw: &str) -> Segmentation {
        self.split_on_sentinel(raw)
            .or_else(|| split_on_last_fence(raw))
            .unwrap_or_else(|| self.plain(raw))
    }

    /// Tier 1. `None` when the sentinel is absent (or configured empty).
    ///
    /// Only the first sentinel splits; later occurrences stay in the payload.
    pub fn split_on_sentinel(&self, raw: &str) -> Option<Segmentation> {
        if self.sentinel.is_empty() {
            return None;
        }
        let (answer_part, payload_raw) = raw.split_once(self.sentinel.as_str())?;
        let payload = strip_fence_markers(payload_raw);

        let (suggested_followups, outcome) = match serde_json::from_str::<Value>(&payload) {
            Ok(value) => match followups_from_value(value) {
                Some(followups) => (followups, ParseOutcome::Ok),
                None => (Vec::new(), ParseOutcome::SentinelMalformed),
            },
            Err(_) => match recover_bracketed_array(&payload) {
                Some(followups) => (followups, ParseOutcome::Recovered),
                None => (Vec::new(), ParseOutcome::SentinelMalformed),
            },
        };

        Some(Segmentation {
            answer_text: trim_text(answer_part).to_string(),
            suggested_followups,
            tier: Tier::Sentinel,
            outcome,
        })
    }

    /// Tier 3. Always applies.
    pub fn plain(&self, raw: &str) -> Segmentation {
        let answer_text = if raw.is_empty() {
            self.fallback_answer.clone()
        } else {
            trim_text(raw).to_string()
        };
        Segmentation {
            answer_text,
            suggested_followups: Vec::new(),
            tier: Tier::Plain,
            outcome: ParseOutcome::NoneFound,
        }
    }
}

/// Tier 2. `None` when `raw` has no complete fenced block.
///
/// Only the last block is removed from the answer; earlier blocks are treated
/// as part of the answer's own formatting. No bracket recovery at this tier.
pub fn split_on_last_fence(raw: &str) -> Option<Segmentation> {
    let block = FENCED_BLOCK_RE.find_iter(raw).last()?;

    let mut answer = String::with_capacity(raw.len() - block.len());
    answer.push_str(&raw[..block.start()]);
    answer.push_str(&raw[block.end()..]);

    let payload = strip_fence_markers(block.as_str());
    let parsed = serde_json::from_str::<Value>(&payload)
        .ok()
        .and_then(followups_from_value);

    let (suggested_followups, outcome) = match parsed {
        Some(followups) => (followups, ParseOutcome::Ok),
        None => (Vec::new(), ParseOutcome::FenceMalformed),
    };

    Some(Segmentation {
        answer_text: trim_text(&answer).to_string(),
        suggested_followups,
        tier: Tier::Fenced,
        outcome,
    })
}

// -- Private helpers --

fn strip_fence_markers(text: &str) -> String {
    trim_text(&FENCE_MARKER_RE.replace_all(text, "")).to_string()
}

/// Whitespace trim that also drops byte order marks.
fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Accepts a bare array or `{"suggested_followups": [...]}`.
fn followups_from_value(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(string_items(items)),
        Value::Object(mut map) => match map.remove(FOLLOWUPS_KEY) {
            Some(Value::Array(items)) => Some(string_items(items)),
            _ => None,
        },
        _ => None,
    }
}

fn recover_bracketed_array(text: &str) -> Option<Vec<String>> {
    let candidate = BRACKETED_ARRAY_RE.find(text)?;
    match serde_json::from_str::<Value>(candidate.as_str()) {
        Ok(Value::Array(items)) => Some(string_items(items)),
        _ => None,
    }
}

/// Keep string elements in order; drop everything else.
fn string_items(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const S: &str = DEFAULT_SENTINEL;

    fn segment(raw: &str) -> Segmentation {
        ResponseSegmenter::default().segment(raw)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ---- Tier 1: sentinel ----

    #[test]
    fn test_sentinel_with_bare_array() {
        let raw = format!("Zakat is 2.5% of savings.\n\n{}\n[\"Who must pay?\", \"When is it due?\"]", S);
        let seg = segment(&raw);
        assert_eq!(seg.tier, Tier::Sentinel);
        assert_eq!(seg.outcome, ParseOutcome::Ok);
        assert_eq!(seg.answer_text, "Zakat is 2.5% of savings.");
        assert_eq!(seg.suggested_followups, strings(&["Who must pay?", "When is it due?"]));
    }

    #[test]
    fn test_sentinel_with_object_drops_non_strings() {
        let raw = "Answer===SUGGESTED_FOLLOWUPS===\n{\"suggested_followups\": [\"Q1\", \"Q2\", 5]}";
        let seg = segment(raw);
        assert_eq!(seg.answer_text, "Answer");
        assert_eq!(seg.suggested_followups, strings(&["Q1", "Q2"]));
        assert_eq!(seg.outcome, ParseOutcome::Ok);
    }

    #[test]
    fn test_sentinel_with_fenced_payload() {
        let raw = format!("Answer\n{}\n```json\n[\"a\", \"b\"]\n```\n", S);
        let seg = segment(&raw);
        assert_eq!(seg.tier, Tier::Sentinel);
        assert_eq!(seg.suggested_followups, strings(&["a", "b"]));
    }

    #[test]
    fn test_sentinel_fence_tag_case_insensitive() {
        let raw = format!("Answer{}```JSON\n[\"a\"]\n```", S);
        assert_eq!(segment(&raw).suggested_followups, strings(&["a"]));
    }

    #[test]
    fn test_sentinel_is_case_sensitive() {
        let raw = "Answer ===suggested_followups=== [\"a\"]";
        let seg = segment(raw);
        assert_eq!(seg.tier, Tier::Plain);
        assert_eq!(seg.answer_text, raw);
        assert!(seg.suggested_followups.is_empty());
    }

    #[test]
    fn test_sentinel_takes_precedence_over_fences() {
        let raw = format!(
            "Recite:\n```\nBismillah\n```\nMore text.\n{}\n[\"x\"]\n```json\n[\"ignored\"]\n```",
            S
        );
        let seg = segment(&raw);
        assert_eq!(seg.tier, Tier::Sentinel);
        assert_eq!(seg.answer_text, "Recite:\n```\nBismillah\n```\nMore text.");
        // Payload is not valid JSON once markers are stripped; greedy recovery spans both arrays
        assert_eq!(seg.outcome, ParseOutcome::SentinelMalformed);
        assert!(seg.suggested_followups.is_empty());
    }

    #[test]
    fn test_sentinel_garbage_payload_degrades() {
        let raw = format!("  The answer.  {}not json at all", S);
        let seg = segment(&raw);
        assert_eq!(seg.answer_text, "The answer.");
        assert!(seg.suggested_followups.is_empty());
        assert_eq!(seg.outcome, ParseOutcome::SentinelMalformed);
    }

    #[test]
    fn test_sentinel_empty_payload() {
        let raw = format!("The answer.{}", S);
        let seg = segment(&raw);
        assert_eq!(seg.answer_text, "The answer.");
        assert!(seg.suggested_followups.is_empty());
        assert_eq!(seg.outcome, ParseOutcome::SentinelMalformed);
    }

    #[test]
    fn test_sentinel_valid_json_wrong_shape() {
        for payload in ["42", "\"just a string\"", "{\"other\": [\"a\"]}", "{\"suggested_followups\": \"a\"}", "null"] {
            let raw = format!("A{}{}", S, payload);
            let seg = segment(&raw);
            assert!(seg.suggested_followups.is_empty(), "payload {}", payload);
            assert_eq!(seg.outcome, ParseOutcome::SentinelMalformed);
        }
    }

    #[test]
    fn test_sentinel_keeps_strings_beside_huge_numbers() {
        let raw = format!("Answer{}[\"Q1\", 1e400]", S);
        let seg = segment(&raw);
        assert_eq!(seg.outcome, ParseOutcome::Ok);
        assert_eq!(seg.suggested_followups, strings(&["Q1"]));
    }

    #[test]
    fn test_sentinel_recovers_array_with_trailing_prose() {
        let raw = format!("A{}\nHere you go: [\"x\", \"y\"]\nHope this helps!", S);
        let seg = segment(&raw);
        assert_eq!(seg.outcome, ParseOutcome::Recovered);
        assert_eq!(seg.suggested_followups, strings(&["x", "y"]));
    }

    #[test]
    fn test_sentinel_recovery_is_greedy() {
        let raw = format!("A{}first [\"x\"] then [\"y\"]", S);
        let seg = segment(&raw);
        // `["x"] then ["y"]` is not a JSON array
        assert!(seg.suggested_followups.is_empty());
        assert_eq!(seg.outcome, ParseOutcome::SentinelMalformed);
    }

    #[test]
    fn test_sentinel_recovery_spans_newlines() {
        let raw = format!("A{}Sure!\n[\n  \"one\",\n  \"two\"\n]\n", S);
        let seg = segment(&raw);
        assert_eq!(seg.outcome, ParseOutcome::Recovered);
        assert_eq!(seg.suggested_followups, strings(&["one", "two"]));
    }

    #[test]
    fn test_only_first_sentinel_splits() {
        let raw = format!("A{}{{\"suggested_followups\": [\"has {} inside\"]}}", S, S);
        let seg = segment(&raw);
        assert_eq!(seg.answer_text, "A");
        assert_eq!(seg.suggested_followups, vec![format!("has {} inside", S)]);
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let raw = format!("A{}[\"b\", \"a\", \"b\", \"c\", \"d\"]", S);
        assert_eq!(segment(&raw).suggested_followups, strings(&["b", "a", "b", "c", "d"]));
    }

    #[test]
    fn test_sentinel_with_empty_answer_preserved() {
        let raw = format!("   {}[\"a\"]", S);
        let seg = segment(&raw);
        assert_eq!(seg.answer_text, "");
        assert_eq!(seg.suggested_followups, strings(&["a"]));
    }

    #[test]
    fn test_custom_sentinel() {
        let segmenter = ResponseSegmenter::new("---FOLLOWUPS---", "none");
        let seg = segmenter.segment("Answer ---FOLLOWUPS--- [\"a\"]");
        assert_eq!(seg.tier, Tier::Sentinel);
        assert_eq!(seg.suggested_followups, strings(&["a"]));

        // The default sentinel is just text to a custom segmenter
        let seg = segmenter.segment(&format!("Answer{}[\"a\"]", S));
        assert_eq!(seg.tier, Tier::Plain);
    }

    #[test]
    fn test_empty_sentinel_disables_tier_one() {
        let segmenter = ResponseSegmenter::new("", "none");
        assert!(segmenter.split_on_sentinel("anything").is_none());
        assert_eq!(segmenter.segment("anything").tier, Tier::Plain);
    }

    // ---- Tier 2: fenced ----

    #[test]
    fn test_fence_selects_last_block() {
        let raw = "Answer text. ```json\n[\"a\"]\n``` trailing ```json\n[\"b\",\"c\"]\n```";
        let seg = segment(raw);
        assert_eq!(seg.tier, Tier::Fenced);
        assert_eq!(seg.outcome, ParseOutcome::Ok);
        assert_eq!(seg.suggested_followups, strings(&["b", "c"]));
        assert_eq!(seg.answer_text, "Answer text. ```json\n[\"a\"]\n``` trailing");
    }

    #[test]
    fn test_fence_removes_only_selected_block() {
        // An earlier identical block must survive in the answer
        let block = "```json\n[\"same\"]\n```";
        let raw = format!("Intro {} middle {}", block, block);
        let seg = segment(&raw);
        assert_eq!(seg.answer_text, format!("Intro {} middle", block));
        assert_eq!(seg.suggested_followups, strings(&["same"]));
    }

    #[test]
    fn test_fence_untagged_object() {
        let raw = "The five pillars are...\n```\n{\"suggested_followups\": [\"What is Hajj?\", null, true]}\n```";
        let seg = segment(raw);
        assert_eq!(seg.answer_text, "The five pillars are...");
        assert_eq!(seg.suggested_followups, strings(&["What is Hajj?"]));
    }

    #[test]
    fn test_fence_tag_case_insensitive() {
        let raw = "Answer\n```JSON\n[\"Is it sunnah?\"]\n```";
        let seg = segment(raw);
        assert_eq!(seg.tier, Tier::Fenced);
        assert_eq!(seg.outcome, ParseOutcome::Ok);
        assert_eq!(seg.answer_text, "Answer");
        assert_eq!(seg.suggested_followups, strings(&["Is it sunnah?"]));
    }

    #[test]
    fn test_fence_malformed_has_no_recovery() {
        let raw = "Answer\n```json\nsure: [\"a\", \"b\"]\n```";
        let seg = segment(raw);
        assert_eq!(seg.tier, Tier::Fenced);
        assert_eq!(seg.outcome, ParseOutcome::FenceMalformed);
        assert!(seg.suggested_followups.is_empty());
        assert_eq!(seg.answer_text, "Answer");
    }

    #[test]
    fn test_unclosed_fence_is_plain() {
        let raw = "Answer\n```json\n[\"a\"]";
        let seg = segment(raw);
        assert_eq!(seg.tier, Tier::Plain);
        assert_eq!(seg.answer_text, raw);
    }

    #[test]
    fn test_fence_middle_of_text() {
        let raw = "Before\n```json\n[\"q\"]\n```\nAfter";
        let seg = segment(raw);
        assert_eq!(seg.answer_text, "Before\n\nAfter");
        assert_eq!(seg.suggested_followups, strings(&["q"]));
    }

    // ---- Tier 3: plain ----

    #[test]
    fn test_plain_answer() {
        let seg = segment("Just a plain answer, no markers.");
        assert_eq!(seg.answer_text, "Just a plain answer, no markers.");
        assert!(seg.suggested_followups.is_empty());
        assert_eq!(seg.tier, Tier::Plain);
        assert_eq!(seg.outcome, ParseOutcome::NoneFound);
    }

    #[test]
    fn test_plain_trims_and_keeps_unicode() {
        let seg = segment("\n  بسم الله الرحمن الرحيم  \n");
        assert_eq!(seg.answer_text, "بسم الله الرحمن الرحيم");
    }

    #[test]
    fn test_byte_order_marks_are_trimmed() {
        assert_eq!(segment("\u{feff}Answer\u{feff}").answer_text, "Answer");
        let seg = segment(&format!("\u{feff} Answer {}\u{feff}[\"a\"]", S));
        assert_eq!(seg.answer_text, "Answer");
        assert_eq!(seg.suggested_followups, strings(&["a"]));
    }

    #[test]
    fn test_plain_empty_uses_fallback() {
        assert_eq!(segment("").answer_text, "No response generated");
        let custom = ResponseSegmenter::new(S, "Nothing to say");
        assert_eq!(custom.segment("").answer_text, "Nothing to say");
    }

    #[test]
    fn test_plain_whitespace_only_stays_empty() {
        let seg = segment("   \n\t ");
        assert_eq!(seg.answer_text, "");
        assert_eq!(seg.tier, Tier::Plain);
    }

    #[test]
    fn test_plain_ignores_bare_array() {
        let seg = segment("Answer [\"not\", \"followups\"]");
        assert_eq!(seg.tier, Tier::Plain);
        assert!(seg.suggested_followups.is_empty());
    }

    // ---- Properties across tiers ----

    #[test]
    fn test_answer_never_has_surrounding_whitespace() {
        let inputs = [
            format!("  a  {}  [\"x\"]  ", S),
            "  a\n```json\n[\"x\"]\n```\n  ".to_string(),
            "\n\n a plain answer \n".to_string(),
            format!("\t{}\t", S),
            " x ```\n[1]\n``` ".to_string(),
        ];
        for raw in &inputs {
            let answer = segment(raw).answer_text;
            assert_eq!(answer, answer.trim(), "input {:?}", raw);
        }
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ParseOutcome::SentinelMalformed.to_string(), "sentinel-malformed");
        assert_eq!(ParseOutcome::FenceMalformed.as_str(), "fence-malformed");
        assert_eq!(ParseOutcome::NoneFound.as_str(), "none-found");
        assert_eq!(ParseOutcome::Ok.as_str(), "ok");
        assert_eq!(Tier::Fenced.to_string(), "fenced");
    }
}
