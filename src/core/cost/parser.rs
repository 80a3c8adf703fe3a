use serde::Deserialize;

/// Token counts from a single usage event. Transient: priced, summed, dropped.
#[derive(Debug, Clone, Default)]
pub struct UsageRecord {
    pub model: String,
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub cache_creation_tokens: f64,
    pub cache_read_tokens: f64,
}

#[derive(Deserialize)]
struct LogLine {
    model: Option<String>,
    message: Option<LogMessage>,
}

#[derive(Deserialize)]
struct LogMessage {
    usage: Option<LogUsage>,
}

#[derive(Deserialize)]
struct LogUsage {
    input_tokens: Option<f64>,
    output_tokens: Option<f64>,
    cache_creation_input_tokens: Option<f64>,
    cache_read_input_tokens: Option<f64>,
}

/// Fast check: does this line look like it carries usage data?
fn is_candidate_line(line: &str) -> bool {
    line.contains("\"usage\"")
}

/// Decode one log line into a usage record. Lines that are not usage events,
/// fail to decode, or lack a usage block are skipped, never an error; absent
/// token fields default to zero.
pub fn parse_line(line: &str) -> Option<UsageRecord> {
    if !is_candidate_line(line) {
        return None;
    }

    let parsed: LogLine = serde_json::from_str(line).ok()?;
    let usage = parsed.message?.usage?;

    Some(UsageRecord {
        model: parsed.model.unwrap_or_default(),
        input_tokens: usage.input_tokens.unwrap_or(0.0),
        output_tokens: usage.output_tokens.unwrap_or(0.0),
        cache_creation_tokens: usage.cache_creation_input_tokens.unwrap_or(0.0),
        cache_read_tokens: usage.cache_read_input_tokens.unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_line() {
        let line = r#"{"model":"claude-opus-4","message":{"usage":{"input_tokens":100,"output_tokens":20,"cache_creation_input_tokens":5,"cache_read_input_tokens":400}}}"#;
        let record = parse_line(line).unwrap();
        assert_eq!(record.model, "claude-opus-4");
        assert!((record.input_tokens - 100.0).abs() < f64::EPSILON);
        assert!((record.output_tokens - 20.0).abs() < f64::EPSILON);
        assert!((record.cache_creation_tokens - 5.0).abs() < f64::EPSILON);
        assert!((record.cache_read_tokens - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_token_fields_default_to_zero() {
        let line = r#"{"model":"claude-sonnet-4","message":{"usage":{"input_tokens":10}}}"#;
        let record = parse_line(line).unwrap();
        assert!((record.input_tokens - 10.0).abs() < f64::EPSILON);
        assert!(record.output_tokens.abs() < f64::EPSILON);
        assert!(record.cache_read_tokens.abs() < f64::EPSILON);
    }

    #[test]
    fn absent_model_defaults_to_empty() {
        let line = r#"{"message":{"usage":{"input_tokens":10,"output_tokens":1}}}"#;
        let record = parse_line(line).unwrap();
        assert!(record.model.is_empty());
    }

    #[test]
    fn skips_line_without_usage_marker() {
        assert!(parse_line(r#"{"type":"summary","text":"hello"}"#).is_none());
    }

    #[test]
    fn skips_non_json_line() {
        assert!(parse_line("not json at all \"usage\"").is_none());
    }

    #[test]
    fn skips_json_missing_usage_block() {
        // Marker present in an unrelated field, but no message.usage
        assert!(parse_line(r#"{"note":"\"usage\"","message":{}}"#).is_none());
    }

    #[test]
    fn skips_partial_line() {
        assert!(parse_line(r#"{"model":"claude-opus-4","message":{"usage":{"input_t"#).is_none());
    }
}
