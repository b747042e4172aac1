use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

use super::LlmResponse;

lazy_static! {
    /// Regex for trailing commas before } or ]
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// Regex for JavaScript string concatenation ("str1" + "str2")
    static ref JS_STRING_CONCAT_RE: Regex = Regex::new(r#""\s*\+\s*""#).unwrap();
}

/// Timeout for JSON repair operations
const JSON_REPAIR_TIMEOUT: Duration = Duration::from_secs(5);

/// Extract JSON string from text (handles multiple formats)
///
/// Tries in order:
/// 1. JSON in markdown code block: ```json ... ```
/// 2. Generic markdown code block: ``` ... ```
/// 3. Plain JSON starting with {
/// 4. JSON embedded anywhere in text (find { to })
fn extract_json_string(text: &str) -> Result<String, String> {
    // Try 1: Markdown code block with json
    if text.contains("```json") {
        return text
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| "Failed to extract JSON from markdown code block".to_string());
    }

    // Try 2: Generic markdown code block
    if text.contains("```") {
        if let Some(start) = text.find("```") {
            let block_start = start + 3;
            // Skip optional language identifier on the same line
            if let Some(newline_offset) = text[block_start..].find('\n') {
                let json_start = block_start + newline_offset + 1;
                if let Some(end_offset) = text[json_start..].find("```") {
                    return Ok(text[json_start..json_start + end_offset].trim().to_string());
                }
            }
        }
    }

    // Try 3: Plain JSON starting with {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }

    // Try 4: Embedded JSON (find first { to last })
    let start = text
        .find('{')
        .ok_or_else(|| "No JSON object found in response".to_string())?;

    let end = text
        .rfind('}')
        .ok_or_else(|| "Incomplete JSON object in response".to_string())?;

    if start < end {
        Ok(text[start..=end].to_string())
    } else {
        Err("Invalid JSON boundaries in response".to_string())
    }
}

/// Fix trailing commas in JSON (common LLM mistake)
///
/// Example: `{"name": "John",}` -> `{"name": "John"}`
fn fix_trailing_commas(json_str: &str) -> String {
    TRAILING_COMMA_RE.replace_all(json_str, "$1").to_string()
}

/// Fix JavaScript string concatenation which is invalid in JSON
///
/// LLMs sometimes output: `"str1" + "str2"` which is invalid JSON.
/// This merges them into: `"str1str2"`
fn fix_js_string_concatenation(json_str: &str) -> String {
    JS_STRING_CONCAT_RE.replace_all(json_str, "").to_string()
}

/// Apply quick fixes to malformed JSON
fn apply_quick_fixes(json_str: &str) -> String {
    let fixed = fix_js_string_concatenation(json_str);
    fix_trailing_commas(&fixed)
}

/// Attempt to repair JSON using llm_json crate with timeout
///
/// Returns the repaired JSON string if successful, or None if repair fails or times out
fn repair_json_with_timeout(json_str: &str) -> Option<String> {
    let start = std::time::Instant::now();

    let options = llm_json::RepairOptions::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json_str, &options)
    }));

    if start.elapsed() > JSON_REPAIR_TIMEOUT {
        tracing::warn!("JSON repair took longer than timeout");
        return None;
    }

    match result {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("JSON repair failed: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("JSON repair panicked");
            None
        }
    }
}

/// Parse LLM response text into the target type.
///
/// Parsing pipeline:
/// 1. Extract JSON string (markdown/plain/embedded)
/// 2. Try direct parse (fast path)
/// 3. Apply quick fixes (trailing commas, string concat)
/// 4. Try parse after quick fixes
/// 5. Apply llm_json::repair_json() with timeout
/// 6. Final parse attempt
///
/// There is no fallback value: when every strategy fails the caller gets an
/// error and decides whether to surface or retry it.
pub fn parse_llm_json<T>(text: &str) -> Result<T, String>
where
    T: LlmResponse,
{
    // Step 1: Extract JSON string
    let json_str = extract_json_string(text)?;

    tracing::debug!(
        "Extracted JSON (first 500 chars): {}",
        json_str.chars().take(500).collect::<String>()
    );

    // Step 2: Try direct parse (fast path)
    if let Ok(parsed) = serde_json::from_str::<T>(&json_str) {
        tracing::debug!("JSON parsed successfully (fast path)");
        return Ok(parsed);
    }

    // Step 3-4: Apply quick fixes and try again
    let fixed_json = apply_quick_fixes(&json_str);
    if let Ok(parsed) = serde_json::from_str::<T>(&fixed_json) {
        tracing::debug!("JSON parsed successfully after quick fixes");
        return Ok(parsed);
    }

    // Step 5-6: Try advanced repair with llm_json
    if let Some(repaired) = repair_json_with_timeout(&json_str) {
        if let Ok(parsed) = serde_json::from_str::<T>(&repaired) {
            tracing::debug!("JSON parsed successfully after llm_json repair");
            return Ok(parsed);
        }
    }

    Err(format!(
        "Failed to parse JSON after all repair attempts. Original: {}",
        json_str.chars().take(200).collect::<String>()
    ))
}
