use serde_json::{json, Value};

pub const ANALYZE_DOCUMENT_PROMPT: &str =
    "Analyze this resume. Provide an ATS score, feedback, and a rewritten improved version.";

/// Replace `{resume_text}` before sending.
pub const ANALYZE_TEXT_PROMPT_TEMPLATE: &str =
    "Analyze this resume and provide an improved version:\n\n{resume_text}";

/// Prefix written into an empty resume text after analysing a PDF.
pub const EXTRACTED_SUMMARY_PREFIX: &str = "[Extracted Summary from PDF]: ";

/// Response schema for resume analysis.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "atsScore": {
                "type": "NUMBER",
                "description": "A score from 0 to 100 indicating ATS parseability and \
                                keyword optimization."
            },
            "summary": {
                "type": "STRING",
                "description": "A 2-sentence executive summary of the resume quality."
            },
            "strengths": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of 3-5 strong points."
            },
            "weaknesses": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of 3-5 weak points."
            },
            "improvements": {
                "type": "STRING",
                "description": "Detailed paragraph on how to improve the resume."
            },
            "rewrittenResume": {
                "type": "STRING",
                "description": "A rewritten version of the resume (or key sections) incorporating \
                                the improvements to increase the ATS score. \
                                Use markdown formatting."
            }
        },
        "required": [
            "atsScore", "summary", "strengths", "weaknesses", "improvements", "rewrittenResume"
        ]
    })
}
