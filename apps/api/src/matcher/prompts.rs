use serde_json::{json, Value};

pub const RESUME_TEXT_PREFIX: &str = "Resume Text:\n";

pub fn match_prompt(job_description: &str) -> String {
    format!(
        "Job Description:\n{job_description}\n\n\
         Compare the provided resume to the job description above.\n\
         Provide a match score, analysis of gaps, and identify missing keywords."
    )
}

pub fn match_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matchScore": {
                "type": "NUMBER",
                "description": "A score from 0 to 100 indicating fit."
            },
            "jobTitle": {
                "type": "STRING",
                "description": "Extract the Job Title from the description. \
                                If not found, guess based on context."
            },
            "company": {
                "type": "STRING",
                "description": "Extract the Company Name from the description. \
                                If not found, return 'Unknown Company'."
            },
            "missingKeywords": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Keywords found in JD but missing in Resume."
            },
            "analysis": { "type": "STRING", "description": "Explanation of the score." },
            "culturalFit": {
                "type": "STRING",
                "description": "Assessment of soft skills alignment."
            }
        },
        "required": [
            "matchScore", "jobTitle", "company", "missingKeywords", "analysis", "culturalFit"
        ]
    })
}
