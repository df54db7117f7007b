// Job Search: grounded web search for live listings, by query or by resume.

pub mod handlers;
pub mod prompts;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::{GroundingChunk, LlmClient, LlmError, Part, SearchOutput};
use crate::resume::{document_part, ResumeContent};
use crate::search::prompts::{manual_search_prompt, resume_search_prompt};

/// Resume text sent with a resume-driven search is cut to this many characters.
pub const RESUME_SUMMARY_CHARS: usize = 1500;
pub const UNKNOWN_JOB: &str = "Unknown Job";
const ANY: &str = "any";

fn any() -> String {
    ANY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchFilters {
    #[serde(default = "any")]
    pub date_posted: String,
    #[serde(default = "any")]
    pub experience_level: String,
    #[serde(default = "any")]
    pub min_salary: String,
}

impl Default for JobSearchFilters {
    fn default() -> Self {
        Self {
            date_posted: any(),
            experience_level: any(),
            min_salary: any(),
        }
    }
}

impl JobSearchFilters {
    /// Instruction block for the active filters; empty when every filter is "any".
    pub fn instructions(&self) -> String {
        let lines: Vec<String> = [
            ("Date Posted", &self.date_posted),
            ("Experience Level", &self.experience_level),
            ("Minimum Salary", &self.min_salary),
        ]
        .into_iter()
        .map(|(label, value)| (label, value.trim()))
        .filter(|(_, value)| !value.is_empty() && !value.eq_ignore_ascii_case(ANY))
        .map(|(label, value)| format!("- {label}: {value}"))
        .collect();

        if lines.is_empty() {
            return String::new();
        }
        format!(
            "Apply the following filters to the search results if possible:\n{}",
            lines.join("\n")
        )
    }
}

/// What the search is driven by.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    /// A typed query such as "Rust Developer jobs in Berlin".
    Manual(String),
    /// The caller's resume; `None` when nothing is on file.
    Resume(Option<ResumeContent>),
}

/// "{query} jobs", with " in {location}" when a location is given.
pub fn search_phrase(query: &str, location: Option<&str>) -> String {
    match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(location) => format!("{} jobs in {location}", query.trim()),
        None => format!("{} jobs", query.trim()),
    }
}

/// The first `RESUME_SUMMARY_CHARS` characters of the resume text.
pub fn resume_summary(text: &str) -> String {
    text.chars().take(RESUME_SUMMARY_CHARS).collect()
}

pub fn search_parts(mode: &SearchMode, filters: Option<&JobSearchFilters>) -> Vec<Part> {
    let filter_text = filters.map(JobSearchFilters::instructions).unwrap_or_default();
    match mode {
        SearchMode::Manual(phrase) => vec![Part::text(manual_search_prompt(phrase, &filter_text))],
        SearchMode::Resume(Some(ResumeContent::Document(document))) => vec![
            document_part(document),
            Part::text(resume_search_prompt(&filter_text)),
        ],
        SearchMode::Resume(content) => {
            let summary = match content {
                Some(ResumeContent::Text(text)) => resume_summary(text),
                _ => "Not provided".to_string(),
            };
            vec![
                Part::text(format!("My Resume Summary: {summary}")),
                Part::text(resume_search_prompt(&filter_text)),
            ]
        }
    }
}

/// A saveable listing derived from a grounding chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListing {
    pub title: String,
    pub url: String,
    pub is_saved: bool,
}

/// One listing per distinct web URI, in citation order.
pub fn listings_from_chunks<'a>(
    chunks: &[GroundingChunk],
    saved_urls: impl IntoIterator<Item = &'a str>,
) -> Vec<JobListing> {
    let saved: HashSet<&str> = saved_urls.into_iter().collect();
    let mut seen = HashSet::new();

    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let url = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            if !seen.insert(url.to_string()) {
                return None;
            }
            let title = web
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(UNKNOWN_JOB);
            Some(JobListing {
                title: title.to_string(),
                url: url.to_string(),
                is_saved: saved.contains(url),
            })
        })
        .collect()
}

pub async fn find_jobs(
    mode: &SearchMode,
    filters: Option<&JobSearchFilters>,
    llm: &LlmClient,
) -> Result<SearchOutput, AppError> {
    llm.search(search_parts(mode, filters))
        .await
        .map_err(|e| match e {
            LlmError::EmptyContent => AppError::Llm(
                "No search results generated. API might be blocked or returned empty."
                    .to_string(),
            ),
            other => AppError::Llm(format!("Failed to search jobs: {other}")),
        })
}
