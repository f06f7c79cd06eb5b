// Prompt constants for the ATS analysis call.

/// ATS analysis prompt. Replace `{resume_md}` before sending.
pub const ATS_PROMPT_TEMPLATE: &str = r#"Analyze the resume below for ATS readiness.
Return STRICT JSON only (no markdown, no commentary).

Return a JSON object with this EXACT schema (no extra fields):
{
  "word_count": 0,
  "ats_score": 0,
  "keywords": ["string"],
  "readability": "Good|Fair|Poor",
  "missing_sections": ["string"]
}

Guidance:
- ats_score must be an integer from 0 to 100
- keywords: 10-20 items taken from the resume
- missing_sections: list any missing standard sections (Summary, Skills, Projects,
  Experience, Education, Certifications).
  Note: 'PROFESSIONAL SUMMARY' fully satisfies the Summary section requirement.
  Do NOT flag Summary as missing if a PROFESSIONAL SUMMARY section is present.

RESUME_MARKDOWN:
{resume_md}
"#;
