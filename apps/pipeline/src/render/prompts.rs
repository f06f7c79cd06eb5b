// Prompt constants for the HTML rendering call.

/// HTML rendering prompt. Replace `{fidelity_instruction}` and `{resume_md}` before sending.
pub const HTML_PROMPT_TEMPLATE: &str = r#"Convert the following resume in Markdown into clean, ATS-friendly HTML.

{fidelity_instruction}

Requirements:
- Use semantic HTML tags (h1/h2/h3, p, ul/li).
- Do NOT include Markdown code fences.
- Keep styling minimal: one inline <style> block, no external assets, no scripts.
- Output ONLY the HTML document, starting with <!doctype html>.

RESUME_MARKDOWN:
{resume_md}
"#;
