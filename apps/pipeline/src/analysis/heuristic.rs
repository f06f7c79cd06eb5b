//! Heuristic ATS analysis: the deterministic fallback for the analyzer step.
//!
//! Algorithm:
//! 1. word_count = number of `\b\w+\b` matches in the Markdown
//! 2. section presence: `## <Section>` headings, case-insensitive
//! 3. ats_score starts at 60:
//!    - ≥ 350 words: +10, otherwise −5
//!    - Skills ±10, Experience ±10, Projects ±5
//!    - −3 per missing section, capped at −15
//!    - clamped to 0 – 100
//! 4. keywords = top 15 lowercase words of ≥ 4 chars by frequency
//!    (ties keep first-occurrence order)

use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::{Analysis, Analyzer};
use crate::models::analysis::AtsAnalytics;
use crate::models::ModelUsed;

const BASE_SCORE: i32 = 60;
const GOOD_WORD_COUNT: u32 = 350;
const MAX_KEYWORDS: usize = 15;
const MIN_KEYWORD_CHARS: usize = 4;
const MISSING_SECTION_PENALTY: i32 = 3;
const MAX_MISSING_PENALTY: i32 = 15;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// Standard resume sections, in reporting order.
static SECTIONS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("Summary", r"(?im)^##\s+(professional\s+)?summary\b"),
        ("Skills", r"(?im)^##\s+skills\b"),
        ("Projects", r"(?im)^##\s+projects\b"),
        ("Experience", r"(?im)^##\s+experience\b"),
        ("Education", r"(?im)^##\s+education\b"),
        ("Certifications", r"(?im)^##\s+certifications?\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid section regex")))
    .collect()
});

/// Pure-Rust analyzer. No model call, same output for the same input.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn analyze_markdown(&self, markdown: &str) -> AtsAnalytics {
        compute_ats_analytics(markdown)
    }
}

#[async_trait]
impl Analyzer for HeuristicAnalyzer {
    type Error = Infallible;

    async fn analyze(&self, markdown: &str) -> Result<Analysis, Infallible> {
        Ok(Analysis {
            analytics: self.analyze_markdown(markdown),
            model_used: ModelUsed::Fallback,
        })
    }
}

fn compute_ats_analytics(markdown: &str) -> AtsAnalytics {
    let words: Vec<&str> = WORD.find_iter(markdown).map(|m| m.as_str()).collect();
    let word_count = words.len() as u32;

    let present: HashMap<&str, bool> = SECTIONS
        .iter()
        .map(|(name, regex)| (*name, regex.is_match(markdown)))
        .collect();
    let missing_sections: Vec<String> = SECTIONS
        .iter()
        .filter(|(name, _)| !present[name])
        .map(|(name, _)| name.to_string())
        .collect();

    let ats_score = score(word_count, &present, missing_sections.len());

    AtsAnalytics {
        word_count,
        ats_score,
        keywords: top_keywords(&words),
        readability: if word_count >= GOOD_WORD_COUNT {
            "Good".to_string()
        } else {
            "Fair".to_string()
        },
        missing_sections,
    }
}

fn score(word_count: u32, present: &HashMap<&str, bool>, missing: usize) -> u8 {
    let bonus = |section: &str, points: i32| if present[section] { points } else { -points };

    let mut score = BASE_SCORE;
    score += if word_count >= GOOD_WORD_COUNT { 10 } else { -5 };
    score += bonus("Skills", 10);
    score += bonus("Experience", 10);
    score += bonus("Projects", 5);
    score -= (MISSING_SECTION_PENALTY * missing as i32).min(MAX_MISSING_PENALTY);
    score.clamp(0, 100) as u8
}

fn top_keywords(words: &[&str]) -> Vec<String> {
    let mut order: Vec<(String, u32)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for word in words {
        let lower = word.to_lowercase();
        if lower.chars().count() < MIN_KEYWORD_CHARS {
            continue;
        }
        match index.get(&lower) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(lower.clone(), order.len());
                order.push((lower, 1));
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal counts.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(word, _)| word)
        .collect()
}
