use crate::core::{Answer, AnswerSource, FaqEntry, Result, SourceTag};
use crate::utils::error::AssistantError;
use crate::utils::text::{contains_phrase, normalize};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

struct CompiledEntry {
    entry: FaqEntry,
    phrases: Vec<String>,
}

/// 關鍵字 / 同義詞比對的 FAQ 表
pub struct FaqMatcher {
    entries: Vec<CompiledEntry>,
}

#[derive(Debug, Deserialize)]
struct FaqFile {
    #[serde(default)]
    entries: Vec<FaqEntry>,
}

impl FaqMatcher {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let mut phrases: Vec<String> = std::iter::once(&entry.key)
                    .chain(entry.synonyms.iter())
                    .map(|p| normalize(p))
                    .filter(|p| !p.is_empty())
                    .collect();
                phrases.dedup();

                if phrases.is_empty() || entry.answer.trim().is_empty() {
                    tracing::warn!("Skipping FAQ entry '{}' with no usable phrases", entry.key);
                    return None;
                }
                Some(CompiledEntry { entry, phrases })
            })
            .collect();

        Self { entries }
    }

    pub fn with_default_entries() -> Self {
        Self::new(default_entries())
    }

    /// 從獨立的 TOML 檔案載入 `[[entries]]`
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| AssistantError::ConfigError {
                message: format!("Cannot read FAQ file '{}': {}", path.as_ref().display(), e),
            })?;
        let file: FaqFile =
            toml::from_str(&content).map_err(|e| AssistantError::ConfigValidationError {
                field: "faq.file".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(Self::new(file.entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 找出最具體的匹配項：片語字數最多，其次字元數最多，同分取先宣告者
    pub fn find(&self, question: &str) -> Option<&FaqEntry> {
        let normalized = normalize(question);
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<(&FaqEntry, (usize, usize))> = None;
        for compiled in &self.entries {
            let score = compiled
                .phrases
                .iter()
                .filter(|p| contains_phrase(&normalized, p))
                .map(|p| (p.split(' ').count(), p.len()))
                .max();

            if let Some(score) = score {
                match best {
                    Some((_, best_score)) if best_score >= score => {}
                    _ => best = Some((&compiled.entry, score)),
                }
            }
        }

        best.map(|(entry, _)| entry)
    }
}

#[async_trait]
impl AnswerSource for FaqMatcher {
    fn tag(&self) -> SourceTag {
        SourceTag::Faq
    }

    async fn try_answer(&self, question: &str) -> Result<Option<Answer>> {
        Ok(self.find(question).map(|entry| {
            tracing::debug!("FAQ match: {}", entry.key);
            Answer::new(entry.answer.clone(), SourceTag::Faq)
        }))
    }
}

fn entry(key: &str, synonyms: &[&str], answer: &str) -> FaqEntry {
    FaqEntry {
        key: key.to_string(),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        answer: answer.to_string(),
    }
}

pub fn default_entries() -> Vec<FaqEntry> {
    vec![
        entry(
            "membership",
            &["member", "join", "become a member", "sign up", "membership cost", "dues"],
            "SEMPA membership is open to PAs, PA students and others interested in emergency medicine. \
             You can join online at sempa.org/membership, where current membership categories and dues are listed.",
        ),
        entry(
            "renew membership",
            &["renew", "renewal", "membership renewal", "expired membership"],
            "You can renew your membership by logging in at sempa.org and selecting \"Renew Membership\" \
             from your member dashboard.",
        ),
        entry(
            "conference",
            &["sempa 360", "annual conference", "annual meeting", "convention", "register for the conference"],
            "SEMPA 360 is our annual conference for emergency medicine PAs. Dates, agenda and registration \
             are available at sempa360.org.",
        ),
        entry(
            "cme",
            &["continuing medical education", "cme credit", "cme credits", "category 1", "credits"],
            "SEMPA offers Category 1 CME through SEMPA 360, our online learning portal and regional courses. \
             Your CME transcript is available from your member dashboard.",
        ),
        entry(
            "jobs",
            &["job board", "job", "career", "careers", "employment", "hiring", "career center"],
            "Visit the SEMPA Career Center at sempa.org/careers to browse emergency medicine PA openings \
             or post a position.",
        ),
        entry(
            "advocacy",
            &["legislation", "policy", "advocate", "scope of practice", "government affairs"],
            "SEMPA advocates for emergency medicine PAs at the state and federal level. Current priorities \
             and action alerts are posted on the Advocacy page at sempa.org.",
        ),
        entry(
            "fellowship",
            &["residency", "postgraduate", "postgraduate program", "em residency"],
            "A directory of postgraduate emergency medicine PA programs is available on the SEMPA website \
             under Education > Postgraduate Programs.",
        ),
        entry(
            "contact",
            &["contact", "phone number", "email address", "mailing address", "reach sempa"],
            "You can reach the SEMPA office at sempa@sempa.org. Staff respond during regular business hours.",
        ),
        entry(
            "about sempa",
            &["what is sempa", "who is sempa", "sempa mission", "about sempa"],
            "SEMPA, the Society of Emergency Medicine PAs, is the professional organization representing PAs \
             practicing in emergency medicine. It provides education, advocacy and networking for its members.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_matches_synonym_case_insensitively() {
        let matcher = FaqMatcher::with_default_entries();

        let answer = matcher
            .try_answer("Where can I find JOB listings?")
            .await
            .unwrap()
            .expect("faq answer expected");

        assert_eq!(answer.source, SourceTag::Faq);
        assert!(answer.text.contains("Career Center"));
    }

    #[test]
    fn test_most_specific_entry_wins() {
        let matcher = FaqMatcher::with_default_entries();

        // "membership renewal" (2 words) 比 "membership" 更具體
        let entry = matcher.find("Question about membership renewal").unwrap();
        assert_eq!(entry.key, "renew membership");

        let entry = matcher.find("How much are membership dues?").unwrap();
        assert_eq!(entry.key, "membership");
    }

    #[test]
    fn test_ties_go_to_first_declared_entry() {
        let matcher = FaqMatcher::new(vec![
            entry("first", &["badge"], "first answer"),
            entry("second", &["badge"], "second answer"),
        ]);

        assert_eq!(matcher.find("lost my badge").unwrap().key, "first");
    }

    #[test]
    fn test_no_match_and_partial_words() {
        let matcher = FaqMatcher::with_default_entries();
        assert!(matcher.find("What's the weather like?").is_none());
        assert!(matcher.find("jobless").is_none());
        assert!(matcher.find("   ").is_none());
    }

    #[test]
    fn test_unusable_entries_are_skipped() {
        let matcher = FaqMatcher::new(vec![
            entry("???", &["!!"], "punctuation only"),
            entry("parking", &[], ""),
            entry("parking", &["garage"], "Parking is available on site."),
        ]);
        assert_eq!(matcher.len(), 1);
        assert_eq!(matcher.find("is there a garage").unwrap().answer, "Parking is available on site.");
    }

    #[test]
    fn test_from_toml_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[[entries]]
key = "hotel"
synonyms = ["room block", "lodging"]
answer = "Book through the conference room block."
"#,
        )
        .unwrap();

        let matcher = FaqMatcher::from_toml_file(file.path()).unwrap();
        assert_eq!(matcher.len(), 1);
        assert_eq!(matcher.find("any lodging discounts?").unwrap().key, "hotel");

        let err = FaqMatcher::from_toml_file("/nonexistent/faq.toml").err().unwrap();
        assert!(matches!(err, AssistantError::ConfigError { .. }));
    }
}
