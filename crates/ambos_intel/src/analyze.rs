use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use ambos_core::{
    AiGateway, AnalysisResult, Article, Entity, Error, Prediction, Result, Sentiment, SourceType,
};

use crate::parse::{extract_json_object, OneOrMany};

/// Characters of article content included per transcript entry.
const EXCERPT_CHARS: usize = 500;

/// Aggregates normalized articles into one AI-completion call and parses the
/// structured result. Failures surface as explicit errors; a fabricated
/// partial analysis is worse than an "unavailable" state.
pub struct AnalysisOrchestrator {
    gateway: Arc<dyn AiGateway>,
}

const COMMUNITY_SYSTEM: &str = "You are a community discourse analyst studying \
social-media conversations. Analyze the posts you are given and respond with a \
single JSON object, no prose, shaped exactly like: \
{\"entities\":[{\"name\":\"...\",\"kind\":\"person|organization|place|topic\"}],\
\"summary\":\"...\",\
\"predictions\":[{\"statement\":\"...\",\"confidence\":0.0,\"horizon\":\"...\"}],\
\"sentiment\":{\"community_mood\":\"...\",\"divergences\":[\"...\"],\"convergences\":[\"...\"]},\
\"weak_signals\":[\"...\"]}";

const PRESS_SYSTEM: &str = "You are a press and media analyst studying news \
coverage. Analyze the articles you are given and respond with a single JSON \
object, no prose, shaped exactly like: \
{\"entities\":[{\"name\":\"...\",\"kind\":\"person|organization|place|topic\"}],\
\"summary\":\"...\",\
\"predictions\":[{\"statement\":\"...\",\"confidence\":0.0,\"horizon\":\"...\"}],\
\"sentiment\":{\"public\":\"...\",\"experts\":\"...\"},\
\"weak_signals\":[\"...\"]}";

impl AnalysisOrchestrator {
    pub fn new(gateway: Arc<dyn AiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn analyze(
        &self,
        articles: &[Article],
        query: &str,
        language: &str,
        source_type: SourceType,
    ) -> Result<AnalysisResult> {
        let system = match source_type {
            SourceType::Osint => COMMUNITY_SYSTEM,
            SourceType::News => PRESS_SYSTEM,
        };
        // The main analysis path sees the full article set.
        let transcript = build_transcript(articles, None);
        let user = format!(
            "Query: {query}\nLanguage: {language}\nArticles ({count}):\n\n{transcript}",
            count = articles.len()
        );

        debug!(articles = articles.len(), ?source_type, "analysis request");

        // Gateway errors (rate limit, payment, upstream) pass through
        // untouched; no body is parsed for them.
        let raw = self.gateway.complete(system, &user).await?;
        parse_analysis(&raw, source_type)
    }
}

/// Serialize articles into a prompt transcript, newest entries first as
/// provided by the caller. `cap` bounds context for the secondary
/// extractors; the main analysis passes `None`.
pub(crate) fn build_transcript(articles: &[Article], cap: Option<usize>) -> String {
    let take = cap.unwrap_or(articles.len()).min(articles.len());
    articles[..take]
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let excerpt: String = article.content.chars().take(EXCERPT_CHARS).collect();
            format!(
                "[{n}] {source} — {title} ({published})\n{description}\n{excerpt}",
                n = i + 1,
                source = article.source.name,
                title = article.title,
                published = article.published_at.to_rfc3339(),
                description = article.description,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Deserialize)]
struct RawCommunityAnalysis {
    entities: Vec<Entity>,
    summary: String,
    predictions: Vec<Prediction>,
    sentiment: RawCommunitySentiment,
    #[serde(default)]
    weak_signals: OneOrMany<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommunitySentiment {
    community_mood: String,
    #[serde(default)]
    divergences: Vec<String>,
    #[serde(default)]
    convergences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPressAnalysis {
    entities: Vec<Entity>,
    summary: String,
    predictions: Vec<Prediction>,
    sentiment: RawPressSentiment,
    #[serde(default)]
    weak_signals: OneOrMany<String>,
}

#[derive(Debug, Deserialize)]
struct RawPressSentiment {
    public: String,
    experts: String,
}

/// Parse a model response that is either raw JSON or JSON embedded in
/// surrounding prose. Any failure is "analysis unavailable" — never a
/// best-guess partial object.
pub(crate) fn parse_analysis(raw: &str, source_type: SourceType) -> Result<AnalysisResult> {
    let json = extract_json_object(raw)
        .ok_or_else(|| Error::Parse("no JSON object in analysis response".to_string()))?;

    match source_type {
        SourceType::Osint => {
            let parsed: RawCommunityAnalysis = serde_json::from_str(json)
                .map_err(|e| Error::Parse(format!("analysis unavailable: {e}")))?;
            Ok(AnalysisResult {
                entities: parsed.entities,
                summary: parsed.summary,
                predictions: parsed.predictions,
                sentiment: Sentiment::Community {
                    community_mood: parsed.sentiment.community_mood,
                    divergences: parsed.sentiment.divergences,
                    convergences: parsed.sentiment.convergences,
                },
                weak_signals: parsed.weak_signals.into_vec(),
            })
        }
        SourceType::News => {
            let parsed: RawPressAnalysis = serde_json::from_str(json)
                .map_err(|e| Error::Parse(format!("analysis unavailable: {e}")))?;
            Ok(AnalysisResult {
                entities: parsed.entities,
                summary: parsed.summary,
                predictions: parsed.predictions,
                sentiment: Sentiment::Press {
                    public: parsed.sentiment.public,
                    experts: parsed.sentiment.experts,
                },
                weak_signals: parsed.weak_signals.into_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use ambos_core::{ArticleSource, ToolSpec};

    struct FixedGateway {
        response: std::result::Result<String, fn() -> Error>,
    }

    #[async_trait]
    impl AiGateway for FixedGateway {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            match &self.response {
                Ok(body) => Ok(body.clone()),
                Err(make) => Err(make()),
            }
        }

        async fn complete_with_tool(
            &self,
            _system: &str,
            _user: &str,
            _tool: &ToolSpec,
        ) -> Result<serde_json::Value> {
            Err(Error::Upstream("not used".to_string()))
        }
    }

    fn article(n: usize) -> Article {
        Article {
            title: format!("title {n}"),
            description: format!("description {n}"),
            content: format!("content {n}"),
            url: format!("https://example.com/{n}"),
            published_at: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            source: ArticleSource {
                name: "Example".to_string(),
                ..ArticleSource::default()
            },
            author: None,
            osint: None,
        }
    }

    #[test]
    fn transcript_includes_every_article_without_a_cap() {
        let articles: Vec<Article> = (0..30).map(article).collect();
        let transcript = build_transcript(&articles, None);
        assert!(transcript.contains("[30]"));
    }

    #[test]
    fn transcript_cap_bounds_context() {
        let articles: Vec<Article> = (0..30).map(article).collect();
        let transcript = build_transcript(&articles, Some(10));
        assert!(transcript.contains("[10]"));
        assert!(!transcript.contains("[11]"));
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let raw = "Here is the data: {\"entities\":[],\"summary\":\"x\",\"predictions\":[],\"sentiment\":{\"community_mood\":\"tense\",\"divergences\":[],\"convergences\":[]}}";
        let result = parse_analysis(raw, SourceType::Osint).unwrap();
        assert_eq!(result.summary, "x");
        assert!(matches!(result.sentiment, Sentiment::Community { .. }));
        assert!(result.weak_signals.is_empty());
    }

    #[test]
    fn press_schema_maps_to_press_variant() {
        let raw = r#"{"entities":[{"name":"EDP","kind":"organization"}],"summary":"grid recovering","predictions":[{"statement":"full restore","confidence":0.8,"horizon":"48h"}],"sentiment":{"public":"anxious","experts":"measured"},"weak_signals":"fuel shortages"}"#;
        let result = parse_analysis(raw, SourceType::News).unwrap();
        match &result.sentiment {
            Sentiment::Press { public, experts } => {
                assert_eq!(public, "anxious");
                assert_eq!(experts, "measured");
            }
            other => panic!("expected press sentiment, got {other:?}"),
        }
        // String-shaped weak_signals normalize to a one-element list.
        assert_eq!(result.weak_signals, vec!["fuel shortages".to_string()]);
    }

    #[tokio::test]
    async fn gateway_rate_limit_passes_through_unchanged() {
        let orchestrator = AnalysisOrchestrator::new(Arc::new(FixedGateway {
            response: Err(|| Error::RateLimited),
        }));
        let err = orchestrator
            .analyze(&[article(0)], "q", "en", SourceType::News)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited));
    }

    #[tokio::test]
    async fn full_path_parses_a_community_analysis() {
        let body = r#"Sure! {"entities":[{"name":"Porto","kind":"place"}],"summary":"outage chatter","predictions":[],"sentiment":{"community_mood":"frustrated","divergences":["cause"],"convergences":["duration"]},"weak_signals":["generator sales"]}"#;
        let orchestrator = AnalysisOrchestrator::new(Arc::new(FixedGateway {
            response: Ok(body.to_string()),
        }));
        let result = orchestrator
            .analyze(&[article(0)], "porto outage", "en", SourceType::Osint)
            .await
            .unwrap();
        assert_eq!(result.entities[0].name, "Porto");
        match &result.sentiment {
            Sentiment::Community { community_mood, .. } => {
                assert_eq!(community_mood, "frustrated")
            }
            other => panic!("expected community sentiment, got {other:?}"),
        }
    }

    #[test]
    fn parse_failure_is_an_explicit_error_not_a_partial_object() {
        let raw = "The model forgot to emit JSON entirely.";
        let err = parse_analysis(raw, SourceType::News).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        // Present JSON but wrong schema: also a parse failure.
        let raw = r#"{"something": "else"}"#;
        let err = parse_analysis(raw, SourceType::Osint).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
