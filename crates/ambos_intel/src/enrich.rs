use std::sync::Arc;

use tracing::debug;

use ambos_core::{AiGateway, EnrichedQuery, Error, Platform, Result, SourceType};

/// Rewrites a free-text query into a platform-optimized search expression
/// with exactly one AI-completion call. Enrichment failures propagate: a
/// garbage query would corrupt every downstream search.
pub struct QueryEnricher {
    gateway: Arc<dyn AiGateway>,
}

/// Prompt family, picked deterministically from the request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Template {
    BlueskyKeywords,
    MastodonHashtags,
    OsintHybrid,
    NewsBoolean,
}

pub(crate) fn template_for(source_type: SourceType, platforms: &[Platform]) -> Template {
    match source_type {
        SourceType::Osint => match platforms {
            [Platform::Bluesky] => Template::BlueskyKeywords,
            [Platform::Mastodon] => Template::MastodonHashtags,
            _ => Template::OsintHybrid,
        },
        SourceType::News => Template::NewsBoolean,
    }
}

fn system_prompt(template: Template, language: &str) -> String {
    match template {
        Template::BlueskyKeywords => format!(
            "You are a search specialist for the BlueSky social network. \
             Rewrite the user's query as 5-7 plain search keywords covering \
             the topic, in both English and {language}. BlueSky search does \
             not use hashtags: never emit the '#' character. Respond with \
             only the keywords separated by single spaces, nothing else."
        ),
        Template::MastodonHashtags => format!(
            "You are a search specialist for the Mastodon network. Rewrite \
             the user's query as 3-5 hashtags relevant to the topic, in \
             English and {language}. Every token must start with '#'. \
             Respond with only the hashtags separated by single spaces, \
             nothing else."
        ),
        Template::OsintHybrid => format!(
            "You are a social-media search specialist. Rewrite the user's \
             query for cross-platform search: first 3-5 hashtags, then 4-6 \
             plain keywords, in English and {language}, all separated by \
             single spaces. Respond with only the search terms, nothing else."
        ),
        Template::NewsBoolean => format!(
            "You are a news search specialist. Rewrite the user's query as a \
             boolean search expression using AND, OR, and NOT with \
             parenthetical grouping, expanding synonyms in both English and \
             {language}. Respond with only the boolean expression, nothing \
             else."
        ),
    }
}

/// Trim the model response and strip wrapping quotes and code fences.
pub(crate) fn clean_response(raw: &str) -> String {
    let stripped = crate::parse::strip_code_fences(raw);
    stripped
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

impl QueryEnricher {
    pub fn new(gateway: Arc<dyn AiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn enrich(
        &self,
        query: &str,
        language: &str,
        source_type: SourceType,
        platforms: &[Platform],
    ) -> Result<EnrichedQuery> {
        let template = template_for(source_type, platforms);
        debug!(?template, %query, "enriching query");

        let system = system_prompt(template, language);
        let user = format!("Rewrite this search query: {query}");

        let raw = self.gateway.complete(&system, &user).await?;
        let enriched = clean_response(&raw);
        if enriched.is_empty() {
            return Err(Error::Parse(
                "enrichment returned an empty query".to_string(),
            ));
        }

        Ok(EnrichedQuery {
            original_query: query.to_string(),
            enriched_query: enriched,
        })
    }
}
