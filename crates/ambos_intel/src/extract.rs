use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use ambos_core::{AiGateway, Article, Entity, Error, Result, ToolSpec};

use crate::analyze::build_transcript;

/// Articles of context handed to the entity-graph extractor.
const ENTITY_CONTEXT_ARTICLES: usize = 15;
/// Articles of context handed to the location extractor.
const LOCATION_CONTEXT_ARTICLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGraph {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMention {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LocationsPayload {
    locations: Vec<LocationMention>,
}

/// Structured extraction over article sets via forced tool calls, which pin
/// the response shape instead of relying on prose-embedded JSON.
pub struct Extractor {
    gateway: Arc<dyn AiGateway>,
}

impl Extractor {
    pub fn new(gateway: Arc<dyn AiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn entity_graph(&self, articles: &[Article], query: &str) -> Result<EntityGraph> {
        let tool = ToolSpec {
            name: "record_entity_graph".to_string(),
            description: "Record the entities mentioned in the articles and the \
                relationships between them."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "entities": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "kind": {
                                    "type": "string",
                                    "enum": ["person", "organization", "place", "topic"]
                                }
                            },
                            "required": ["name", "kind"]
                        }
                    },
                    "relationships": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "source": { "type": "string" },
                                "target": { "type": "string" },
                                "relation": { "type": "string" }
                            },
                            "required": ["source", "target", "relation"]
                        }
                    }
                },
                "required": ["entities", "relationships"]
            }),
        };

        let transcript = build_transcript(articles, Some(ENTITY_CONTEXT_ARTICLES));
        let user = format!("Query: {query}\n\nArticles:\n\n{transcript}");
        let arguments = self
            .gateway
            .complete_with_tool(
                "You extract named entities and their relationships from news \
                 and social-media coverage.",
                &user,
                &tool,
            )
            .await?;

        serde_json::from_value(arguments)
            .map_err(|e| Error::Parse(format!("malformed entity graph: {e}")))
    }

    pub async fn locations(&self, articles: &[Article], query: &str) -> Result<Vec<LocationMention>> {
        let tool = ToolSpec {
            name: "record_locations".to_string(),
            description: "Record the geographic locations mentioned in the \
                articles, with coordinates."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "locations": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "country": { "type": "string" },
                                "latitude": { "type": "number" },
                                "longitude": { "type": "number" }
                            },
                            "required": ["name", "latitude", "longitude"]
                        }
                    }
                },
                "required": ["locations"]
            }),
        };

        let transcript = build_transcript(articles, Some(LOCATION_CONTEXT_ARTICLES));
        let user = format!("Query: {query}\n\nArticles:\n\n{transcript}");
        let arguments = self
            .gateway
            .complete_with_tool(
                "You geolocate the places mentioned in news and social-media \
                 coverage.",
                &user,
                &tool,
            )
            .await?;

        let payload: LocationsPayload = serde_json::from_value(arguments)
            .map_err(|e| Error::Parse(format!("malformed locations: {e}")))?;
        Ok(payload.locations)
    }
}
