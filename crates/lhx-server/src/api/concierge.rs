use std::sync::LazyLock;

use axum::{extract::State, Extension, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};

use lhx_extract::query::{parse_conversational_query, ParsedQuery};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// Personality and output contract for the concierge LLM. The model must
/// answer with a JSON object carrying the reply text plus extracted filters.
const SYSTEM_PROMPT: &str = r#"You are a luxury handbag concierge assistant for "Luxury Handbag Explorer". You help customers find their perfect designer bag.

Your personality:
- Warm, knowledgeable, and sophisticated
- You speak like a personal shopper at a high-end boutique
- Enthusiastic about luxury fashion but not pushy

When users ask about bags, acknowledge their request warmly, suggest the type of bag that suits their needs, and mention brands or styles matching their criteria.

Extract these filters from the user's message:
- brand: specific brand mentioned (Hermès, Chanel, Louis Vuitton, Gucci, Prada, Dior, YSL/Saint Laurent, Bottega Veneta, etc.)
- color: color mentioned (black, gold, red, beige, tan, cream, brown, navy, etc.)
- maxPrice: maximum budget mentioned (number only, e.g., 5000)
- minPrice: minimum budget if mentioned (number only)
- bagType: type of bag (Clutch, Tote, Shoulder, Crossbody, Top-handle, etc.)
- occasion: event or use case (cocktail, dinner, work, everyday, wedding, etc.)

Always respond in this JSON format:
{
  "message": "Your conversational response here (2-3 sentences max)",
  "filters": {
    "brand": null or "Brand Name",
    "color": null or "color",
    "maxPrice": null or number,
    "minPrice": null or number,
    "bagType": null or "Type",
    "occasion": null or "occasion"
  },
  "searchQuery": "optimized search query for finding bags",
  "tip": "A short insider tip related to their request (optional, 1 sentence)"
}

Example:

User: "I need a bag for a cocktail party under $3000"
Response: {
  "message": "How exciting! For a cocktail party, you'll want something elegant yet compact. A classic clutch or small shoulder bag would be perfect.",
  "filters": {
    "brand": null,
    "color": null,
    "maxPrice": 3000,
    "minPrice": null,
    "bagType": "Clutch",
    "occasion": "cocktail"
  },
  "searchQuery": "evening clutch cocktail party elegant designer",
  "tip": "A metallic or jewel-toned clutch photographs beautifully at events!"
}

Keep responses concise and helpful. Focus on being a knowledgeable shopping assistant."#;

const FALLBACK_MESSAGE: &str = "I'd be happy to help you find the perfect bag!";

#[derive(Debug, Deserialize)]
pub(super) struct ConciergeRequest {
    pub message: Option<String>,
}

/// Filters surfaced to the UI; the camelCase wire names match the
/// concierge's JSON contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct ConciergeFilters {
    pub brand: Option<String>,
    pub color: Option<String>,
    pub max_price: Option<u32>,
    pub min_price: Option<u32>,
    pub bag_type: Option<String>,
    pub occasion: Option<String>,
}

impl From<&ParsedQuery> for ConciergeFilters {
    fn from(parsed: &ParsedQuery) -> Self {
        Self {
            brand: parsed.brand.clone(),
            color: parsed.color.clone(),
            max_price: parsed.max_price,
            min_price: parsed.min_price,
            bag_type: parsed.bag_type.clone(),
            occasion: parsed.occasion.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ConciergeData {
    pub message: String,
    pub filters: ConciergeFilters,
    #[serde(rename = "searchQuery")]
    pub search_query: String,
    pub tip: Option<String>,
}

static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json block pattern must compile"));

/// Pulls the structured payload out of a model reply.
///
/// Returns `None` when the reply carries no parseable JSON object; the
/// caller then degrades to the rule-based parser with the raw reply text.
fn parse_concierge_reply(reply: &str) -> Option<ConciergeData> {
    let block = JSON_BLOCK.find(reply)?.as_str();
    let value: serde_json::Value = serde_json::from_str(block).ok()?;

    let message = value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string();
    let filters = value
        .get("filters")
        .cloned()
        .and_then(|f| serde_json::from_value(f).ok())
        .unwrap_or_default();
    let search_query = value
        .get("searchQuery")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    let tip = value
        .get("tip")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned);

    Some(ConciergeData {
        message,
        filters,
        search_query,
        tip,
    })
}

/// Builds the response from the rule-based parser alone, used when no chat
/// provider is configured or its reply was unusable.
fn rule_based_response(user_message: &str, reply_text: Option<String>) -> ConciergeData {
    let parsed = parse_conversational_query(user_message);
    ConciergeData {
        message: reply_text.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        filters: ConciergeFilters::from(&parsed),
        search_query: parsed.search_text,
        tip: None,
    }
}

pub(super) async fn concierge(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ConciergeRequest>,
) -> Result<Json<ApiResponse<ConciergeData>>, ApiError> {
    let Some(message) = request.message.as_deref().map(str::trim).filter(|m| !m.is_empty())
    else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "message is required",
        ));
    };

    let data = match &state.chat {
        Some(chat) => match chat.complete(SYSTEM_PROMPT, message).await {
            Ok(reply) => parse_concierge_reply(&reply).unwrap_or_else(|| {
                let reply_text = (!reply.trim().is_empty()).then(|| reply.clone());
                rule_based_response(message, reply_text)
            }),
            Err(error) => {
                tracing::warn!(error = %error, "concierge LLM unavailable, using rule-based parser");
                rule_based_response(message, None)
            }
        },
        None => rule_based_response(message, None),
    };

    // An empty search query would degrade downstream keyword search.
    let data = if data.search_query.trim().is_empty() {
        ConciergeData {
            search_query: parse_conversational_query(message).search_text,
            ..data
        }
    } else {
        data
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{bare_state, test_app};
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_with_chat(server: &MockServer) -> super::super::AppState {
        let chat =
            lhx_providers::OpenAiChat::with_base_url("test-key", 5, "lhx-test/0.1", &server.uri())
                .expect("chat client");
        super::super::AppState {
            chat: Some(Arc::new(chat)),
            ..bare_state()
        }
    }

    async fn post_concierge(
        app: axum::Router,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/concierge")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("json parse"))
    }

    #[test]
    fn parse_concierge_reply_reads_wrapped_json() {
        let reply = concat!(
            "Here you go:\n",
            r#"{ "message": "A clutch would be lovely.", "filters": { "bagType": "Clutch", "maxPrice": 3000 }, "searchQuery": "evening clutch", "tip": "Go metallic." }"#
        );
        let data = parse_concierge_reply(reply).expect("should parse");
        assert_eq!(data.message, "A clutch would be lovely.");
        assert_eq!(data.filters.bag_type.as_deref(), Some("Clutch"));
        assert_eq!(data.filters.max_price, Some(3000));
        assert_eq!(data.search_query, "evening clutch");
        assert_eq!(data.tip.as_deref(), Some("Go metallic."));
    }

    #[test]
    fn parse_concierge_reply_rejects_plain_prose() {
        assert!(parse_concierge_reply("no structured content here").is_none());
    }

    #[test]
    fn rule_based_response_extracts_filters() {
        let data = rule_based_response("black YSL bags between $2000 and $5000", None);
        assert_eq!(data.filters.brand.as_deref(), Some("Saint Laurent"));
        assert_eq!(data.filters.color.as_deref(), Some("black"));
        assert_eq!(data.filters.min_price, Some(2000));
        assert_eq!(data.filters.max_price, Some(5000));
        assert_eq!(data.message, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn concierge_rejects_missing_message() {
        let app = test_app(bare_state());
        let (status, json) = post_concierge(app, serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn concierge_without_llm_uses_rule_based_parser() {
        let app = test_app(bare_state());
        let (status, json) = post_concierge(
            app,
            serde_json::json!({ "message": "I need a bag for a cocktail party under $3000" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["filters"]["bagType"], "Clutch");
        assert_eq!(json["data"]["filters"]["occasion"], "cocktail");
        assert_eq!(json["data"]["filters"]["maxPrice"], 3000);
        assert_eq!(json["data"]["searchQuery"], "clutch handbag");
    }

    #[tokio::test]
    async fn concierge_uses_llm_filters_when_parseable() {
        let server = MockServer::start().await;
        let llm_payload = serde_json::json!({
            "message": "Saint Laurent is a wonderful choice!",
            "filters": {
                "brand": "Saint Laurent",
                "color": "black",
                "maxPrice": null,
                "minPrice": null,
                "bagType": null,
                "occasion": null
            },
            "searchQuery": "Saint Laurent YSL black handbag",
            "tip": "The Loulou works day to night."
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [ { "message": { "content": llm_payload.to_string() } } ]
            })))
            .mount(&server)
            .await;

        let app = test_app(state_with_chat(&server));
        let (status, json) =
            post_concierge(app, serde_json::json!({ "message": "Show me black YSL bags" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["message"], "Saint Laurent is a wonderful choice!");
        assert_eq!(json["data"]["filters"]["brand"], "Saint Laurent");
        assert_eq!(json["data"]["searchQuery"], "Saint Laurent YSL black handbag");
        assert_eq!(json["data"]["tip"], "The Loulou works day to night.");
    }

    #[tokio::test]
    async fn concierge_falls_back_when_llm_reply_is_prose() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [ { "message": { "content": "I love totes, personally." } } ]
            })))
            .mount(&server)
            .await;

        let app = test_app(state_with_chat(&server));
        let (status, json) =
            post_concierge(app, serde_json::json!({ "message": "a tote under $2,000" })).await;

        assert_eq!(status, StatusCode::OK);
        // The prose survives as the reply; filters come from the rule-based
        // parser.
        assert_eq!(json["data"]["message"], "I love totes, personally.");
        assert_eq!(json["data"]["filters"]["bagType"], "Tote");
        assert_eq!(json["data"]["filters"]["maxPrice"], 2000);
        assert_eq!(json["data"]["searchQuery"], "tote handbag");
    }

    #[tokio::test]
    async fn concierge_falls_back_when_llm_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let app = test_app(state_with_chat(&server));
        let (status, json) = post_concierge(
            app,
            serde_json::json!({ "message": "something gold for a wedding" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["filters"]["color"], "gold");
        assert_eq!(json["data"]["filters"]["occasion"], "wedding");
        assert_eq!(json["data"]["filters"]["bagType"], "Clutch");
    }
}
