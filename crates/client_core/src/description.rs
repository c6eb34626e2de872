use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::domain::Priority;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const FALLBACK_DESCRIPTION: &str =
    "Não foi possível gerar a descrição automaticamente. Descreva o problema manualmente.";
pub const MISSING_KEY_DESCRIPTION: &str =
    "Descrição automática indisponível: chave de API não configurada.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionRequest {
    pub title: String,
    pub location: String,
    pub priority: Priority,
}

impl DescriptionRequest {
    fn prompt(&self) -> String {
        format!(
            "Você é um engenheiro civil responsável pela qualidade de uma obra. \
             Escreva uma descrição técnica curta (no máximo 3 frases, em português) \
             para a pendência abaixo, indicando o problema e a correção esperada.\n\
             Título: {}\nLocal: {}\nPrioridade: {}",
            self.title, self.location, self.priority
        )
    }
}

/// Produces a draft description. Never fails: problems surface as a fixed
/// fallback text the operator can overwrite.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn generate(&self, request: &DescriptionRequest) -> String;
}

/// Always answers with the same text. Used when no service is configured.
pub struct FixedDescription(pub String);

#[async_trait]
impl DescriptionGenerator for FixedDescription {
    async fn generate(&self, _request: &DescriptionRequest) -> String {
        self.0.clone()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Client for a Gemini-compatible `generateContent` endpoint.
pub struct GeminiDescriptionService {
    http: Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiDescriptionService {
    pub fn new(endpoint: Url, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn request_url(&self, api_key: &str) -> Result<Url> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{base}/v1beta/models/{}:generateContent",
            self.model
        ))
        .with_context(|| format!("invalid description endpoint '{base}'"))?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    async fn try_generate(&self, api_key: &str, request: &DescriptionRequest) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt(),
                }],
            }],
        };
        let response: GenerateContentResponse = self
            .http
            .post(self.request_url(api_key)?)
            .json(&body)
            .send()
            .await
            .context("failed to reach description service")?
            .error_for_status()
            .context("description service returned error")?
            .json()
            .await
            .context("invalid description service payload")?;

        let text = response
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("description service returned no text"));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl DescriptionGenerator for GeminiDescriptionService {
    async fn generate(&self, request: &DescriptionRequest) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("no API key configured; skipping description request");
            return MISSING_KEY_DESCRIPTION.to_string();
        };
        match self.try_generate(api_key, request).await {
            Ok(text) => text,
            Err(err) => {
                warn!(title = %request.title, "description generation failed: {err:#}");
                FALLBACK_DESCRIPTION.to_string()
            }
        }
    }
}
