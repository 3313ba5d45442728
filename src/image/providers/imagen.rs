//! Imagen (Google) image generation provider.

use crate::config::Config;
use crate::error::{parse_retry_after, sanitize_error_message, Result, WeaverError};
use crate::image::provider::ImageProvider;
use crate::image::types::{
    GenerationRequest, GenerationResponse, ResponseImage, JPEG_MIME_TYPE,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Imagen image generation provider.
pub struct ImagenProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ImagenProvider {
    /// Builds a provider from the startup configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key().to_string(),
            model: config.model().to_string(),
            base_url: config.base_url().to_string(),
        }
    }

    /// The model identifier sent with every call.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn predict_url(&self) -> String {
        format!("{}/v1beta/models/{}:predict", self.base_url, self.model)
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let start = Instant::now();
        let body = PredictRequest::from_generation_request(request);

        let response = self
            .client
            .post(self.predict_url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let predict: PredictResponse = response.json().await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            model = %self.model,
            predictions = predict.predictions.len(),
            duration_ms,
            "Imagen prediction complete"
        );

        Ok(GenerationResponse {
            generated_images: predict
                .predictions
                .into_iter()
                .map(|p| ResponseImage {
                    image_bytes: p.bytes_base64_encoded,
                    filtered_reason: p.rai_filtered_reason,
                })
                .collect(),
            model: Some(self.model.clone()),
            duration_ms: Some(duration_ms),
        })
    }
}

/// Maps a non-success response to an error.
fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> WeaverError {
    let envelope_message = serde_json::from_str::<ErrorEnvelope>(text)
        .ok()
        .and_then(|e| e.error.message)
        .map(|m| sanitize_error_message(&m));

    match status {
        401 | 403 => {
            return WeaverError::Auth(
                envelope_message.unwrap_or_else(|| sanitize_error_message(text)),
            )
        }
        404 => {
            return WeaverError::InvalidRequest(envelope_message.unwrap_or_else(|| {
                "Model not found. Verify the model name is correct.".into()
            }))
        }
        429 => {
            return WeaverError::RateLimited {
                message: envelope_message.unwrap_or_else(|| "rate limit exceeded".into()),
                retry_after: parse_retry_after(headers).map(std::time::Duration::from_secs),
            }
        }
        _ => {}
    }

    match envelope_message {
        Some(message) => WeaverError::Service(message),
        None => WeaverError::Api {
            status,
            message: sanitize_error_message(text),
        },
    }
}

#[async_trait]
impl ImageProvider for ImagenProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &str {
        "Imagen (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(WeaverError::Auth("Invalid API key".into())),
            404 => Err(WeaverError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(WeaverError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: String,
}

impl PredictRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: req.prompt.clone(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: req.aspect_ratio.as_str().to_string(),
                output_options: OutputOptions {
                    mime_type: JPEG_MIME_TYPE.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}
