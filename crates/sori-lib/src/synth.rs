//! Speech synthesis port and its HTTP adapter.
//!
//! The generator only needs "text in, audio file out". [`Synthesizer`] is that
//! seam; [`HttpSynthesizer`] talks to any OpenAI-compatible
//! `/v1/audio/speech` server (Kokoro-FastAPI, openai-edge-tts, ...).
//!
//! Audio is streamed to `<dest>.partial` and renamed into place once the body
//! is complete, so a file with the final name is always a whole response.

use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use sori_core::rate::rate_to_speed;
use sori_core::types::{SynthConfig, SynthRequest};

use crate::error::{Result, SoriError};
use crate::{discard_partial, partial_path};

/// Anything that can turn a [`SynthRequest`] into an audio file at `dest`.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, request: &SynthRequest, dest: &Path) -> Result<()>;
}

/// Client for an OpenAI-compatible speech endpoint.
#[derive(Debug, Clone)]
pub struct HttpSynthesizer {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpSynthesizer {
    pub fn new(config: &SynthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/v1/audio/speech", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_to(&self, request: &SynthRequest, partial: &Path) -> Result<u64> {
        let speed = match &request.rate {
            Some(rate) => rate_to_speed(rate)?,
            None => 1.0,
        };

        let body = serde_json::json!({
            "model": self.model,
            "input": request.text,
            "voice": request.voice,
            "response_format": "mp3",
            "speed": speed,
        });

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SoriError::Rejected { status, body });
        }

        let mut file = tokio::fs::File::create(partial)
            .await
            .map_err(SoriError::io("failed to create", partial))?;

        let mut bytes = 0u64;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(SoriError::io("failed to write", partial))?;
            bytes += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(SoriError::io("failed to flush", partial))?;
        Ok(bytes)
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, request: &SynthRequest, dest: &Path) -> Result<()> {
        let partial = partial_path(dest);
        debug!("POST {} chars -> {}", request.text.chars().count(), dest.display());

        match self.fetch_to(request, &partial).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, dest)
                    .await
                    .map_err(SoriError::io("failed to finalize", dest))?;
                debug!("wrote {bytes} bytes to {}", dest.display());
                Ok(())
            }
            Err(e) => {
                discard_partial(dest).await;
                Err(e)
            }
        }
    }
}
