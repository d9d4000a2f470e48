//! 埋め込みAPI連携モジュール
//!
//! OpenAI互換の `POST {endpoint}/embeddings` を呼び出す。
//! text-embeddings-inference 等で sentence-transformers モデルを
//! 配信している前提。

use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trm_rank_common::{Error, SentenceEncoder, StrategyKind};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingItem {
    #[serde(default)]
    pub index: usize,
    pub embedding: Vec<f32>,
}

fn unavailable(reason: impl ToString) -> Error {
    Error::strategy_unavailable(StrategyKind::Embedding, reason)
}

/// HTTP経由の文埋め込みモデル
pub struct HttpEncoder {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEncoder {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> trm_rank_common::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(unavailable)?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> trm_rank_common::Result<Self> {
        Self::new(
            &config.embedding_endpoint,
            &config.embedding_model,
            config.get_api_key(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn url(&self) -> String {
        format!("{}/embeddings", self.endpoint)
    }
}

/// レスポンスを入力順のベクトルに並べ直す
pub fn decode_response(
    response: EmbeddingResponse,
    expected: usize,
) -> trm_rank_common::Result<Vec<Vec<f32>>> {
    let mut items = response.data;
    if items.len() != expected {
        return Err(unavailable(format!(
            "埋め込み件数が一致しません（期待: {}, 実際: {}）",
            expected,
            items.len()
        )));
    }
    items.sort_by_key(|item| item.index);

    let dim = items.first().map(|i| i.embedding.len()).unwrap_or(0);
    if items.iter().any(|i| i.embedding.len() != dim) {
        return Err(unavailable("埋め込みの次元が揃っていません"));
    }

    Ok(items.into_iter().map(|i| i.embedding).collect())
}

impl SentenceEncoder for HttpEncoder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn encode_batch(&self, texts: &[&str]) -> trm_rank_common::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(url = %self.url(), count = texts.len(), "埋め込みリクエスト");

        let mut request = self.client.post(self.url()).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(unavailable)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(unavailable(format!(
                "埋め込みAPI失敗 ({}): {}",
                status,
                body.trim()
            )));
        }

        let payload: EmbeddingResponse = response.json().map_err(unavailable)?;
        decode_response(payload, texts.len())
    }
}
