// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed RPC client over the worker's localhost HTTP surface. One
//! `reqwest::Client` per bridge instance, one method per RPC, request
//! built and awaited inline.

use std::time::Duration;

use forge3d_core::Error;

use crate::types::{
    GenerateFullRequest, GenerateFullResponse, GenerateImageRequest, GenerateImageResponse,
    GenerateMeshRequest, GenerateMeshResponse,
};

#[derive(Debug, Clone)]
pub struct WorkerClient {
    http: reqwest::Client,
    base_url: String,
}

impl WorkerClient {
    pub fn new(port: u16) -> Self {
        // A generous connect timeout; per-call timeouts are applied with
        // `.timeout(..)` on each request since they differ per RPC.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, base_url: format!("http://127.0.0.1:{port}") }
    }

    pub async fn health(&self) -> Result<(), Error> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map_err(|e| Error::BridgeUnavailable(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Error::BridgeUnavailable(format!("health check returned {}", resp.status())))
        }
    }

    pub async fn generate_image(
        &self,
        req: GenerateImageRequest,
        timeout: Duration,
    ) -> Result<GenerateImageResponse, Error> {
        self.post("/generate/image", &req, timeout).await
    }

    pub async fn generate_mesh(
        &self,
        req: GenerateMeshRequest,
        timeout: Duration,
    ) -> Result<GenerateMeshResponse, Error> {
        self.post("/generate/mesh", &req, timeout).await
    }

    pub async fn generate_full(
        &self,
        req: GenerateFullRequest,
        timeout: Duration,
    ) -> Result<GenerateFullResponse, Error> {
        self.post("/generate/full", &req, timeout).await
    }

    async fn post<B, R>(&self, path: &str, body: &B, timeout: Duration) -> Result<R, Error>
    where
        B: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("worker call to {path} timed out"))
                } else {
                    Error::BridgeUnavailable(e.to_string())
                }
            })?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::BridgeUnavailable(format!("worker returned {status}: {body}")));
        }
        resp.json::<R>().await.map_err(|e| Error::BridgeUnavailable(e.to_string()))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
