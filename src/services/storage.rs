// src/services/storage.rs

use std::path::PathBuf;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use uuid::Uuid;

use crate::common::error::AppError;

/// Fronteira com o object storage: bytes entram, URL durável sai. O core
/// trata o upload como opaco; trocar por um bucket externo é trocar esta
/// implementação.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(&self, bytes: &[u8], extension: &str) -> Result<String, AppError>;
}

pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, bytes: &[u8], extension: &str) -> Result<String, AppError> {
        let file_name = format!("{}.{}", Uuid::new_v4().simple(), extension);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        let path = self.root.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        Ok(format!("{}/uploads/{}", self.base_url, file_name))
    }
}

/// Decodifica payloads `data:<mime>;base64,<dados>` vindos do navegador
/// (assinatura desenhada, comprovante, arquivo de contrato). Base64 puro
/// também é aceito e assumido como PNG.
pub fn decode_data_url(payload: &str) -> Result<(Vec<u8>, String), AppError> {
    let (mime, data) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| AppError::StorageError("payload data-URL malformado".to_string()))?;
            (header.split(';').next().unwrap_or("").to_string(), data)
        }
        None => ("image/png".to_string(), payload),
    };

    let extension = match mime.as_str() {
        "" | "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "application/pdf" => "pdf",
        _ => "bin",
    };

    let bytes = B64
        .decode(data.trim())
        .map_err(|e| AppError::StorageError(format!("base64 inválido: {e}")))?;

    Ok((bytes, extension.to_string()))
}
