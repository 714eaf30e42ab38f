// src/common/uploads.rs
//
// Intake das fotos dos lotes: valida extensão/tamanho, grava em disco
// (UPLOADS_DIR/crops/) e devolve o caminho público servido em /uploads.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::common::error::AppError;

pub const MAX_IMAGES_PER_LISTING: usize = 5;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024; // 5MB por foto

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Valida nome e tamanho da foto e devolve a extensão normalizada.
pub fn validate_image(original_name: &str, len: usize) -> Result<String, AppError> {
    if len == 0 {
        return Err(AppError::InvalidImage(format!("'{}' está vazio.", original_name)));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(AppError::InvalidImage(format!(
            "'{}' excede o limite de 5MB.",
            original_name
        )));
    }

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::InvalidImage(format!(
            "'{}' não é uma imagem aceita (jpg, jpeg, png, webp).",
            original_name
        )));
    }

    Ok(ext)
}

/// Grava a foto no disco e devolve o caminho público ("/uploads/crops/...").
pub async fn save_crop_image(
    uploads_dir: &Path,
    original_name: &str,
    data: &[u8],
) -> Result<String, AppError> {
    let ext = validate_image(original_name, data.len())?;

    let dir = uploads_dir.join("crops");
    tokio::fs::create_dir_all(&dir).await?;

    // Nome imprevisível o suficiente para não colidir, previsível na estrutura
    let file_name = format!("crop-{}.{}", Uuid::new_v4(), ext);
    tokio::fs::write(dir.join(&file_name), data).await?;

    Ok(format!("/uploads/crops/{}", file_name))
}

/// Grava um conjunto de fotos em bloco: ou todas entram, ou nenhuma fica.
pub async fn save_crop_images(
    uploads_dir: &Path,
    files: &[(String, Vec<u8>)],
) -> Result<Vec<String>, AppError> {
    let mut paths = Vec::with_capacity(files.len());
    for (original_name, data) in files {
        match save_crop_image(uploads_dir, original_name, data).await {
            Ok(path) => paths.push(path),
            Err(e) => {
                remove_crop_images(uploads_dir, &paths).await;
                return Err(e);
            }
        }
    }
    Ok(paths)
}

/// Remove fotos já gravadas. Usado como rollback quando a requisição falha
/// depois do upload (dono errado, lote inexistente, erro de banco).
pub async fn remove_crop_images(uploads_dir: &Path, public_paths: &[String]) {
    for public_path in public_paths {
        let Some(path) = disk_path(uploads_dir, public_path) else {
            continue;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Falha ao remover foto órfã {}: {}", public_path, e);
        }
    }
}

// Caminho no disco correspondente a um caminho público "/uploads/crops/...".
// Qualquer coisa fora desse formato (subdiretório, "..", vazio) é ignorada.
fn disk_path(uploads_dir: &Path, public_path: &str) -> Option<PathBuf> {
    let file_name = public_path.strip_prefix("/uploads/crops/")?;
    if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
        return None;
    }
    Some(uploads_dir.join("crops").join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aceita_extensoes_de_imagem() {
        assert_eq!(validate_image("foto.jpg", 1024).unwrap(), "jpg");
        assert_eq!(validate_image("foto.JPEG", 1024).unwrap(), "jpeg");
        assert_eq!(validate_image("foto.png", 1024).unwrap(), "png");
        assert_eq!(validate_image("foto.webp", 1024).unwrap(), "webp");
    }

    #[test]
    fn rejeita_outros_arquivos() {
        assert!(validate_image("nota.pdf", 1024).is_err());
        assert!(validate_image("script.sh", 1024).is_err());
        assert!(validate_image("sem_extensao", 1024).is_err());
    }

    #[test]
    fn rejeita_fotos_vazias_ou_gigantes() {
        assert!(validate_image("foto.jpg", 0).is_err());
        assert!(validate_image("foto.jpg", MAX_IMAGE_BYTES + 1).is_err());
        assert!(validate_image("foto.jpg", MAX_IMAGE_BYTES).is_ok());
    }

    #[test]
    fn so_mapeia_caminhos_publicos_de_crops() {
        let dir = Path::new("/var/uploads");

        let mapped = disk_path(dir, "/uploads/crops/crop-abc.jpg").unwrap();
        assert_eq!(mapped, Path::new("/var/uploads/crops/crop-abc.jpg"));

        assert!(disk_path(dir, "/uploads/crops/").is_none());
        assert!(disk_path(dir, "/uploads/outros/foto.jpg").is_none());
        assert!(disk_path(dir, "/uploads/crops/../segredo.jpg").is_none());
        assert!(disk_path(dir, "/etc/passwd").is_none());
    }

    #[tokio::test]
    async fn rollback_remove_fotos_gravadas() {
        let dir = std::env::temp_dir().join(format!("agromercado-uploads-{}", Uuid::new_v4()));

        let paths = save_crop_images(
            &dir,
            &[
                ("a.jpg".to_string(), vec![1, 2, 3]),
                ("b.png".to_string(), vec![4, 5, 6]),
            ],
        )
        .await
        .unwrap();
        assert_eq!(paths.len(), 2);
        for p in &paths {
            assert!(disk_path(&dir, p).unwrap().exists());
        }

        remove_crop_images(&dir, &paths).await;
        for p in &paths {
            assert!(!disk_path(&dir, p).unwrap().exists());
        }

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn gravacao_em_bloco_nao_deixa_restos() {
        let dir = std::env::temp_dir().join(format!("agromercado-uploads-{}", Uuid::new_v4()));

        // A segunda foto é inválida: a primeira, já gravada, tem que sumir
        let err = save_crop_images(
            &dir,
            &[
                ("a.jpg".to_string(), vec![1, 2, 3]),
                ("nota.pdf".to_string(), vec![4, 5, 6]),
            ],
        )
        .await;
        assert!(err.is_err());

        let mut entries = Vec::new();
        if let Ok(mut dir_entries) = tokio::fs::read_dir(dir.join("crops")).await {
            while let Ok(Some(entry)) = dir_entries.next_entry().await {
                entries.push(entry.file_name());
            }
        }
        assert!(entries.is_empty());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
