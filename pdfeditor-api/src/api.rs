use crate::config::Config;
use crate::error::AppError;
use crate::form::FormData;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pdfeditor::{
    CompressRequest, ConvertRequest, DocumentInfo, ExtractionReport, OutputArtifact, PdfARequest,
    PdfAValidationReport, PdfEditor, PdfEngine, SplitRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Envelope around every JSON response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
        }
    }
}

/// An output artifact together with the URL it can be fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    #[serde(flatten)]
    pub artifact: OutputArtifact,
    pub download_url: String,
}

impl From<OutputArtifact> for FileResponse {
    fn from(artifact: OutputArtifact) -> Self {
        let download_url = format!("/api/download/{}", artifact.file_name);
        Self {
            artifact,
            download_url,
        }
    }
}

type SharedEditor<E> = Arc<PdfEditor<E>>;
type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Build the application router with all routes configured
pub fn app<E: PdfEngine + 'static>(editor: PdfEditor<E>, config: &Config) -> Router {
    Router::new()
        .route("/api/health", get(health_check::<E>))
        // Document assembly
        .route("/api/merge", post(merge::<E>))
        .route("/api/split", post(split::<E>))
        .route("/api/convert", post(convert::<E>))
        // Supporting operations
        .route("/api/compress", post(compress::<E>))
        .route("/api/pdfa/convert", post(convert_pdfa::<E>))
        .route("/api/pdfa/validate", post(validate_pdfa::<E>))
        .route("/api/extract", post(extract::<E>))
        .route("/api/metadata", post(metadata::<E>))
        .route("/api/download/{filename}", get(download::<E>))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(config.cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(editor))
}

/// Run an editor operation on the blocking pool.
async fn run_blocking<E, T>(
    editor: &SharedEditor<E>,
    work: impl FnOnce(&PdfEditor<E>) -> pdfeditor::Result<T> + Send + 'static,
) -> Result<T, AppError>
where
    E: PdfEngine + 'static,
    T: Send + 'static,
{
    let editor = Arc::clone(editor);
    let outcome = tokio::task::spawn_blocking(move || work(&editor))
        .await
        .map_err(|e| AppError::Internal(format!("Worker task failed: {e}")))?;
    Ok(outcome?)
}

fn files(artifacts: Vec<OutputArtifact>) -> Vec<FileResponse> {
    artifacts.into_iter().map(FileResponse::from).collect()
}

/// Health check endpoint for monitoring and load balancing
async fn health_check<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pdfeditor API",
        "version": env!("CARGO_PKG_VERSION"),
        "engine": editor.engine().name(),
    }))
}

async fn merge<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<FileResponse> {
    let mut form = FormData::read(multipart).await?;
    let uploads = form.take_uploads("files");
    let output_name = form.text_owned("outputFileName");
    let count = uploads.len();

    let artifact = run_blocking(&editor, move |editor| {
        editor.merge(&uploads, output_name.as_deref())
    })
    .await?;

    info!("Merged {} files into {}", count, artifact.file_name);
    Ok(Json(ApiResponse::success(
        format!("Successfully merged {count} PDF files"),
        artifact.into(),
    )))
}

async fn split<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<Vec<FileResponse>> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.take_upload("file");
    let request = SplitRequest {
        mode: form.text_owned("splitMode").unwrap_or_default(),
        points: form.list("splitPoints"),
        output_base: form.text_owned("outputFileNameBase"),
    };

    let artifacts = run_blocking(&editor, move |editor| editor.split(&upload, &request)).await?;

    Ok(Json(ApiResponse::success(
        format!("PDF split into {} files", artifacts.len()),
        files(artifacts),
    )))
}

async fn convert<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<Vec<FileResponse>> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.take_upload("file");
    let request = ConvertRequest {
        image_format: form.text_owned("imageFormat"),
        dpi: form.parse("dpi")?,
        pages: form.text_owned("pages"),
        output_base: form.text_owned("outputFileNameBase"),
    };

    let artifacts = run_blocking(&editor, move |editor| {
        editor.convert_to_images(&upload, &request)
    })
    .await?;

    Ok(Json(ApiResponse::success(
        format!("Converted {} pages to images", artifacts.len()),
        files(artifacts),
    )))
}

async fn compress<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<FileResponse> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.take_upload("file");
    let request = CompressRequest {
        profile: form.text_owned("compressionProfile"),
        image_quality: form.parse("imageQuality")?,
        output_file_name: form.text_owned("outputFileName"),
    };

    let artifact = run_blocking(&editor, move |editor| editor.compress(&upload, &request)).await?;

    let message = match artifact.compression_ratio {
        Some(ratio) => format!("PDF compressed, size reduced by {ratio:.1}%"),
        None => "PDF compressed".to_string(),
    };
    Ok(Json(ApiResponse::success(message, artifact.into())))
}

async fn convert_pdfa<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<FileResponse> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.take_upload("file");
    let request = PdfARequest {
        conformance_level: form.text_owned("conformanceLevel"),
        output_file_name: form.text_owned("outputFileName"),
    };

    let artifact =
        run_blocking(&editor, move |editor| editor.convert_to_pdfa(&upload, &request)).await?;

    Ok(Json(ApiResponse::success(
        "PDF converted to PDF/A",
        artifact.into(),
    )))
}

async fn validate_pdfa<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<PdfAValidationReport> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.take_upload("file");
    let level = form.text_owned("conformanceLevel");

    let report = run_blocking(&editor, move |editor| {
        editor.validate_pdfa(&upload, level.as_deref())
    })
    .await?;

    Ok(Json(ApiResponse::success(report.summary.clone(), report)))
}

async fn extract<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<ExtractionReport> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.take_upload("file");
    let pages = form.text_owned("pages");

    let report = run_blocking(&editor, move |editor| {
        editor.extract_data(&upload, pages.as_deref())
    })
    .await?;

    Ok(Json(ApiResponse::success(
        format!("Extracted text from {} pages", report.pages.len()),
        report,
    )))
}

async fn metadata<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    multipart: Multipart,
) -> ApiResult<DocumentInfo> {
    let mut form = FormData::read(multipart).await?;
    let upload = form.take_upload("file");

    let info = run_blocking(&editor, move |editor| editor.read_metadata(&upload)).await?;

    Ok(Json(ApiResponse::success("Metadata extracted", info)))
}

/// Serve a previously produced artifact as an attachment
async fn download<E: PdfEngine + 'static>(
    State(editor): State<SharedEditor<E>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let requested = filename.clone();
    let path = run_blocking(&editor, move |editor| {
        editor.workspace().resolve_download(&requested)
    })
    .await?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read {filename}: {e}")))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type(&filename).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type("a.pdf"), "application/pdf");
        assert_eq!(content_type("scan_page_01.PNG"), "image/png");
        assert_eq!(content_type("scan.jpg"), "image/jpeg");
        assert_eq!(content_type("scan.tiff"), "image/tiff");
        assert_eq!(content_type("notes"), "application/octet-stream");
    }

    #[test]
    fn test_file_response_flattens_artifact() {
        let artifact = OutputArtifact::new("merged.pdf", PathBuf::from("/out/merged.pdf"), 42);
        let json = serde_json::to_value(FileResponse::from(artifact)).unwrap();
        assert_eq!(json["fileName"], "merged.pdf");
        assert_eq!(json["fileSize"], 42);
        assert_eq!(json["downloadUrl"], "/api/download/merged.pdf");
    }

    #[test]
    fn test_failure_envelope() {
        let response: ApiResponse<()> = ApiResponse::failure("nope", None);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "nope");
        assert!(json["data"].is_null());
    }
}
