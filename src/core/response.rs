use crate::domain::model::ListBody;
use crate::domain::ports::{ApiRequest, ApiResponse, Transport};
use crate::utils::error::{ClientError, Result};
use serde::de::DeserializeOwned;

/// Passes 2xx responses through and turns everything else into a typed error
/// carrying the backend's message, or the bare status when it sent none.
pub(crate) fn ensure_success(response: ApiResponse, resource: &str) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status;
    let message = response
        .error_message()
        .unwrap_or_else(|| format!("HTTP {}", status));
    tracing::debug!("{} request answered {}: {}", resource, status, message);

    if status == 404 {
        Err(ClientError::NotFound {
            resource: resource.to_string(),
            message,
        })
    } else {
        Err(ClientError::BusinessRejection { status, message })
    }
}

pub(crate) fn decode_list<T: DeserializeOwned>(response: &ApiResponse) -> Result<Vec<T>> {
    Ok(response.json::<ListBody<T>>()?.into_items())
}

/// Body of a plain confirmation response, unquoted if the backend sent a JSON string.
pub(crate) fn confirmation_text(response: &ApiResponse, default: impl FnOnce() -> String) -> String {
    let trimmed = response.body.trim();
    if trimmed.is_empty() {
        return default();
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| trimmed.to_string()),
        _ => trimmed.to_string(),
    }
}

/// Sends one request, folding every failure into a single human-readable message:
/// the backend's own `message` when it sent one, `fallback` otherwise.
pub(crate) async fn send_or_message<T: Transport + ?Sized>(
    transport: &T,
    request: ApiRequest,
    fallback: &str,
) -> std::result::Result<ApiResponse, String> {
    let path = request.path();
    match transport.send(request).await {
        Ok(response) if response.is_success() => Ok(response),
        Ok(response) => {
            let message = response
                .error_message()
                .unwrap_or_else(|| fallback.to_string());
            tracing::warn!("{} answered {}: {}", path, response.status, message);
            Err(message)
        }
        Err(e) => {
            tracing::warn!("{} failed: {}", path, e);
            Err(fallback.to_string())
        }
    }
}
