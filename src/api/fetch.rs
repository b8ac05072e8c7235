use log::{debug, error};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestCredentials, RequestInit, Response};

use super::{parse_chat_response, parse_upload_response, ChatRequest, DocQaApi, UploadReceipt};
use crate::config::{CHAT_PATH, UPLOAD_PATH};
use crate::error::ClientError;

/// Browser transport: `fetch` against the host, session cookie included.
#[derive(Debug, Clone, Copy)]
pub struct FetchApi {
    upload_path: &'static str,
    chat_path: &'static str,
}

impl Default for FetchApi {
    fn default() -> Self {
        Self {
            upload_path: UPLOAD_PATH,
            chat_path: CHAT_PATH,
        }
    }
}

fn js_error(context: &str, value: JsValue) -> ClientError {
    let detail = format!("{context}: {value:?}");
    error!("{detail}");
    ClientError::Transport(detail)
}

async fn send(url: &str, init: &RequestInit) -> Result<(u16, String), ClientError> {
    let request = Request::new_with_str_and_init(url, init).map_err(|e| js_error("building request", e))?;
    let window = web_sys::window().ok_or_else(|| ClientError::Transport("no window".to_string()))?;

    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_error("fetch", e))?;
    let resp: Response = resp_value.dyn_into().map_err(|e| js_error("response cast", e))?;

    let text = JsFuture::from(resp.text().map_err(|e| js_error("reading body", e))?)
        .await
        .map_err(|e| js_error("reading body", e))?;
    let body = text.as_string().unwrap_or_default();
    debug!("{url} -> {} ({} bytes)", resp.status(), body.len());

    Ok((resp.status(), body))
}

fn post_init(body: &JsValue) -> RequestInit {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_credentials(RequestCredentials::Include);
    init.set_body(body);
    init
}

impl DocQaApi<File> for FetchApi {
    async fn upload(&self, file: &File, conversation_id: Option<&str>) -> Result<UploadReceipt, ClientError> {
        let form = FormData::new().map_err(|e| js_error("creating form", e))?;
        form.append_with_blob_and_filename("files", file, &file.name())
            .map_err(|e| js_error("attaching file", e))?;
        if let Some(id) = conversation_id {
            form.append_with_str("conversation_id", id)
                .map_err(|e| js_error("attaching conversation id", e))?;
        }

        let (status, body) = send(self.upload_path, &post_init(&form)).await?;
        parse_upload_response(status, &body)
    }

    async fn ask(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let payload = serde_json::to_string(request).map_err(|e| ClientError::Decode(e.to_string()))?;
        let init = post_init(&JsValue::from_str(&payload));
        let headers = web_sys::Headers::new().map_err(|e| js_error("creating headers", e))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| js_error("setting content type", e))?;
        headers
            .set("Accept", "application/json")
            .map_err(|e| js_error("setting accept", e))?;
        init.set_headers(&headers);

        let (status, body) = send(self.chat_path, &init).await?;
        parse_chat_response(status, &body)
    }
}
