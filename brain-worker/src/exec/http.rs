//! HTTP-mode job execution (SPEC_FULL.md §2, §4.5).

use crate::error::ExecError;
use crate::vars::render;

pub async fn run(
    url: Option<&str>,
    method: Option<&str>,
    headers: Option<&serde_json::Value>,
    vars: Option<&serde_json::Value>,
) -> Result<serde_json::Value, ExecError> {
    let url = url.ok_or(ExecError::MissingUrl)?;
    let url = render(url, vars);
    let method: reqwest::Method = method
        .unwrap_or("GET")
        .parse()
        .unwrap_or(reqwest::Method::GET);

    let client = reqwest::Client::new();
    let mut request = client.request(method, url);
    if let Some(headers) = headers.and_then(|h| h.as_object()) {
        for (key, value) in headers {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            request = request.header(key, render(&value, vars));
        }
    }

    let response = request.send().await.map_err(ExecError::Request)?;
    let status = response.status();
    let body = response.text().await.map_err(ExecError::Request)?;
    if !status.is_success() {
        return Err(ExecError::BadStatus(status.as_u16()));
    }

    let body_json = serde_json::from_str::<serde_json::Value>(&body).unwrap_or(serde_json::Value::String(body));
    Ok(serde_json::json!({
        "status": status.as_u16(),
        "body": body_json,
    }))
}
