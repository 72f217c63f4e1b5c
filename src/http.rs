use std::time::Duration;

use leptos::prelude::{set_timeout_with_handle, window, TimeoutHandle};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

use crate::error::PageError;

/// Aborts everything started with its signal once `timeout_ms` passes
/// (0 disables it). The timer is cleared on drop.
struct Deadline {
    controller: AbortController,
    timer: Option<TimeoutHandle>,
}

impl Deadline {
    fn new(timeout_ms: u64) -> Result<Self, PageError> {
        let controller = AbortController::new()?;
        let timer = if timeout_ms > 0 {
            let abort = controller.clone();
            Some(set_timeout_with_handle(
                move || abort.abort(),
                Duration::from_millis(timeout_ms),
            )?)
        } else {
            None
        };
        Ok(Self { controller, timer })
    }

    fn expired(&self) -> bool {
        self.controller.signal().aborted()
    }

    fn error(&self, url: &str, err: JsValue) -> PageError {
        if self.expired() {
            PageError::Timeout(url.to_string())
        } else {
            err.into()
        }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.clear();
        }
    }
}

async fn send(url: &str, deadline: &Deadline) -> Result<Response, PageError> {
    let headers = Headers::new()?;
    headers.set("X-Requested-With", "XMLHttpRequest")?;

    let init = RequestInit::new();
    init.set_method("GET");
    init.set_headers(&headers);
    init.set_signal(Some(&deadline.controller.signal()));
    let request = Request::new_with_str_and_init(url, &init)?;

    let value = JsFuture::from(window().fetch_with_request(&request))
        .await
        .map_err(|err| deadline.error(url, err))?;
    Ok(value.dyn_into::<Response>()?)
}

/// Issues a GET with the `X-Requested-With` marker the server expects from
/// page scripts. The timeout covers the response headers; the status is left
/// to the caller.
pub async fn get(url: &str, timeout_ms: u64) -> Result<Response, PageError> {
    let deadline = Deadline::new(timeout_ms)?;
    send(url, &deadline).await
}

/// GET returning the body text of a 2xx response. The timeout covers the
/// whole exchange, body included.
pub async fn get_text(url: &str, timeout_ms: u64) -> Result<String, PageError> {
    let deadline = Deadline::new(timeout_ms)?;
    let response = send(url, &deadline).await?;
    if !response.ok() {
        return Err(PageError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let body = JsFuture::from(response.text()?)
        .await
        .map_err(|err| deadline.error(url, err))?;
    Ok(body.as_string().unwrap_or_default())
}
