use crate::error::ClientResult;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
    FulfillRequestParams, HeaderEntry, RequestId,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use chromiumoxide::page::Page;
use chromiumoxide_types::Binary;
use futures::StreamExt;
use std::sync::Arc;

/// A request the page is about to make, as shown to the interceptor hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub url: String,
    pub method: String,
}

/// What to do with an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDecision {
    /// Let the request through unchanged.
    Continue,
    /// Send the request with some parts rewritten.
    Modify {
        url: Option<String>,
        method: Option<String>,
        headers: Option<Vec<(String, String)>>,
        body: Option<String>,
    },
    /// Fail the request as if the network aborted it.
    Abort,
    /// Answer from the hook without touching the network.
    Respond {
        status: u16,
        content_type: String,
        body: String,
    },
}

/// A synchronous hook deciding the fate of each intercepted request.
///
/// The hook is total: every paused request receives exactly one decision, so no request is
/// left hanging.
pub type RequestInterceptor = Arc<dyn Fn(&InterceptedRequest) -> RequestDecision + Send + Sync>;

/// Enables the Fetch domain on the page and services paused requests with `interceptor`
/// until the page goes away.
pub(crate) async fn install(page: &Page, interceptor: RequestInterceptor) -> ClientResult<()> {
    page.execute(EnableParams::default()).await?;
    let mut paused = page.event_listener::<EventRequestPaused>().await?;
    let page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request = InterceptedRequest {
                url: event.request.url.clone(),
                method: event.request.method.clone(),
            };
            let decision = interceptor(&request);
            log::debug!("{} {} -> {decision:?}", request.method, request.url);
            if let Err(e) = resolve(&page, event.request_id.clone(), decision).await {
                log::warn!("failed to resolve intercepted request {}: {e}", request.url);
            }
        }
    });
    Ok(())
}

async fn resolve(page: &Page, request_id: RequestId, decision: RequestDecision) -> ClientResult<()> {
    match decision {
        RequestDecision::Continue => {
            page.execute(ContinueRequestParams::new(request_id)).await?;
        }
        RequestDecision::Modify {
            url,
            method,
            headers,
            body,
        } => {
            let mut params = ContinueRequestParams::new(request_id);
            params.url = url;
            params.method = method;
            params.headers = headers.map(header_entries);
            params.post_data = body.map(|body| Binary::from(BASE64.encode(body)));
            page.execute(params).await?;
        }
        RequestDecision::Abort => {
            page.execute(FailRequestParams::new(request_id, ErrorReason::Aborted))
                .await?;
        }
        RequestDecision::Respond {
            status,
            content_type,
            body,
        } => {
            let mut params = FulfillRequestParams::new(request_id, status as i64);
            params.response_headers = Some(vec![HeaderEntry::new("Content-Type", content_type)]);
            params.body = Some(Binary::from(BASE64.encode(body)));
            page.execute(params).await?;
        }
    }
    Ok(())
}

fn header_entries(headers: Vec<(String, String)>) -> Vec<HeaderEntry> {
    headers
        .into_iter()
        .map(|(name, value)| HeaderEntry::new(name, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_pairs_become_entries_in_order() {
        let entries = header_entries(vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("x-injected".to_string(), "great".to_string()),
        ]);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Content-Type");
        assert_eq!(entries[0].value, "application/json");
        assert_eq!(entries[1].name, "x-injected");
        assert_eq!(entries[1].value, "great");
    }
}
