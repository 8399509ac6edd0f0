use cdp_page_tunnel_runner::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const READY_TIMEOUT: Duration = Duration::from_millis(100);

/// The page's own data fetches are rewritten: reviews get a canned body and the product
/// lookup is cut off, so the page renders its fetch-error fallback for the description.
fn rewrite_reviews(request: &InterceptedRequest) -> RequestDecision {
    if request.url.ends_with("reviews.json") {
        return RequestDecision::Respond {
            status: 200,
            content_type: "application/json".to_string(),
            body: r#"["over 9000!"]"#.to_string(),
        };
    }
    if request.url.ends_with("product.json") {
        return RequestDecision::Abort;
    }
    RequestDecision::Continue
}

fn setup(ctx: &mut RunnerContext<BrowserRunnerContext>) -> HookResult {
    connect_browser(ctx)
}

fn agent_behaviour(
    ctx: &mut AgentContext<BrowserRunnerContext, BrowserAgentContext>,
) -> HookResult {
    let url = ctx.runner_context().cli().target_url("/campfire-commerce/");

    with_session(ctx, |ctx| {
        let session = ctx.get().session()?;
        let (description, reviews) = ctx
            .runner_context()
            .executor()
            .execute_in_place(async move {
                // Interception must be in place before the navigation starts.
                session.intercept_requests(Arc::new(rewrite_reviews)).await?;
                session
                    .goto(&url, NavigationWait::Load, PAGE_LOAD_TIMEOUT)
                    .await?;

                session
                    .wait_for_text("#product-description", READY_TIMEOUT)
                    .await?;
                session
                    .wait_for_min_count("#product-reviews > div", 1, READY_TIMEOUT)
                    .await?;

                let description: String = session
                    .evaluate(
                        "description",
                        "document.querySelector('#product-description').textContent",
                    )
                    .await?;
                let reviews: Vec<String> = session
                    .evaluate(
                        "reviews",
                        "Array.from(document.querySelectorAll('#product-reviews > div > p')).map((n) => n.textContent)",
                    )
                    .await?;
                Ok((description, reviews))
            })?;

        if description != "xhr: aborted" {
            return Err(ClientError::ValidationMismatch {
                field: "description".to_string(),
                actual: description,
                expected: "xhr: aborted".to_string(),
            }
            .into());
        }
        let expected_reviews = vec!["over 9000!".to_string()];
        if reviews != expected_reviews {
            return Err(ClientError::ValidationMismatch {
                field: "reviews".to_string(),
                actual: format!("{reviews:?}"),
                expected: format!("{expected_reviews:?}"),
            }
            .into());
        }
        Ok(())
    })
}

fn teardown(ctx: Arc<RunnerContext<BrowserRunnerContext>>) -> HookResult {
    disconnect_browser(ctx)
}

fn main() -> PageTunnelResult<()> {
    let cli = init();
    let builder = ScenarioDefinitionBuilder::<BrowserRunnerContext, BrowserAgentContext>::new(
        env!("CARGO_PKG_NAME"),
        cli,
    )
    .with_default_runs(1)
    .use_setup(setup)
    .use_agent_behaviour(agent_behaviour)
    .use_teardown(teardown);

    run(builder)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(url: &str) -> InterceptedRequest {
        InterceptedRequest {
            url: url.to_string(),
            method: "GET".to_string(),
        }
    }

    #[test]
    fn reviews_requests_get_a_canned_response() {
        let decision =
            rewrite_reviews(&request("http://127.0.0.1:1234/campfire-commerce/reviews.json"));

        match decision {
            RequestDecision::Respond {
                status,
                content_type,
                body,
            } => {
                assert_eq!(status, 200);
                assert_eq!(content_type, "application/json");
                assert_eq!(body, r#"["over 9000!"]"#);
            }
            other => panic!("expected a canned response, got {other:?}"),
        }
    }

    #[test]
    fn product_requests_are_aborted() {
        let decision =
            rewrite_reviews(&request("http://127.0.0.1:1234/campfire-commerce/product.json"));

        assert_eq!(decision, RequestDecision::Abort);
    }

    #[test]
    fn every_other_request_continues() {
        for url in [
            "http://127.0.0.1:1234/campfire-commerce/",
            "http://127.0.0.1:1234/campfire-commerce/styles.css",
            "http://127.0.0.1:1234/campfire-commerce/images/nomad_000.jpg",
        ] {
            assert_eq!(rewrite_reviews(&request(url)), RequestDecision::Continue);
        }
    }
}
