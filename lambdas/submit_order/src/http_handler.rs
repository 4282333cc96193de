use lambda_http::http::header::ORIGIN;
use lambda_http::http::{Method, StatusCode};
use lambda_http::{tracing, Error, IntoResponse, Request, RequestPayloadExt};
use serde_json::json;
use shared::adapters::{Mailer, MailerError};
use shared::configuration::Configuration;
use shared::core::{EmailMessage, IdGenerator, Order, OrderSubmission};
use shared::render::render_order;
use shared::utils::{json_response, preflight_response};

pub(crate) struct HandlerDeps<M: Mailer, I: IdGenerator> {
    pub configuration: Configuration,
    pub mailer: M,
    pub id_generator: I,
}

/// The checkout pipeline: CORS/method gate, parse, validate, render,
/// submit upstream, map the outcome. One attempt, one outbound call,
/// every response JSON with the conditional CORS grant.
pub(crate) async fn function_handler<M: Mailer, I: IdGenerator>(
    deps: &HandlerDeps<M, I>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    let origin = event
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .filter(|origin| deps.configuration.origin_allowed(origin));

    if event.method() == Method::OPTIONS {
        return preflight_response(origin);
    }
    if event.method() != Method::POST {
        return json_response(
            &StatusCode::METHOD_NOT_ALLOWED,
            &json!({ "error": "Method not allowed" }),
            origin,
        );
    }

    let submission = match event.payload::<OrderSubmission>() {
        Ok(Some(submission)) => submission,
        Ok(None) | Err(_) => {
            return json_response(
                &StatusCode::BAD_REQUEST,
                &json!({ "ok": false, "error": "Invalid JSON" }),
                origin,
            );
        }
    };

    let order = match Order::from_submission(submission) {
        Ok(order) => order,
        Err(validation) => {
            return json_response(
                &StatusCode::BAD_REQUEST,
                &json!({ "ok": false, "error": format!("Bad request: {}", validation) }),
                origin,
            );
        }
    };

    let rendered = render_order(&order);
    let reply_to = if order.customer.email.is_empty() {
        // Reply-to is never omitted; fall back to the operational inbox.
        deps.configuration.order_recipient.clone()
    } else {
        order.customer.email.clone()
    };
    let message = EmailMessage {
        reply_to,
        subject: order.subject.clone(),
        text: rendered.text,
        html: rendered.html,
    };

    match deps.mailer.send(&message).await {
        Ok(()) => {
            let order_id = deps.id_generator.generate_id();
            tracing::info!("Order email accepted upstream: {}", order_id);
            json_response(
                &StatusCode::OK,
                &json!({ "ok": true, "orderId": order_id }),
                origin,
            )
        }
        Err(rejection @ MailerError::Rejected { .. }) => {
            tracing::error!("Mail API rejected order email: {}", rejection);
            json_response(
                &StatusCode::BAD_GATEWAY,
                &json!({ "ok": false, "error": rejection.to_string() }),
                origin,
            )
        }
        Err(MailerError::Transport(reason)) => {
            tracing::error!("Failed to reach mail API: {}", reason);
            json_response(
                &StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "ok": false, "error": format!("Server error: {}", reason) }),
                origin,
            )
        }
    }
}
