//! Webhook handlers for the slash-command endpoints.

use {
    axum::{
        Form, Json,
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde::Deserialize,
    tracing::warn,
    url::Url,
};

use {
    gantry_bridge::CallbackMessage,
    gantry_commands::{Error as CommandError, WebhookRequest},
};

use crate::state::AppState;

/// Form fields the chat platform posts to every endpoint.
///
/// All are optional at the wire level so a missing one becomes a
/// field-naming validation error instead of a framework rejection.
#[derive(Debug, Deserialize)]
pub struct SlashForm {
    pub command: Option<String>,
    pub text: Option<String>,
    pub response_url: Option<String>,
}

// ── Slash-command routes ─────────────────────────────────────────────────────

pub async fn test_hook(State(state): State<AppState>, Form(form): Form<SlashForm>) -> Response {
    run_slash(state, "test-hook", form).await
}

pub async fn deploy(State(state): State<AppState>, Form(form): Form<SlashForm>) -> Response {
    run_slash(state, "deploy", form).await
}

pub async fn reload(State(state): State<AppState>, Form(form): Form<SlashForm>) -> Response {
    run_slash(state, "reload", form).await
}

pub async fn rollforward(State(state): State<AppState>, Form(form): Form<SlashForm>) -> Response {
    run_slash(state, "rollforward", form).await
}

pub async fn scheduler(State(state): State<AppState>, Form(form): Form<SlashForm>) -> Response {
    run_slash(state, "scheduler", form).await
}

pub async fn worker(State(state): State<AppState>, Form(form): Form<SlashForm>) -> Response {
    run_slash(state, "worker", form).await
}

/// Shared slash-command path: validate the form, dispatch, acknowledge.
///
/// The route, not the form's `command` value, decides which command runs;
/// the field is still required because the platform always sends it and
/// its absence means the request never came from a slash command.
async fn run_slash(state: AppState, name: &'static str, form: SlashForm) -> Response {
    let SlashForm {
        command,
        text,
        response_url,
    } = form;
    if command.is_none() {
        return missing_field("command");
    }
    let Some(text) = text else {
        return missing_field("text");
    };
    let Some(response_url) = response_url else {
        return missing_field("response_url");
    };
    let callback_url = match Url::parse(&response_url) {
        Ok(url) => url,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": format!("invalid response_url: {error}") })),
            )
                .into_response();
        },
    };

    let request = WebhookRequest {
        command: name.to_string(),
        argument_text: text,
        callback_url,
    };
    match state.registry.dispatch(&state.bridge, request) {
        // The handle is dropped on purpose; producer and consumer keep
        // running detached and the ceiling supervises them.
        Ok((ack, _handle)) => Json(CallbackMessage::in_channel(&ack)).into_response(),
        Err(error) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

// ── Deployment info ──────────────────────────────────────────────────────────

/// `/deployment-info`: the one synchronous command. Only `text` is consumed;
/// there are no async follow-ups, so no callback URL is required either.
pub async fn deployment_info(
    State(state): State<AppState>,
    Form(form): Form<SlashForm>,
) -> Response {
    let Some(text) = form.text else {
        return missing_field("text");
    };

    match state.deployment_info.fetch_for(&state.config, &text).await {
        Ok(info) => Json(info).into_response(),
        Err(
            error @ (CommandError::MissingEnvironment | CommandError::UnknownEnvironment { .. }),
        ) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": error.to_string() })),
        )
            .into_response(),
        Err(error) => {
            warn!(error = %error, "deployment info lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": error.to_string() })),
            )
                .into_response()
        },
    }
}

fn missing_field(field: &'static str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": format!("missing field `{field}`") })),
    )
        .into_response()
}
