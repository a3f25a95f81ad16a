//! Admin web surface.
//!
//! One route pair: GET renders the content language settings form (HTML by
//! default, the raw form descriptor as JSON with `?format=json`), POST
//! applies a submission and redirects back with a success or error flash.
//! The page is self-contained; the small inline script only mirrors the
//! toggle checkboxes into section visibility.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::form::{build_settings_form, FormDescriptor, TOGGLE_GROUP_NAME};
use crate::metadata::EntityMetadata;
use crate::security::admin_key_matches;
use crate::settings::SITE_DEFAULT_LANGCODE;
use crate::store::ConfigStore;
use crate::submit::{apply_submission, SubmittedValues};

/// Header carrying the admin key when one is configured.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Path of the settings form, mirroring the reference admin route.
pub const SETTINGS_PATH: &str = "/admin/config/language/content";

/// Shared state behind the admin routes.
#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<dyn EntityMetadata>,
    pub store: Arc<dyn ConfigStore>,
    /// Langcodes offered by the selector besides `site_default`.
    pub assignable_langcodes: Vec<String>,
    pub admin_api_key: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            SETTINGS_PATH,
            get(show_settings_form).post(submit_settings_form),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct FormPageQuery {
    format: Option<String>,
    saved: Option<u8>,
    error: Option<u8>,
}

async fn show_settings_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FormPageQuery>,
) -> Response {
    if let Some(denied) = check_admin_key(&state, &headers) {
        return denied;
    }

    let current = match state.store.all() {
        Ok(current) => current,
        Err(e) => {
            error!(error = %e, "Failed to read current language settings");
            return internal_error();
        }
    };
    let form = match build_settings_form(state.metadata.as_ref(), &current) {
        Ok(form) => form,
        Err(e) => {
            error!(error = %e, "Failed to build language settings form");
            return internal_error();
        }
    };

    if query.format.as_deref() == Some("json") {
        return Json(form).into_response();
    }

    let flash = if query.saved == Some(1) {
        Some(Flash::Saved)
    } else if query.error == Some(1) {
        Some(Flash::Error)
    } else {
        None
    };
    Html(render_form_page(&form, &state.assignable_langcodes, flash)).into_response()
}

async fn submit_settings_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    if let Some(denied) = check_admin_key(&state, &headers) {
        return denied;
    }

    let submitted =
        SubmittedValues::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    match apply_submission(&submitted, state.store.as_ref()) {
        Ok(committed) => {
            info!(records = committed.len(), "Settings successfully updated");
            Redirect::to(&format!("{SETTINGS_PATH}?saved=1")).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to save language settings");
            Redirect::to(&format!("{SETTINGS_PATH}?error=1")).into_response()
        }
    }
}

fn check_admin_key(state: &AppState, headers: &HeaderMap) -> Option<Response> {
    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if admin_key_matches(state.admin_api_key.as_deref(), provided) {
        None
    } else {
        Some((StatusCode::UNAUTHORIZED, "unauthorized").into_response())
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "The settings form is unavailable.",
    )
        .into_response()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flash {
    Saved,
    Error,
}

/// Single user-visible acknowledgment from the previous submission.
const SAVED_MESSAGE: &str = "Settings successfully updated.";
const ERROR_MESSAGE: &str = "The settings could not be saved. Please try again.";

fn render_form_page(
    form: &FormDescriptor,
    assignable_langcodes: &[String],
    flash: Option<Flash>,
) -> String {
    let mut page = String::with_capacity(4096);
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<title>Content language</title>\n</head>\n<body>\n");
    page.push_str("<h1>Content language</h1>\n");

    match flash {
        Some(Flash::Saved) => {
            page.push_str(&format!(
                "<div class=\"messages status\">{}</div>\n",
                SAVED_MESSAGE
            ));
        }
        Some(Flash::Error) => {
            page.push_str(&format!(
                "<div class=\"messages error\">{}</div>\n",
                ERROR_MESSAGE
            ));
        }
        None => {}
    }

    page.push_str(&format!(
        "<form method=\"post\" action=\"{}\">\n",
        SETTINGS_PATH
    ));

    // Toggle group
    page.push_str(&format!(
        "<fieldset id=\"edit-{}\">\n<legend>{}</legend>\n",
        TOGGLE_GROUP_NAME,
        escape_html(&form.toggle.title)
    ));
    for option in &form.toggle.options {
        let checked = if option.checked { " checked" } else { "" };
        page.push_str(&format!(
            "<label><input type=\"checkbox\" class=\"entity-type-toggle\" \
             name=\"{group}[{id}]\" value=\"{id}\" data-section=\"edit-settings-{id}\"{checked}> \
             {label}</label>\n",
            group = TOGGLE_GROUP_NAME,
            id = escape_html(&option.entity_type),
            checked = checked,
            label = escape_html(&option.label),
        ));
    }
    page.push_str("</fieldset>\n");

    // Per-entity-type sections
    for section in &form.sections {
        let hidden = if form
            .toggle
            .options
            .iter()
            .any(|o| o.entity_type == section.entity_type && o.checked)
        {
            ""
        } else {
            " hidden"
        };
        page.push_str(&format!(
            "<fieldset id=\"edit-settings-{id}\"{hidden}>\n<legend>{title}</legend>\n\
             <table>\n<thead><tr><th>{bundle_label}</th><th>Default language</th>\
             <th>Show language selector</th></tr></thead>\n<tbody>\n",
            id = escape_html(&section.entity_type),
            hidden = hidden,
            title = escape_html(&section.title),
            bundle_label = escape_html(&section.bundle_label),
        ));

        for row in &section.rows {
            let field_base = format!(
                "settings[{}][{}][settings][language]",
                section.entity_type, row.bundle
            );
            page.push_str("<tr>\n");
            page.push_str(&format!("<td>{}</td>\n", escape_html(&row.label)));

            // langcode select
            page.push_str(&format!(
                "<td><select name=\"{}[langcode]\">\n",
                escape_html(&field_base)
            ));
            page.push_str(&langcode_option(
                SITE_DEFAULT_LANGCODE,
                "Site's default language",
                &row.settings.langcode,
            ));
            for langcode in assignable_langcodes {
                page.push_str(&langcode_option(langcode, langcode, &row.settings.langcode));
            }
            page.push_str("</select></td>\n");

            // language_show checkbox, with a hidden 0 so the field is
            // always present in the submission
            let checked = if row.settings.language_show {
                " checked"
            } else {
                ""
            };
            page.push_str(&format!(
                "<td><input type=\"hidden\" name=\"{base}[language_show]\" value=\"0\">\
                 <input type=\"checkbox\" name=\"{base}[language_show]\" value=\"1\"{checked}></td>\n",
                base = escape_html(&field_base),
                checked = checked,
            ));
            page.push_str("</tr>\n");
        }
        page.push_str("</tbody>\n</table>\n</fieldset>\n");
    }

    page.push_str("<button type=\"submit\">Save</button>\n</form>\n");
    page.push_str(
        "<script>\n\
         document.querySelectorAll('.entity-type-toggle').forEach(function (toggle) {\n\
           var section = document.getElementById(toggle.dataset.section);\n\
           if (!section) { return; }\n\
           var sync = function () { section.hidden = !toggle.checked; };\n\
           toggle.addEventListener('change', sync);\n\
           sync();\n\
         });\n\
         </script>\n",
    );
    page.push_str("</body>\n</html>\n");
    page
}

fn langcode_option(value: &str, label: &str, selected_value: &str) -> String {
    let selected = if value == selected_value {
        " selected"
    } else {
        ""
    };
    format!(
        "<option value=\"{}\"{}>{}</option>\n",
        escape_html(value),
        selected,
        escape_html(label)
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
