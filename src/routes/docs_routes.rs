//! Documento OpenAPI y Swagger UI
//!
//! Se montan fuera de `/api`; el documento declara `/api` como servidor.

use axum::{response::Html, routing::get, Json, Router};
use serde_json::{json, Map, Value};

use crate::state::AppState;

pub fn create_docs_router() -> Router<AppState> {
    Router::new()
        .route("/openapi.json", get(openapi))
        .route("/swagger", get(swagger_ui))
}

async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_HTML)
}

/// (path, [(método, resumen)]) de cada ruta montada bajo `/api`
const API_ROUTES: &[(&str, &[(&str, &str)])] = &[
    ("/healthz", &[("get", "Healthcheck")]),
    ("/bootstrap", &[("get", "All seven collections in one read")]),
    ("/drivers", &[("get", "List drivers"), ("post", "Create driver")]),
    ("/drivers/{id}", &[("put", "Update driver"), ("delete", "Delete driver and its events")]),
    ("/drivers/{id}/stats", &[("get", "Driver safety stats")]),
    ("/drivers/{id}/assign-truck", &[("post", "Assign or unassign the driver's truck")]),
    ("/trucks", &[("get", "List trucks"), ("post", "Create truck")]),
    ("/trucks/{id}", &[("put", "Update truck"), ("delete", "Delete truck")]),
    ("/trucks/{id}/history", &[("get", "Truck history, newest first")]),
    ("/trucks/{id}/assign-driver", &[("post", "Assign a driver to the truck or release it")]),
    ("/driver-types", &[("get", "List driver types"), ("post", "Create driver type")]),
    ("/driver-types/{id}", &[("put", "Update driver type"), ("delete", "Delete driver type")]),
    ("/safety-categories", &[("get", "List safety categories"), ("post", "Create safety category")]),
    ("/safety-categories/{id}", &[("put", "Update safety category"), ("delete", "Delete safety category")]),
    ("/scorecard-metrics", &[("get", "List scorecard metrics"), ("post", "Create scorecard metric")]),
    ("/scorecard-metrics/{id}", &[("put", "Update scorecard metric"), ("delete", "Delete scorecard metric")]),
    ("/safety-events", &[("get", "List safety events"), ("post", "Log safety event")]),
    ("/safety-events/{id}", &[("put", "Correct event date and notes"), ("delete", "Delete safety event")]),
    ("/scorecard-events", &[("get", "List scorecard events")]),
    (
        "/scorecard-grades",
        &[
            ("get", "Grade sheet for driver, month and category"),
            ("put", "Replace the grade sheet"),
            ("delete", "Delete the grade sheet"),
        ],
    ),
];

pub fn openapi_document() -> Value {
    let paths: Map<String, Value> = API_ROUTES
        .iter()
        .map(|(path, operations)| {
            let operations: Map<String, Value> = operations
                .iter()
                .map(|(method, summary)| (method.to_string(), json!({ "summary": summary })))
                .collect();
            (path.to_string(), Value::Object(operations))
        })
        .collect();

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Driver Safety API",
            "version": env!("CARGO_PKG_VERSION")
        },
        "servers": [{ "url": "/api" }],
        "paths": paths
    })
}

const SWAGGER_HTML: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Driver Safety API Docs</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"/>
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"></script>
<script>
window.onload = () => {
  SwaggerUIBundle({ url: '/openapi.json', dom_id: '#swagger-ui' });
};
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_item_routes() {
        let doc = openapi_document();
        let paths = doc["paths"].as_object().unwrap();
        assert_eq!(paths.len(), 20);
        assert!(paths["/safety-events/{id}"]["put"].is_object());
        assert!(paths["/scorecard-grades"]["delete"].is_object());
        assert_eq!(doc["servers"][0]["url"], "/api");
    }
}
