use axum::extract::Query;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GreetingQuery {
    pub name: Option<String>,
}

/// Trivial greeting endpoint, unrelated to the transfer workflows.
/// GET /api/HttpExample, GET /api/HttpTrigger
pub async fn hello(Query(query): Query<GreetingQuery>) -> String {
    match query.name.as_deref() {
        Some(name) if !name.is_empty() => {
            format!(
                "Hello, {}. This HTTP triggered function executed successfully.\n",
                name
            )
        }
        _ => "This HTTP triggered function executed successfully. \
              Pass a name in the query string for a personalized response.\n"
            .to_string(),
    }
}
