use crate::ipc::error::{db_query_failed, no_workspace, ok};
use crate::ipc::handlers::grades::{load_records, record_json, subjects_json, summary_json};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

// Same order as a UI refresh: KPIs, then the (optionally filtered) list, then chart data.
fn handle_dashboard_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_workspace(&req.id);
    };

    let summary = match store.summary_statistics() {
        Ok(s) => s,
        Err(e) => return db_query_failed(&req.id, &e),
    };
    let records = match load_records(store, &req.params) {
        Ok(v) => v,
        Err(e) => return db_query_failed(&req.id, &e),
    };
    let subjects = match store.average_score_by_subject() {
        Ok(v) => v,
        Err(e) => return db_query_failed(&req.id, &e),
    };

    let rows: Vec<serde_json::Value> = records.iter().map(record_json).collect();
    ok(
        &req.id,
        json!({
            "summary": summary_json(&summary),
            "records": rows,
            "chart": {
                "title": "Subject Average Scores (%)",
                "yMax": crate::form::SCORE_MAX,
                "subjects": subjects_json(&subjects)
            }
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.open" => Some(handle_dashboard_open(state, req)),
        _ => None,
    }
}
