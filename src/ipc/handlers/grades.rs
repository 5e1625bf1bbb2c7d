use crate::db::{GradeRecord, Store, SubjectAverage, SummaryStats};
use crate::form::{format_overall_average, format_score, parse_grade_form};
use crate::ipc::error::{db_query_failed, err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub(crate) fn record_json(r: &GradeRecord) -> serde_json::Value {
    json!({
        "id": r.id,
        "studentName": r.student_name,
        "email": r.email,
        "class": r.class,
        "division": r.division,
        "rollNumber": r.roll_number,
        "subject": r.subject,
        "score": r.score,
        "scoreDisplay": format_score(r.score)
    })
}

pub(crate) fn summary_json(s: &SummaryStats) -> serde_json::Value {
    json!({
        "totalRecords": s.total_records,
        "overallAverage": s.overall_average,
        "uniqueStudents": s.unique_students,
        "display": {
            "totalRecords": s.total_records.to_string(),
            "overallAverage": format_overall_average(s.overall_average),
            "uniqueStudents": s.unique_students.to_string()
        }
    })
}

pub(crate) fn subjects_json(avgs: &[SubjectAverage]) -> Vec<serde_json::Value> {
    avgs.iter()
        .map(|a| {
            json!({
                "subject": a.subject,
                "average": a.average,
                "label": format_score(a.average)
            })
        })
        .collect()
}

/// `search` absent, null or "" lists everything.
pub(crate) fn load_records(
    store: &Store,
    params: &serde_json::Value,
) -> anyhow::Result<Vec<GradeRecord>> {
    match params.get("search").and_then(|v| v.as_str()) {
        Some(term) if !term.is_empty() => store.list_matching(term),
        _ => store.list_all(),
    }
}

fn handle_grades_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_workspace(&req.id);
    };

    let rec = match parse_grade_form(&req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    match store.insert(&rec) {
        Ok(created) => ok(&req.id, json!({ "record": record_json(&created) })),
        Err(e) => {
            tracing::warn!(error = ?e, "grade insert failed");
            err(
                &req.id,
                "db_insert_failed",
                "Failed to save record.",
                Some(json!({ "table": "grades", "cause": format!("{e:#}") })),
            )
        }
    }
}

fn handle_grades_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_workspace(&req.id);
    };

    match load_records(store, &req.params) {
        Ok(records) => {
            let rows: Vec<serde_json::Value> = records.iter().map(record_json).collect();
            ok(&req.id, json!({ "records": rows, "count": rows.len() }))
        }
        Err(e) => db_query_failed(&req.id, &e),
    }
}

fn handle_grades_subject_averages(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_workspace(&req.id);
    };

    match store.average_score_by_subject() {
        Ok(avgs) => ok(&req.id, json!({ "subjects": subjects_json(&avgs) })),
        Err(e) => db_query_failed(&req.id, &e),
    }
}

fn handle_grades_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_workspace(&req.id);
    };

    match store.summary_statistics() {
        Ok(s) => ok(&req.id, summary_json(&s)),
        Err(e) => db_query_failed(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.add" => Some(handle_grades_add(state, req)),
        "grades.list" => Some(handle_grades_list(state, req)),
        "grades.subjectAverages" => Some(handle_grades_subject_averages(state, req)),
        "grades.summary" => Some(handle_grades_summary(state, req)),
        _ => None,
    }
}
