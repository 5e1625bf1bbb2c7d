use crate::db::NewGradeRecord;
use crate::ipc::error::HandlerErr;
use serde_json::json;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Text fields take strings or bare numbers (`"class": 8`). Any other JSON
/// type is recorded in `invalid`.
fn text_param(
    params: &serde_json::Value,
    key: &'static str,
    invalid: &mut Vec<&'static str>,
) -> Option<String> {
    match params.get(key) {
        Some(serde_json::Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        None | Some(serde_json::Value::Null) => None,
        Some(_) => {
            invalid.push(key);
            None
        }
    }
}

/// Scores arrive either as JSON numbers or as the raw text of an entry box.
enum RawScore {
    Number(f64),
    Text(String),
}

fn score_param(
    params: &serde_json::Value,
    invalid: &mut Vec<&'static str>,
) -> Option<RawScore> {
    match params.get("score") {
        Some(serde_json::Value::Number(n)) => n.as_f64().map(RawScore::Number),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(RawScore::Text(s.to_string()))
            }
        }
        None | Some(serde_json::Value::Null) => None,
        Some(_) => {
            invalid.push("score");
            None
        }
    }
}

/// Validates a grade entry form into a record ready for the store.
pub fn parse_grade_form(params: &serde_json::Value) -> Result<NewGradeRecord, HandlerErr> {
    let mut invalid: Vec<&str> = Vec::new();
    let student_name = text_param(params, "studentName", &mut invalid);
    let email = text_param(params, "email", &mut invalid);
    let class = text_param(params, "class", &mut invalid);
    let division = text_param(params, "division", &mut invalid);
    let roll_number = text_param(params, "rollNumber", &mut invalid);
    let subject = text_param(params, "subject", &mut invalid);
    let raw_score = score_param(params, &mut invalid);

    if !invalid.is_empty() {
        return Err(HandlerErr::bad_params(
            "Fields must be text or numbers.",
            json!({ "invalid": invalid }),
        ));
    }

    let mut missing: Vec<&str> = Vec::new();
    if student_name.is_none() {
        missing.push("studentName");
    }
    if class.is_none() {
        missing.push("class");
    }
    if division.is_none() {
        missing.push("division");
    }
    if subject.is_none() {
        missing.push("subject");
    }
    if raw_score.is_none() {
        missing.push("score");
    }

    let (Some(student_name), Some(class), Some(division), Some(subject), Some(raw_score)) =
        (student_name, class, division, subject, raw_score)
    else {
        return Err(HandlerErr::bad_params(
            "Name, Class, Division, Subject, and Score are required fields.",
            json!({ "missing": missing }),
        ));
    };

    let score = match raw_score {
        RawScore::Number(v) => v,
        RawScore::Text(s) => s.parse::<f64>().map_err(|_| {
            HandlerErr::bad_params("Score must be a valid number.", json!({ "score": s }))
        })?,
    };
    if !score.is_finite() {
        return Err(HandlerErr::bad_params(
            "Score must be a valid number.",
            json!({ "score": score.to_string() }),
        ));
    }
    if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err(HandlerErr::bad_params(
            "Score must be a numerical value between 0 and 100.",
            json!({ "score": score }),
        ));
    }

    Ok(NewGradeRecord {
        student_name,
        email,
        class,
        division,
        roll_number,
        subject,
        score,
    })
}

pub fn format_score(score: f64) -> String {
    format!("{score:.1}")
}

pub fn format_overall_average(avg: f64) -> String {
    if avg > 0.0 {
        format!("{avg:.1} %")
    } else {
        "0.0 %".to_string()
    }
}
