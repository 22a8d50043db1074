use crate::calculi;
use crate::error::{CalculusError, Result};
use crate::statistics::Statistics;
use crossbeam_utils::thread;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use spin::Mutex;
use std::io::Read;
use std::iter::Enumerate;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::slice::Iter;

type Queue<'a> = Mutex<Enumerate<Iter<'a, String>>>;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum Action {
    Parse {
        formula: String,
        #[serde(default)]
        params: Option<Value>,
    },
    Move {
        state: Value,
        #[serde(rename = "move")]
        mv: Value,
    },
    Close {
        state: Value,
    },
}

#[derive(Debug, Deserialize)]
struct Request {
    calculus: String,
    #[serde(flatten)]
    action: Action,
}

// states, moves and params may arrive either as objects or as JSON text
fn embedded(value: Value) -> String {
    match value {
        Value::String(json) => json,
        other => other.to_string(),
    }
}

/// Handle one JSON-lines request, producing the calculus result as JSON.
pub fn handle(line: &str) -> Result<Value> {
    let request: Request = serde_json::from_str(line).map_err(|e| {
        CalculusError::JsonParse(format!("Could not parse JSON request: {}", e))
    })?;
    let calculus = request.calculus.as_str();
    debug!("{}: {:?}", calculus, request.action);
    let result = match request.action {
        Action::Parse { formula, params } => {
            let params = params.filter(|params| !params.is_null()).map(embedded);
            calculi::parse(calculus, &formula, params.as_deref())?
        }
        Action::Move { state, mv } => {
            calculi::apply_move(calculus, &embedded(state), &embedded(mv))?
        }
        Action::Close { state } => calculi::check_close(calculus, &embedded(state))?,
    };
    serde_json::from_str(&result).map_err(|e| {
        CalculusError::JsonParse(format!("Could not parse JSON result: {}", e))
    })
}

pub fn respond(result: Result<Value>) -> String {
    let response = match result {
        Ok(result) => json!({ "ok": true, "result": result }),
        Err(error) => json!({
            "ok": false,
            "error": {
                "kind": error.kind(),
                "message": error.to_string(),
            }
        }),
    };
    response.to_string()
}

// a panic answers its own request instead of taking the batch down
fn guarded<F: FnOnce() -> Result<Value>>(handler: F) -> Result<Value> {
    panic::catch_unwind(AssertUnwindSafe(handler)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|reason| reason.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        Err(illegal_move!("Internal error while handling request: {}", reason))
    })
}

fn task(queue: &Queue, responses: &Mutex<Vec<String>>, statistics: &Statistics) {
    loop {
        let next = queue.lock().next();
        let (index, line) = match next {
            Some(next) => next,
            None => return,
        };
        statistics.increment_requests();
        let result = guarded(|| handle(line));
        match &result {
            Ok(_) => statistics.increment_accepted(),
            Err(error) => {
                warn!("request {} rejected: {}: {}", index + 1, error.kind(), error);
                statistics.increment_rejected();
            }
        }
        responses.lock()[index] = respond(result);
    }
}

/// Answer every request on up to `jobs` worker threads.
/// Responses come back in request order.
pub fn process(requests: &[String], jobs: usize, statistics: &Statistics) -> Vec<String> {
    let queue = Mutex::new(requests.iter().enumerate());
    let responses = Mutex::new(vec![String::new(); requests.len()]);
    let jobs = jobs.max(1).min(requests.len().max(1));
    thread::scope(|scope| {
        for index in 0..jobs {
            scope
                .builder()
                .name(format!("worker-{}", index))
                .spawn(|_| task(&queue, &responses, statistics))
                .expect("failed to spawn worker thread");
        }
    })
    .unwrap_or_else(|_| panic!("thread crashed"));
    responses.into_inner()
}

/// Non-empty request lines from `path`, or stdin if absent.
pub fn read_requests(path: Option<&Path>) -> std::io::Result<Vec<String>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let requests = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    Ok(requests)
}
