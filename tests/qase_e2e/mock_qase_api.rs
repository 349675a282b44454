//! Mock Qase API for E2E tests.
//!
//! Serves the case list, single case and single suite endpoints from in-memory
//! fixtures and records every request so tests can assert on call patterns.

use std::collections::{HashMap, HashSet};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, web};
use serde::Deserialize;
use serde_json::{Value, json};

/// Mutable fixture and request log shared with the server.
#[derive(Default)]
pub struct MockQaseState {
    pub cases: Vec<Value>,
    /// Overrides the `total` reported by the list endpoint
    pub total_override: Option<u64>,
    pub suites: HashMap<i64, Value>,
    /// Suite ids answered with HTTP 500
    pub failing_suites: HashSet<i64>,
    /// Tokens answered with HTTP 401 on every endpoint
    pub rejected_tokens: HashSet<String>,
    /// Answer suite requests with 401 regardless of token
    pub reject_suite_requests: bool,
    /// Answer the case list with HTTP 500
    pub fail_case_list: bool,
    /// Offset at which the list endpoint drops the `result` envelope
    pub drop_envelope_at_offset: Option<u64>,
    pub suite_delay: Duration,
    /// `(limit, offset)` of every case list request
    pub case_page_requests: Vec<(u64, u64)>,
    pub suite_requests: Vec<i64>,
    /// Suite requests currently being answered
    pub suites_in_flight: usize,
    /// Highest `suites_in_flight` observed
    pub peak_suites_in_flight: usize,
    pub tokens_seen: Vec<String>,
}

#[derive(Deserialize)]
struct PageQuery {
    limit: u64,
    offset: u64,
}

fn token_of(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Record the token and decide whether to reject the request.
fn check_token(state: &mut MockQaseState, req: &HttpRequest) -> Option<HttpResponse> {
    let Some(token) = token_of(req) else {
        return Some(HttpResponse::Unauthorized().json(json!({"status": false})));
    };
    state.tokens_seen.push(token.clone());
    if state.rejected_tokens.contains(&token) {
        return Some(HttpResponse::Unauthorized().json(json!({
            "status": false,
            "errorMessage": "API token not found"
        })));
    }
    None
}

#[get("/v1/case/{code}")]
async fn list_cases(
    req: HttpRequest,
    query: web::Query<PageQuery>,
    state: web::Data<Arc<Mutex<MockQaseState>>>,
) -> HttpResponse {
    let mut state = state.lock().unwrap();
    if let Some(rejection) = check_token(&mut state, &req) {
        return rejection;
    }
    state.case_page_requests.push((query.limit, query.offset));

    if state.fail_case_list {
        return HttpResponse::InternalServerError().finish();
    }
    if state.drop_envelope_at_offset == Some(query.offset) {
        return HttpResponse::Ok().json(json!({"status": false}));
    }

    let start = (query.offset as usize).min(state.cases.len());
    let end = (start + query.limit as usize).min(state.cases.len());
    let entities = &state.cases[start..end];
    let total = state
        .total_override
        .unwrap_or(state.cases.len() as u64);

    HttpResponse::Ok().json(json!({
        "status": true,
        "result": {
            "total": total,
            "filtered": total,
            "count": entities.len(),
            "entities": entities,
        }
    }))
}

#[get("/v1/case/{code}/{id}")]
async fn get_case(
    req: HttpRequest,
    path: web::Path<(String, i64)>,
    state: web::Data<Arc<Mutex<MockQaseState>>>,
) -> HttpResponse {
    let mut state = state.lock().unwrap();
    if let Some(rejection) = check_token(&mut state, &req) {
        return rejection;
    }
    let (_, case_id) = path.into_inner();

    let found = state
        .cases
        .iter()
        .find(|case| case["id"].as_i64() == Some(case_id))
        .cloned();

    match found {
        Some(mut case) => {
            case["description"] = json!(format!("Description of case {}", case_id));
            case["steps"] = json!([
                {"position": 1, "action": "Open the app", "expected_result": null, "data": null},
                {"position": 2, "action": "Log in", "expected_result": "Home is shown", "data": "user/pass"}
            ]);
            HttpResponse::Ok().json(json!({"status": true, "result": case}))
        }
        None => HttpResponse::Ok().json(json!({"status": false})),
    }
}

#[get("/v1/suite/{code}/{id}")]
async fn get_suite(
    req: HttpRequest,
    path: web::Path<(String, i64)>,
    state: web::Data<Arc<Mutex<MockQaseState>>>,
) -> HttpResponse {
    let (_, suite_id) = path.into_inner();

    let (delay, response) = {
        let mut state = state.lock().unwrap();
        state.suite_requests.push(suite_id);
        state.suites_in_flight += 1;
        state.peak_suites_in_flight = state.peak_suites_in_flight.max(state.suites_in_flight);
        let response = if let Some(rejection) = check_token(&mut state, &req) {
            rejection
        } else if state.reject_suite_requests {
            HttpResponse::Forbidden().finish()
        } else if state.failing_suites.contains(&suite_id) {
            HttpResponse::InternalServerError().finish()
        } else {
            match state.suites.get(&suite_id) {
                Some(suite) => HttpResponse::Ok().json(json!({"status": true, "result": suite})),
                None => HttpResponse::Ok().json(json!({"status": false})),
            }
        };
        (state.suite_delay, response)
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    state.lock().unwrap().suites_in_flight -= 1;
    response
}

/// Mock Qase API server bound to an ephemeral port.
pub struct MockQaseApi {
    pub api_base: String,
    pub state: Arc<Mutex<MockQaseState>>,
}

impl MockQaseApi {
    /// Start the mock with the given fixture.
    pub async fn start(initial: MockQaseState) -> Self {
        let state = Arc::new(Mutex::new(initial));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let api_base = format!("http://127.0.0.1:{}/v1", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(list_cases)
                .service(get_case)
                .service(get_suite)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        tokio::spawn(server);

        MockQaseApi { api_base, state }
    }

    /// Offsets of every case list request, in arrival order.
    pub fn case_offsets(&self) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .case_page_requests
            .iter()
            .map(|&(_, offset)| offset)
            .collect()
    }

    pub fn suite_requests(&self) -> Vec<i64> {
        self.state.lock().unwrap().suite_requests.clone()
    }

    /// Most suite requests that were ever answered at the same time.
    pub fn peak_suites_in_flight(&self) -> usize {
        self.state.lock().unwrap().peak_suites_in_flight
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockQaseState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

/// Qase list entity for a test case.
pub fn case_json(id: i64, suite_id: i64, automated: bool, status: i32, priority: i32) -> Value {
    json!({
        "id": id,
        "title": format!("Case {}", id),
        "suite_id": suite_id,
        "automation": if automated { 2 } else { 0 },
        "status": status,
        "priority": priority,
        "severity": 2,
        "type": 3,
        "behavior": 1,
        "steps": [],
    })
}

/// Qase suite entity.
pub fn suite_json(id: i64, title: &str, parent_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "title": title,
        "parent_id": parent_id,
        "description": null,
        "cases_count": 0,
    })
}
