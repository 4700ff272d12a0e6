use crate::data::{SchedulingInput, TimetableOutput};
use crate::error::ScheduleError;
use crate::solver;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};

fn error_response(e: ScheduleError) -> (StatusCode, String) {
    let status = match e {
        ScheduleError::MissingCriticalData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScheduleError::Infeasible | ScheduleError::Timeout => StatusCode::CONFLICT,
        ScheduleError::Solver(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

async fn solve_handler(
    Json(input): Json<SchedulingInput>,
) -> Result<Json<TimetableOutput>, (StatusCode, String)> {
    match solver::solve(&input) {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err(error_response(e)),
    }
}

/// Same pipeline, rendered as flat delimited text for spreadsheet import.
async fn solve_csv_handler(
    Json(input): Json<SchedulingInput>,
) -> Result<String, (StatusCode, String)> {
    match solver::solve(&input) {
        Ok(output) => Ok(output.to_delimited()),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn run_server() {
    let app = Router::new()
        .route("/v1/timetable/solve", post(solve_handler))
        .route("/v1/timetable/solve/csv", post(solve_csv_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
