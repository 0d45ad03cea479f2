use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::error;
use serde::Serialize;
use crate::AppState;
use crate::chart::{format_kwh, report_chart, screen_chart, BarChart};
use crate::manager_estimate::run_estimate;
use crate::models::{ErrorKind, EstimateError, NormalizedInput, ProductionEstimate, UserInput};
use crate::report::{render_report, REPORT_FILE_NAME, REPORT_MIME_TYPE};

/// Shown with every successful estimate, a fixed figure not derived from the response
pub const BOOST_NOTE: &str = "~20% boost vs flat-mount, per NREL standard";

#[derive(Serialize)]
struct ReportFile {
    filename: &'static str,
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum EstimateView {
    Success {
        annual_ac_kwh: f64,
        headline: String,
        note: &'static str,
        chart: BarChart,
        report: ReportFile,
    },
    Error {
        #[serde(flatten)]
        error: EstimateError,
        banner: String,
    },
}

#[get("/estimate")]
pub async fn get_estimate(data: web::Data<AppState>, params: web::Query<UserInput>) -> impl Responder {
    let estimate = run_estimate(&data.config, &params).await;

    HttpResponse::Ok().json(estimate_view(estimate))
}

/// Query extraction config answering malformed form values the same way as other errors
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let view = error_view(EstimateError::exception(&err.to_string()));
    let response = HttpResponse::BadRequest().json(view);

    InternalError::from_response(err, response).into()
}

/// Turns an estimate into what the page shows, charts and report only for a success
///
/// # Arguments
///
/// * 'estimate' - outcome of the workflow
fn estimate_view(estimate: ProductionEstimate) -> EstimateView {
    match estimate {
        ProductionEstimate::Failure(e) => error_view(e),
        ProductionEstimate::Success { annual_ac_kwh, input } => {
            success_view(annual_ac_kwh, &input).unwrap_or_else(|e| {
                error!("unable to produce report: {}", e);
                error_view(e)
            })
        }
    }
}

/// Wraps an error with the line shown in the page banner
fn error_view(error: EstimateError) -> EstimateView {
    let banner = match error.kind {
        ErrorKind::ApiError => format!("API Error: {}", error.message),
        _ => format!("Error: {}", error.message),
    };

    EstimateView::Error { error, banner }
}

fn success_view(annual_ac_kwh: f64, input: &NormalizedInput) -> Result<EstimateView, EstimateError> {
    let pdf = render_report(&report_chart(annual_ac_kwh), input)
        .map_err(|e| EstimateError::exception(&e.to_string()))?;

    Ok(EstimateView::Success {
        annual_ac_kwh,
        headline: format!("Estimated Annual Output: {}", format_kwh(annual_ac_kwh)),
        note: BOOST_NOTE,
        chart: screen_chart(annual_ac_kwh),
        report: ReportFile {
            filename: REPORT_FILE_NAME,
            mime_type: REPORT_MIME_TYPE,
            data: STANDARD.encode(pdf),
        },
    })
}
