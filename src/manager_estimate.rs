use log::{error, info, warn};
use crate::initialization::Config;
use crate::manager_pvwatts::models::{message_text, PvWattsResponse};
use crate::manager_pvwatts::PvWatts;
use crate::models::{ErrorKind, EstimateError, NormalizedInput, ProductionEstimate, UserInput};

pub const MIN_PANEL_COUNT: u32 = 1;
pub const MIN_PANEL_WATTS: u32 = 100;
const NO_DATA_MESSAGE: &str = "No data returned. Try different coordinates.";

/// Runs one estimate for the given user input
///
/// Every failure along the way ends up as an error outcome, nothing is cached between calls.
///
/// # Arguments
///
/// * 'config' - application configuration
/// * 'input' - the values submitted by the user
pub async fn run_estimate(config: &Config, input: &UserInput) -> ProductionEstimate {
    let normalized = match normalize(input) {
        Ok(n) => n,
        Err(e) => {
            warn!("rejected input {:?}: {}", input, e.message);
            return ProductionEstimate::Failure(e);
        }
    };
    info!("estimating lat={} lon={} capacity={} kW", normalized.lat, normalized.lon, normalized.capacity_kw);

    let response = match PvWatts::new(&config.pvwatts) {
        Ok(pvwatts) => pvwatts.get_production(&normalized, &config.array).await,
        Err(e) => Err(e),
    };

    let estimate = match response {
        Ok(res) => interpret(&res, &normalized),
        Err(e) => {
            error!("production request failed: {}", e);
            ProductionEstimate::Failure(EstimateError::exception(&e.to_string()))
        }
    };

    match &estimate {
        ProductionEstimate::Success { annual_ac_kwh, .. } => info!("estimated {} kWh per year", annual_ac_kwh),
        ProductionEstimate::Failure(e) => warn!("no estimate: {}", e),
    }

    estimate
}

/// Rounds coordinates to two decimals and derives system capacity in kW
///
/// Coordinates are not range checked, that is left to the production API. Only the
/// minimums the input form enforces are checked.
///
/// # Arguments
///
/// * 'input' - the values submitted by the user
pub fn normalize(input: &UserInput) -> Result<NormalizedInput, EstimateError> {
    if !input.lat.is_finite() || !input.lon.is_finite() {
        return Err(EstimateError::exception("latitude and longitude must be numbers"));
    }
    if input.panel_count < MIN_PANEL_COUNT {
        return Err(EstimateError::exception(&format!("number of panels must be at least {}", MIN_PANEL_COUNT)));
    }
    if input.panel_watts < MIN_PANEL_WATTS {
        return Err(EstimateError::exception(&format!("panel wattage must be at least {}", MIN_PANEL_WATTS)));
    }

    let watts = input.panel_count as f64 * input.panel_watts as f64;

    Ok(NormalizedInput {
        lat: round2(input.lat)?,
        lon: round2(input.lon)?,
        capacity_kw: round2(watts / 1000.0)?,
    })
}

/// Decides the outcome from a production API response
///
/// # Arguments
///
/// * 'response' - parsed response from the API
/// * 'input' - the normalized input the request was made with
pub fn interpret(response: &PvWattsResponse, input: &NormalizedInput) -> ProductionEstimate {
    if let Some(first) = response.errors.first() {
        return ProductionEstimate::Failure(EstimateError::new(ErrorKind::ApiError, &message_text(first)));
    }

    match response.outputs.as_ref().and_then(|o| o.ac_annual) {
        Some(ac_annual) if ac_annual > 0.0 => ProductionEstimate::Success { annual_ac_kwh: ac_annual, input: input.clone() },
        _ => ProductionEstimate::Failure(EstimateError::new(ErrorKind::NoData, NO_DATA_MESSAGE)),
    }
}

/// Rounds to two decimals, ties going to the even digit of the exact binary value
fn round2(value: f64) -> Result<f64, EstimateError> {
    format!("{:.2}", value)
        .parse::<f64>()
        .map_err(|e| EstimateError::exception(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::{General, PvWattsConfig, WebServer};
    use crate::manager_pvwatts::models::ArraySetup;
    use std::net::TcpListener;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_input(lat: f64, lon: f64, panel_count: u32, panel_watts: u32) -> UserInput {
        UserInput { lat, lon, panel_count, panel_watts }
    }

    fn default_normalized() -> NormalizedInput {
        NormalizedInput { lat: 26.91, lon: 75.78, capacity_kw: 11.0 }
    }

    fn interpret_json(json: &str) -> ProductionEstimate {
        let response: PvWattsResponse = serde_json::from_str(json).unwrap();
        interpret(&response, &default_normalized())
    }

    /// Returns a url to a port that was just released, so connecting to it is refused
    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        format!("http://127.0.0.1:{}/api", port)
    }

    fn config(api_url: &str) -> Config {
        Config {
            web_server: WebServer { bind_address: "127.0.0.1".to_string(), bind_port: 0 },
            pvwatts: PvWattsConfig { api_url: api_url.to_string(), api_key: "test-key".to_string(), timeout_secs: 5 },
            array: ArraySetup::default(),
            general: General::default(),
        }
    }

    #[test]
    fn capacity_from_default_form() {
        let n = normalize(&UserInput::default()).unwrap();

        assert_eq!(n, NormalizedInput { lat: 26.91, lon: 75.78, capacity_kw: 11.0 });
    }

    #[test]
    fn capacity_rounds_to_two_decimals() {
        assert_eq!(normalize(&user_input(0.0, 0.0, 3, 333)).unwrap().capacity_kw, 1.0);
        assert_eq!(normalize(&user_input(0.0, 0.0, 2, 1234)).unwrap().capacity_kw, 2.47);
        assert_eq!(normalize(&user_input(0.0, 0.0, 1, 100)).unwrap().capacity_kw, 0.1);
    }

    #[test]
    fn capacity_ties_round_to_even() {
        assert_eq!(normalize(&user_input(0.0, 0.0, 3, 375)).unwrap().capacity_kw, 1.12);
        assert_eq!(normalize(&user_input(0.0, 0.0, 25, 545)).unwrap().capacity_kw, 13.62);
    }

    #[test]
    fn normalize_is_deterministic() {
        let input = user_input(12.3456, -45.6789, 13, 415);

        assert_eq!(normalize(&input).unwrap(), normalize(&input).unwrap());
    }

    #[test]
    fn coordinates_round_to_two_decimals() {
        let n = normalize(&user_input(26.914, -75.786, 1, 100)).unwrap();

        assert_eq!(n.lat, 26.91);
        assert_eq!(n.lon, -75.79);

        let n = normalize(&user_input(10.125, -10.125, 1, 100)).unwrap();

        assert_eq!(n.lat, 10.12);
        assert_eq!(n.lon, -10.12);
    }

    #[test]
    fn out_of_range_coordinates_pass_through() {
        let n = normalize(&user_input(123.0, -200.0, 1, 100)).unwrap();

        assert_eq!((n.lat, n.lon), (123.0, -200.0));
    }

    #[test]
    fn form_minimums_are_enforced() {
        let e = normalize(&user_input(0.0, 0.0, 0, 550)).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Exception);

        let e = normalize(&user_input(0.0, 0.0, 20, 99)).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Exception);

        assert!(normalize(&user_input(f64::NAN, 0.0, 20, 550)).is_err());
    }

    #[test]
    fn api_error_uses_first_message() {
        let estimate = interpret_json(r#"{"errors":["bad location","bad capacity"]}"#);

        assert_eq!(estimate, ProductionEstimate::Failure(EstimateError::new(ErrorKind::ApiError, "bad location")));
    }

    #[test]
    fn api_error_wins_over_outputs() {
        let estimate = interpret_json(r#"{"errors":["bad location"],"outputs":{"ac_annual":15000}}"#);

        assert!(matches!(estimate, ProductionEstimate::Failure(EstimateError { kind: ErrorKind::ApiError, .. })));
    }

    #[test]
    fn non_string_api_error_is_given_as_json() {
        let estimate = interpret_json(r#"{"errors":[{"code":1}]}"#);

        assert_eq!(estimate, ProductionEstimate::Failure(EstimateError::new(ErrorKind::ApiError, r#"{"code":1}"#)));
    }

    #[test]
    fn positive_output_is_success() {
        let estimate = interpret_json(r#"{"errors":[],"outputs":{"ac_annual":15000}}"#);

        assert_eq!(estimate, ProductionEstimate::Success { annual_ac_kwh: 15000.0, input: default_normalized() });
    }

    #[test]
    fn zero_output_or_empty_document_is_no_data() {
        for json in [r#"{"outputs":{"ac_annual":0}}"#, "{}", r#"{"outputs":{}}"#, r#"{"outputs":{"ac_annual":-3.5}}"#] {
            let estimate = interpret_json(json);

            assert_eq!(
                estimate,
                ProductionEstimate::Failure(EstimateError::new(ErrorKind::NoData, NO_DATA_MESSAGE)),
                "{}", json
            );
        }
    }

    #[tokio::test]
    async fn run_estimate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"outputs":{"ac_annual":16872.61}}"#))
            .mount(&server)
            .await;

        let estimate = run_estimate(&config(&server.uri()), &UserInput::default()).await;

        assert_eq!(estimate, ProductionEstimate::Success { annual_ac_kwh: 16872.61, input: default_normalized() });
    }

    #[tokio::test]
    async fn success_carries_the_input_sent_to_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("lat", "10.12"))
            .and(query_param("system_capacity", "1.12"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"outputs":{"ac_annual":1500}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let estimate = run_estimate(&config(&server.uri()), &user_input(10.125, 75.78, 3, 375)).await;

        let sent = NormalizedInput { lat: 10.12, lon: 75.78, capacity_kw: 1.12 };
        assert_eq!(estimate, ProductionEstimate::Success { annual_ac_kwh: 1500.0, input: sent });
        server.verify().await;
    }

    #[tokio::test]
    async fn malformed_json_is_exception() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"outputs\":"))
            .mount(&server)
            .await;

        let estimate = run_estimate(&config(&server.uri()), &UserInput::default()).await;

        assert!(matches!(estimate, ProductionEstimate::Failure(EstimateError { kind: ErrorKind::Exception, .. })));
    }

    #[tokio::test]
    async fn connection_refused_is_exception() {
        let estimate = run_estimate(&config(&closed_port_url()), &UserInput::default()).await;

        match estimate {
            ProductionEstimate::Failure(e) => {
                assert_eq!(e.kind, ErrorKind::Exception);
                assert!(!e.message.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn identical_inputs_make_separate_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"outputs":{"ac_annual":15000}}"#))
            .expect(2)
            .mount(&server)
            .await;

        let config = config(&server.uri());
        run_estimate(&config, &UserInput::default()).await;
        run_estimate(&config, &UserInput::default()).await;

        server.verify().await;
    }

    #[tokio::test]
    async fn invalid_input_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(0)
            .mount(&server)
            .await;

        let estimate = run_estimate(&config(&server.uri()), &user_input(26.91, 75.78, 0, 550)).await;

        assert!(matches!(estimate, ProductionEstimate::Failure(EstimateError { kind: ErrorKind::Exception, .. })));
        server.verify().await;
    }
}
