use cpi_forecast::error::ForecastError;
use cpi_forecast::utils::parse_iso_date;
use inflation_math::MathError;

#[test]
fn test_error_conversion() {
    let math_error = MathError::InsufficientData("need more points".to_string());
    let forecast_error = ForecastError::from(math_error.clone());

    match forecast_error {
        ForecastError::Math(inner) => assert_eq!(inner, math_error),
        other => panic!("Expected Math variant, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidHorizon(-3);
    let error_string = format!("{}", error);
    assert!(error_string.contains("-3"));
    assert!(error_string.contains("at least 1 month"));

    let error = ForecastError::DataUnavailable("FRED returned HTTP 500".to_string());
    assert_eq!(error.to_string(), "Data unavailable: FRED returned HTTP 500");

    let error = ForecastError::from(MathError::InvalidInput("lag must be positive".to_string()));
    let error_string = error.to_string();
    assert!(error_string.contains("Math error"));
    assert!(error_string.contains("lag must be positive"));
}

#[test]
fn test_input_errors_carry_the_input() {
    let err = parse_iso_date("12/31/2019").unwrap_err();
    assert!(matches!(err, ForecastError::InvalidInput(_)));
    assert!(err.to_string().contains("12/31/2019"));
}
