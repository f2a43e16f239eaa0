use serde::Deserialize;
use std::env;

const DEFAULT_HEALTHCHECK_URL: &str = "http://localhost:8080/healthcheck";

#[derive(Debug)]
enum HealthcheckError {
    ReqwestError(String),
    NotOk,
}

#[derive(Debug, Deserialize)]
struct StatusJSON {
    status: String,
}

impl std::fmt::Display for HealthcheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthcheckError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
            HealthcheckError::NotOk => write!(f, "Status code != 200 or no healthcheck"),
        }
    }
}

impl From<reqwest::Error> for HealthcheckError {
    fn from(err: reqwest::Error) -> HealthcheckError {
        HealthcheckError::ReqwestError(err.to_string())
    }
}

fn healthcheck_url() -> String {
    env::var("HEALTHCHECK_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HEALTHCHECK_URL.to_string())
}

fn check_status(status: &StatusJSON) -> Result<(), HealthcheckError> {
    if status.status != "ok" {
        return Err(HealthcheckError::NotOk);
    }
    Ok(())
}

fn main() -> Result<(), HealthcheckError> {
    let res = reqwest::blocking::get(healthcheck_url())?;
    if res.status() != 200 {
        return Err(HealthcheckError::NotOk);
    }
    let status: StatusJSON = res.json::<StatusJSON>()?;
    check_status(&status)
}
