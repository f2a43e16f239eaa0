use dotenvy::dotenv;
use std::env;
use std::error::Error;
use yahoo_api::api::DEFAULT_CACHE_TTL_SECS;

const DEFAULT_PORT: u16 = 8080;

pub struct Config {
    pub workers: usize,
    pub port: u16,
    pub redis_url: Option<String>,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn new() -> Result<Config, Box<dyn Error>> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, Box<dyn Error>> {
        let mut workers: usize = match lookup("DASHBOARD_WORKERS") {
            Some(workers) => workers.trim().parse()?,
            None => 1,
        };
        let port: u16 = match lookup("DASHBOARD_PORT") {
            Some(port) => port.trim().parse()?,
            None => DEFAULT_PORT,
        };
        let cache_ttl_secs: u64 = match lookup("DASHBOARD_CACHE_TTL_SECS") {
            Some(ttl) => ttl.trim().parse()?,
            None => DEFAULT_CACHE_TTL_SECS,
        };
        let redis_url = lookup("DASHBOARD_REDIS").filter(|url| !url.trim().is_empty());

        if workers == 0 {
            workers = 1;
        }

        let config = Config {
            workers,
            port,
            redis_url,
            cache_ttl_secs,
        };
        Ok(config)
    }
}
