use std::{env, str::FromStr, time::Duration};

use crate::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub web_port: u16,
    pub posts_per_page: u32,
    pub search_per_page: u32,
    pub search_debounce: Duration,
    pub api_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            web_port: 3000,
            posts_per_page: 6,
            search_per_page: 10,
            search_debounce: Duration::from_millis(300),
            api_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            web_port: parse_var("WEB_PORT", defaults.web_port)?,
            posts_per_page: positive_var("POSTS_PER_PAGE", defaults.posts_per_page)?,
            search_per_page: positive_var("SEARCH_PER_PAGE", defaults.search_per_page)?,
            search_debounce: Duration::from_millis(parse_var(
                "SEARCH_DEBOUNCE_MS",
                defaults.search_debounce.as_millis() as u64,
            )?),
            api_timeout: Duration::from_secs(positive_var(
                "API_TIMEOUT_SECS",
                defaults.api_timeout.as_secs(),
            )?),
        })
    }

    pub fn web_addr(&self) -> String {
        format!("0.0.0.0:{}", self.web_port)
    }
}

fn parse_var<T>(key: &str, default: T) -> crate::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{key} must be a valid number: {e}"))),
        Err(_) => Ok(default),
    }
}

fn positive_var<T>(key: &str, default: T) -> crate::Result<T>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value = parse_var(key, default)?;
    if value <= T::default() {
        return Err(Error::Config(format!("{key} must be greater than zero")));
    }
    Ok(value)
}
