use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Daily auto-cancel sweep wall-clock time
    pub sweep_hour: u32,
    pub sweep_minute: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            sweep_hour: env::var("SWEEP_HOUR")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap(),
            sweep_minute: env::var("SWEEP_MINUTE")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap(),
        }
    }
}
