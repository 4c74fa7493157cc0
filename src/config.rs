use dotenvy::dotenv;
use std::env;
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_mutation_per_min: u32,
    pub rate_export_per_min: u32,
    pub rate_default_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            rate_mutation_per_min: env::var("RATE_MUTATION_PER_MIN")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap(),
            rate_export_per_min: env::var("RATE_EXPORT_PER_MIN")
                .unwrap_or_else(|_| "30".to_string()) // report builds are heavy
                .parse()
                .unwrap(),
            rate_default_per_min: env::var("RATE_DEFAULT_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }
}
