use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

use crate::query_engine::Weighting;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        mongo_uri: get_env_or_default("MONGO_URI", "mongodb://localhost:27017"),
        mongo_db_name: get_env_or_default("MONGO_DB_NAME", "scout"),
        bind_addr: get_env_or_default("SCOUT_BIND_ADDR", "127.0.0.1:5000"),
        server_url: get_env_or_default("SCOUT_SERVER_URL", "http://127.0.0.1:5000"),
        static_dir: PathBuf::from(get_env_or_default("SCOUT_STATIC_DIR", "static")),
        vector_weighting: parse_weighting(&get_env_or_default("SCOUT_VECTOR_WEIGHTING", "tf")),
        prefs_path: env::var("SCOUT_PREFS_PATH").ok().map(PathBuf::from),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_db_name: String,
    pub bind_addr: String,
    /// Base URL the client commands talk to.
    pub server_url: String,
    pub static_dir: PathBuf,
    pub vector_weighting: Weighting,
    pub prefs_path: Option<PathBuf>,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_weighting(raw: &str) -> Weighting {
    raw.parse().unwrap_or_else(|_| {
        log::warn!("unknown SCOUT_VECTOR_WEIGHTING {raw:?}, falling back to tf");
        Weighting::TermFrequency
    })
}
