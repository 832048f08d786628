#[derive(Clone)]
pub struct Config {
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("TASKDECK_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        }
    }
}
