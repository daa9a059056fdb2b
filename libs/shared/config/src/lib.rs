use std::env;
use std::str::FromStr;
use tracing::warn;

/// Where the cells keep their documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBackend {
    Supabase,
    Memory,
}

impl FromStr for DataBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "supabase" => Ok(DataBackend::Supabase),
            "memory" | "in-memory" => Ok(DataBackend::Memory),
            other => Err(format!("unknown data backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub data_backend: DataBackend,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            data_backend: env::var("DATA_BACKEND")
                .ok()
                .and_then(|value| {
                    value.parse().map_err(|e: String| warn!("{}, using supabase", e)).ok()
                })
                .unwrap_or(DataBackend::Supabase),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or_else(|| {
                    warn!("PORT not set or invalid, using default");
                    3000
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        let store_ready = match self.data_backend {
            DataBackend::Supabase => !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty(),
            DataBackend::Memory => true,
        };

        store_ready && !self.supabase_jwt_secret.is_empty()
    }
}
