use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    token_ttl_hours: Option<i64>,
    max_db_connections: Option<u32>,
    bcrypt_cost: Option<u32>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_max_db_connections() -> u32 {
    10
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) => read_file_config(Path::new(path_str))?,
            None => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        merge(env_config, file_config)
    }
}

fn read_file_config(path: &Path) -> Result<PartialServerConfig, String> {
    if !path.exists() {
        return Ok(PartialServerConfig::default());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
    toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
}

fn merge(env: PartialServerConfig, file: PartialServerConfig) -> Result<ServerConfig, String> {
    Ok(ServerConfig {
        database_url: env
            .database_url
            .or(file.database_url)
            .ok_or("DATABASE_URL is required")?,
        jwt_secret: env
            .jwt_secret
            .or(file.jwt_secret)
            .ok_or("JWT_SECRET is required")?,
        listen_addr: env
            .listen_addr
            .or(file.listen_addr)
            .unwrap_or_else(default_listen_addr),
        log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
        token_ttl_hours: env
            .token_ttl_hours
            .or(file.token_ttl_hours)
            .unwrap_or_else(default_token_ttl_hours),
        max_db_connections: env
            .max_db_connections
            .or(file.max_db_connections)
            .unwrap_or_else(default_max_db_connections),
        bcrypt_cost: env
            .bcrypt_cost
            .or(file.bcrypt_cost)
            .unwrap_or_else(default_bcrypt_cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_environment_overrides_file() {
        let file = PartialServerConfig {
            database_url: Some("postgres://file/db".to_string()),
            jwt_secret: Some("file-secret".to_string()),
            listen_addr: Some("127.0.0.1:9000".to_string()),
            ..Default::default()
        };
        let env = PartialServerConfig {
            jwt_secret: Some("env-secret".to_string()),
            ..Default::default()
        };

        let config = merge(env, file).unwrap();
        assert_eq!(config.database_url, "postgres://file/db");
        assert_eq!(config.jwt_secret, "env-secret");
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.max_db_connections, 10);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_missing_required_fields() {
        let only_db = PartialServerConfig {
            database_url: Some("sqlite::memory:".to_string()),
            ..Default::default()
        };
        assert_eq!(
            merge(PartialServerConfig::default(), only_db).unwrap_err(),
            "JWT_SECRET is required"
        );
        assert_eq!(
            merge(PartialServerConfig::default(), PartialServerConfig::default()).unwrap_err(),
            "DATABASE_URL is required"
        );
    }

    #[test]
    fn test_read_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url = \"sqlite::memory:\"\njwt_secret = \"s\"\ntoken_ttl_hours = 2"
        )
        .unwrap();

        let partial = read_file_config(file.path()).unwrap();
        assert_eq!(partial.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(partial.token_ttl_hours, Some(2));
        assert!(partial.log_dir.is_none());
    }

    #[test]
    fn test_missing_file_is_empty_layer() {
        let partial = read_file_config(Path::new("/nonexistent/snipbox.toml")).unwrap();
        assert!(partial.database_url.is_none());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = ").unwrap();
        assert!(read_file_config(file.path()).is_err());
    }
}
