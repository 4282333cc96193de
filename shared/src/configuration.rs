use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Process-wide startup configuration. Loaded once in `main` and passed
/// into the handler, so tests can inject their own values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Comma-separated list of exact-match origins granted CORS access.
    pub allowed_origins: String,
    /// Fixed operational inbox that receives every order email.
    pub order_recipient: String,
    /// Verified sending identity registered with the mail provider.
    pub sender_email: String,
    pub sender_name: String,
    /// Transactional send endpoint.
    pub mail_api_url: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            allowed_origins: "http://localhost:3000,http://localhost:5000".to_string(),
            order_recipient: "orders@summitautoparts.example".to_string(),
            sender_email: "no-reply@summitautoparts.example".to_string(),
            sender_name: "Summit Auto Parts".to_string(),
            mail_api_url: "https://api.mailchannels.net/tx/v1/send".to_string(),
        }
    }
}

impl Configuration {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Env::raw().only(&[
                "ALLOWED_ORIGINS",
                "ORDER_RECIPIENT",
                "SENDER_EMAIL",
                "SENDER_NAME",
                "MAIL_API_URL",
            ]))
            .extract()
    }

    /// Exact string match against the allow-list; no wildcard or suffix
    /// matching.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .any(|allowed| !allowed.is_empty() && allowed == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::Configuration;

    #[test]
    fn when_environment_is_set_should_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ALLOWED_ORIGINS", "https://shop.example.com");
            jail.set_env("ORDER_RECIPIENT", "desk@example.com");

            let configuration = Configuration::load().unwrap();

            assert_eq!(configuration.allowed_origins, "https://shop.example.com");
            assert_eq!(configuration.order_recipient, "desk@example.com");
            // untouched keys keep their defaults
            assert_eq!(
                configuration.mail_api_url,
                "https://api.mailchannels.net/tx/v1/send"
            );

            Ok(())
        });
    }

    #[test]
    fn origin_allowed_requires_exact_match() {
        let configuration = Configuration {
            allowed_origins: "https://shop.example.com, http://localhost:3000".to_string(),
            ..Configuration::default()
        };

        assert!(configuration.origin_allowed("https://shop.example.com"));
        assert!(configuration.origin_allowed("http://localhost:3000"));
        assert!(!configuration.origin_allowed("https://evil.example.com"));
        assert!(!configuration.origin_allowed("https://shop.example.com.evil.com"));
        assert!(!configuration.origin_allowed(""));
    }
}
