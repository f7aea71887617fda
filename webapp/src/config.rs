//! Frontend settings from the environment.

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebSettings {
    pub bind_addr: String,
}

impl WebSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        WebSettings {
            bind_addr: lookup("WEBAPP_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_defaults_and_overrides() {
        assert_eq!(WebSettings::from_lookup(|_| None).bind_addr, DEFAULT_BIND_ADDR);
        let s = WebSettings::from_lookup(|k| {
            (k == "WEBAPP_BIND_ADDR").then(|| "127.0.0.1:9000".into())
        });
        assert_eq!(s.bind_addr, "127.0.0.1:9000");
    }
}
