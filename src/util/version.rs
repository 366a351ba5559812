use std::fmt;

pub const APP_NAME: &str = "Product Radar";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

/// Tag of the build when available, otherwise `v<crate version>`.
pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// `Product Radar v1.0.0`, printed by `product-radar version`.
pub struct Banner;

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", APP_NAME, version_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_crate_version() {
        let label = version_label();
        match GIT_TAG {
            Some(tag) => assert_eq!(label, tag),
            None => assert_eq!(label, format!("v{APP_VERSION}")),
        }
        assert!(Banner.to_string().starts_with(APP_NAME));
    }
}
