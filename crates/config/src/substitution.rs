use regex::{Captures, Regex};
use std::env;
use std::sync::OnceLock;
use tracing::{debug, warn};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(\w+)\}|\$(\w+)").expect("placeholder pattern is valid"))
}

fn var_name<'a>(caps: &Captures<'a>) -> &'a str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map_or("", |m| m.as_str())
}

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
///
/// Unset variables keep their placeholder so validation can report them.
pub fn substitute_env_vars(content: &str) -> String {
    let mut missing_vars = Vec::new();

    let result = placeholder_pattern().replace_all(content, |caps: &Captures| {
        let name = var_name(caps);
        match env::var(name) {
            Ok(value) => {
                debug!("Substituting environment variable: {}", name);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", name);
                missing_vars.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!("Environment variables not set: {:?}", missing_vars);
    }

    result.into_owned()
}

/// Names of unresolved placeholders left in `content`
pub fn unresolved_env_vars(content: &str) -> Vec<String> {
    placeholder_pattern()
        .captures_iter(content)
        .map(|caps| var_name(&caps).to_string())
        .collect()
}
