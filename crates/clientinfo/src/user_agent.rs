/// Browser and OS names parsed from a `User-Agent` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
}

/// Parse a `User-Agent` string via the `woothee` crate.
///
/// woothee reports unknown values as `"UNKNOWN"` or an empty string; both
/// are normalised to `None`.
pub fn parse_user_agent(user_agent: &str) -> UserAgentInfo {
    if user_agent.is_empty() {
        return UserAgentInfo::default();
    }

    match woothee::parser::Parser::new().parse(user_agent) {
        Some(result) => UserAgentInfo {
            browser: known(result.name),
            os: known(result.os),
        },
        None => UserAgentInfo::default(),
    }
}

fn known(value: &str) -> Option<String> {
    if value.is_empty() || value == "UNKNOWN" {
        None
    } else {
        Some(value.to_string())
    }
}
