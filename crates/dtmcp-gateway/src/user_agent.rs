//! Client identification
//!
//! The same string is sent as the `User-Agent` header and forwarded as the
//! `dt-client-context` query parameter so backend usage can be attributed to
//! this server.

/// `dynatrace-mcp-rust/vX.Y.Z (os-arch)`
pub fn user_agent() -> String {
    format!(
        "dynatrace-mcp-rust/v{} ({}-{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_format() {
        let ua = user_agent();
        assert!(ua.starts_with("dynatrace-mcp-rust/v"));
        assert!(ua.ends_with(')'));
        assert!(ua.contains(std::env::consts::OS));
        assert!(ua.contains(std::env::consts::ARCH));
    }
}
