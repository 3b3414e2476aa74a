// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use std::sync::Once;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = RootProvider::new_http(url);
        Ok(provider)
    }

    /// Install ring as the process-wide rustls provider. Both the websocket
    /// and HTTP stacks pull in rustls, so it cannot pick one on its own.
    pub fn install_tls_provider() {
        static INSTALL: Once = Once::new();
        INSTALL.call_once(|| {
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::debug!(target: "network", "rustls provider already installed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_rpc_url() {
        assert!(matches!(
            ConnectionFactory::http("not a url"),
            Err(AppError::Config(_))
        ));
        assert!(ConnectionFactory::http("http://127.0.0.1:8545").is_ok());
    }

    #[test]
    fn tls_provider_install_is_idempotent() {
        ConnectionFactory::install_tls_provider();
        ConnectionFactory::install_tls_provider();
        assert!(rustls::crypto::CryptoProvider::get_default().is_some());
    }
}
