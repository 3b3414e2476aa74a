// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::parsing::{parse_address_hex, parse_hex_bytes, parse_selector_hex};
use crate::data::presale_abi::{PresaleNft, presale_calldata};
use crate::domain::constants;
use crate::domain::error::AppError;
use crate::domain::types::TriggerPattern;
use crate::infrastructure::network::subscription::SubscriptionRequest;
use alloy::primitives::{Address, Bytes, Selector, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Raw settings as read from file + environment. Turned into [`RaceConfig`] once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,
    #[serde(default = "default_false")]
    pub dry_run: bool,
    #[serde(default = "default_network")]
    pub network: String,

    // Credentials
    pub alchemy_api_key: Option<String>,
    pub private_key: Option<String>,
    /// Relay auth identity; falls back to `private_key`.
    pub bundle_signer_key: Option<String>,

    // Endpoint overrides
    pub rpc_url: Option<String>,
    pub ws_url: Option<String>,
    pub relay_url: Option<String>,

    // Trigger
    #[serde(default = "default_target_contract")]
    pub target_contract: String,
    pub trigger_selector: Option<String>,
    pub owner_address: Option<String>,
    #[serde(default = "default_false")]
    pub filter_to_contract: bool,

    // Action
    #[serde(default = "default_presale_amount")]
    pub presale_amount: u64,
    pub action_calldata: Option<String>,
    #[serde(default = "default_action_value_wei")]
    pub action_value_wei: u128,
    #[serde(default = "default_false")]
    pub include_trigger_in_bundle: bool,

    // Gas policy
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_max_fee_gwei")]
    pub max_fee_gwei: u64,
    #[serde(default = "default_priority_fee_gwei")]
    pub priority_fee_gwei: u64,

    // Timing
    #[serde(default = "default_inclusion_timeout_secs")]
    pub inclusion_timeout_secs: u64,
    #[serde(default = "default_inclusion_poll_ms")]
    pub inclusion_poll_ms: u64,
    #[serde(default = "default_max_runtime_secs")]
    pub max_runtime_secs: u64,

    // Probe bundle
    #[serde(default = "default_true")]
    pub probe_enabled: bool,
    #[serde(default = "default_probe_value_wei")]
    pub probe_value_wei: u128,

    // Concurrency
    pub max_concurrent_races: Option<usize>,
    #[serde(default = "default_intake_capacity")]
    pub intake_capacity: usize,
}

// Defaults
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_network() -> String {
    "sepolia".to_string()
}
fn default_target_contract() -> String {
    format!("{:#x}", constants::DEFAULT_TARGET_CONTRACT)
}
fn default_presale_amount() -> u64 {
    constants::DEFAULT_PRESALE_AMOUNT
}
fn default_action_value_wei() -> u128 {
    constants::DEFAULT_ACTION_VALUE_WEI
}
fn default_gas_limit() -> u64 {
    constants::DEFAULT_GAS_LIMIT
}
fn default_max_fee_gwei() -> u64 {
    constants::DEFAULT_MAX_FEE_GWEI
}
fn default_priority_fee_gwei() -> u64 {
    constants::DEFAULT_PRIORITY_FEE_GWEI
}
fn default_inclusion_timeout_secs() -> u64 {
    constants::DEFAULT_INCLUSION_TIMEOUT_SECS
}
fn default_inclusion_poll_ms() -> u64 {
    constants::DEFAULT_INCLUSION_POLL_MS
}
fn default_max_runtime_secs() -> u64 {
    constants::DEFAULT_MAX_RUNTIME_SECS
}
fn default_probe_value_wei() -> u128 {
    constants::DEFAULT_PROBE_VALUE_WEI
}
fn default_intake_capacity() -> usize {
    constants::DEFAULT_INTAKE_CAPACITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Sepolia,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => constants::CHAIN_ETHEREUM,
            Network::Sepolia => constants::CHAIN_SEPOLIA,
        }
    }

    fn alchemy_host(&self) -> &'static str {
        match self {
            Network::Mainnet => "eth-mainnet.g.alchemy.com",
            Network::Sepolia => "eth-sepolia.g.alchemy.com",
        }
    }

    fn flashbots_relay(&self) -> &'static str {
        match self {
            Network::Mainnet => constants::FLASHBOTS_RELAY_MAINNET,
            Network::Sepolia => constants::FLASHBOTS_RELAY_SEPOLIA,
        }
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "ethereum" | "1" => Ok(Network::Mainnet),
            "sepolia" | "11155111" => Ok(Network::Sepolia),
            other => Err(AppError::Config(format!(
                "Unknown network '{other}' (expected mainnet or sepolia)"
            ))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Sepolia => f.write_str("sepolia"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rpc_url: String,
    pub ws_url: String,
    pub relay_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    pub calldata: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Validated, immutable run configuration shared by every component.
#[derive(Clone)]
pub struct RaceConfig {
    pub network: Network,
    pub endpoints: Endpoints,
    pub wallet: PrivateKeySigner,
    pub bundle_signer: PrivateKeySigner,
    pub pattern: TriggerPattern,
    pub action: ActionConfig,
    pub gas: GasPolicy,
    pub subscription: SubscriptionRequest,
    pub include_trigger_in_bundle: bool,
    pub probe_value: Option<U256>,
    pub inclusion_timeout: Duration,
    pub inclusion_poll: Duration,
    pub max_runtime: Duration,
    pub max_concurrent_races: Option<usize>,
    pub intake_capacity: usize,
    pub dry_run: bool,
}

impl RaceConfig {
    pub fn wallet_address(&self) -> Address {
        self.wallet.address()
    }
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = path {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Environment wins over the file; CLI flags are applied on top in main.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_with_path(None)
    }

    pub fn network(&self) -> Result<Network, AppError> {
        Network::from_str(&self.network)
    }

    fn alchemy_api_key_value(&self) -> Option<String> {
        non_empty(self.alchemy_api_key.as_deref())
    }

    fn private_key_value(&self) -> Option<String> {
        non_empty(self.private_key.as_deref())
    }

    pub fn endpoints(&self, network: Network) -> Result<Endpoints, AppError> {
        let api_key = self.alchemy_api_key_value().ok_or_else(|| {
            AppError::Config(
                "ALCHEMY_API_KEY is missing; set it in .env or the environment".to_string(),
            )
        })?;
        let host = network.alchemy_host();
        let rpc_url = non_empty(self.rpc_url.as_deref())
            .unwrap_or_else(|| format!("https://{host}/v2/{api_key}"));
        let ws_url = non_empty(self.ws_url.as_deref())
            .unwrap_or_else(|| format!("wss://{host}/v2/{api_key}"));
        let relay_url = non_empty(self.relay_url.as_deref())
            .unwrap_or_else(|| network.flashbots_relay().to_string());

        for (field, raw) in [("rpc_url", &rpc_url), ("ws_url", &ws_url), ("relay_url", &relay_url)] {
            url::Url::parse(raw).map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(Endpoints {
            rpc_url,
            ws_url,
            relay_url,
        })
    }

    pub fn trigger_selector(&self) -> Result<Selector, AppError> {
        match non_empty(self.trigger_selector.as_deref()) {
            Some(raw) => parse_selector_hex(&raw).ok_or_else(|| AppError::Validation {
                field: "trigger_selector".into(),
                message: format!("'{raw}' is not a 4-byte hex selector"),
            }),
            None => Ok(Selector::from(PresaleNft::enablePresaleCall::SELECTOR)),
        }
    }

    pub fn action_calldata(&self) -> Result<Bytes, AppError> {
        match non_empty(self.action_calldata.as_deref()) {
            Some(raw) => parse_hex_bytes(&raw)
                .map(Bytes::from)
                .ok_or_else(|| AppError::Validation {
                    field: "action_calldata".into(),
                    message: "not valid hex".into(),
                }),
            None => Ok(presale_calldata(U256::from(self.presale_amount))),
        }
    }

    pub fn gas_policy(&self) -> Result<GasPolicy, AppError> {
        if self.gas_limit == 0 {
            return Err(AppError::Validation {
                field: "gas_limit".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.priority_fee_gwei > self.max_fee_gwei {
            return Err(AppError::Validation {
                field: "priority_fee_gwei".into(),
                message: format!(
                    "priority fee {} gwei exceeds max fee {} gwei",
                    self.priority_fee_gwei, self.max_fee_gwei
                ),
            });
        }
        Ok(GasPolicy {
            gas_limit: self.gas_limit,
            max_fee_per_gas: self.max_fee_gwei as u128 * constants::GWEI,
            max_priority_fee_per_gas: self.priority_fee_gwei as u128 * constants::GWEI,
        })
    }

    /// Validate everything and build the run configuration. Performs no network I/O.
    pub fn into_race_config(&self) -> Result<RaceConfig, AppError> {
        let network = self.network()?;
        let endpoints = self.endpoints(network)?;

        let private_key = self.private_key_value().ok_or_else(|| {
            AppError::Config("PRIVATE_KEY is missing; set it in .env or the environment".to_string())
        })?;
        let wallet = PrivateKeySigner::from_str(&private_key)
            .map_err(|e| AppError::Config(format!("Invalid wallet key: {}", e)))?;
        let bundle_signer = match non_empty(self.bundle_signer_key.as_deref()) {
            Some(key) => PrivateKeySigner::from_str(&key)
                .map_err(|e| AppError::Config(format!("Invalid bundle signer key: {}", e)))?,
            None => wallet.clone(),
        };

        let contract =
            parse_address_hex(&self.target_contract).ok_or_else(|| AppError::Validation {
                field: "target_contract".into(),
                message: format!("'{}' is not an address", self.target_contract),
            })?;
        let pattern = TriggerPattern::new(contract, self.trigger_selector()?);

        let owner = match non_empty(self.owner_address.as_deref()) {
            Some(raw) => Some(parse_address_hex(&raw).ok_or_else(|| AppError::Validation {
                field: "owner_address".into(),
                message: format!("'{raw}' is not an address"),
            })?),
            None => None,
        };
        let subscription = if self.filter_to_contract {
            SubscriptionRequest::hashes_only().with_filter(Some(contract), owner)
        } else {
            SubscriptionRequest::hashes_only()
        };

        if self.inclusion_timeout_secs == 0 {
            return Err(AppError::Validation {
                field: "inclusion_timeout_secs".into(),
                message: "must be greater than zero".into(),
            });
        }

        Ok(RaceConfig {
            network,
            endpoints,
            wallet,
            bundle_signer,
            pattern,
            action: ActionConfig {
                calldata: self.action_calldata()?,
                value: U256::from(self.action_value_wei),
            },
            gas: self.gas_policy()?,
            subscription,
            include_trigger_in_bundle: self.include_trigger_in_bundle,
            probe_value: self
                .probe_enabled
                .then(|| U256::from(self.probe_value_wei)),
            inclusion_timeout: Duration::from_secs(self.inclusion_timeout_secs),
            inclusion_poll: Duration::from_millis(self.inclusion_poll_ms.max(50)),
            max_runtime: Duration::from_secs(self.max_runtime_secs.max(1)),
            max_concurrent_races: self.max_concurrent_races.filter(|n| *n > 0),
            intake_capacity: self.intake_capacity.max(1),
            dry_run: self.dry_run,
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
