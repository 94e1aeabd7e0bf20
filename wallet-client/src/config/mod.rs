//! Configuration Management Module
//!
//! This module holds the per-chain profile tables the wallet operates
//! from: RPC and bundler endpoints, fee-sponsorship policy, fee-token
//! addresses, and the contract constants account addresses are derived
//! against. Profiles are loaded from a TOML file when one is present and
//! fall back to the built-in table otherwise. Nothing in here is
//! computed at runtime; core logic receives these values explicitly.

use safe_account::{Address, SafeDeployment};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// How network fees are paid on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SponsorshipMode {
    /// Fees are paid by operator policy.
    Sponsor,
    /// The user pays via an ERC-20 fee token, requiring an allowance to
    /// the operator's fee-collecting contract.
    FeeToken,
    /// No fee abstraction; the user pays in the native asset.
    None,
}

/// Static description of one supported chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainProfile {
    /// Unique chain identifier
    pub chain_id: u64,
    /// Human-readable name for the chain
    pub name: String,
    /// Symbol of the native currency (for display only)
    pub native_currency_symbol: String,
    /// RPC endpoint URL for JSON-RPC reads
    pub rpc_url: String,
    /// Block explorer base URL
    pub explorer_url: String,
    /// Account-abstraction bundler endpoint for this chain
    pub bundler_url: String,
    /// Fee payment policy for this chain
    pub sponsorship: SponsorshipMode,
    /// ERC-20 fee token (required when sponsorship is `fee-token`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_token: Option<Address>,
    /// Fee-collecting contract the fee-token allowance is granted to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_collector: Option<Address>,
    /// Contract constants account addresses are derived against
    pub deployment: SafeDeployment,
}

/// Main configuration: the table of supported chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub chains: Vec<ChainProfile>,
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl WalletConfig {
    /// Loads configuration from the TOML file.
    ///
    /// The path is taken from `WALLET_CONFIG_PATH` when set (used by
    /// tests), otherwise `config/wallet.toml`. When no file exists the
    /// built-in profile table is used.
    ///
    /// # Returns
    ///
    /// * `Ok(WalletConfig)` - Loaded (or default) and validated config
    /// * `Err(anyhow::Error)` - File unreadable or validation failed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("WALLET_CONFIG_PATH")
            .unwrap_or_else(|_| "config/wallet.toml".to_string());

        let config = if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::defaults()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the profile table.
    ///
    /// Chain ids must be unique, fee-token chains must carry both the
    /// token and the collector address, and at most one chain may run in
    /// fee-token mode (it is the single designated bootstrap chain).
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = std::collections::HashSet::new();
        let mut fee_token_chains = 0usize;

        for profile in &self.chains {
            if !seen.insert(profile.chain_id) {
                anyhow::bail!(
                    "Configuration error: duplicate chain id {}. Each chain must have a unique chain id.",
                    profile.chain_id
                );
            }
            if profile.sponsorship == SponsorshipMode::FeeToken {
                fee_token_chains += 1;
                if profile.fee_token.is_none() || profile.fee_collector.is_none() {
                    anyhow::bail!(
                        "Configuration error: chain {} is in fee-token mode but is missing the fee token or collector address.",
                        profile.chain_id
                    );
                }
            }
        }

        if fee_token_chains > 1 {
            anyhow::bail!(
                "Configuration error: {} chains are in fee-token mode; only one designated bootstrap chain is supported.",
                fee_token_chains
            );
        }

        Ok(())
    }

    /// Looks up the profile for a chain id.
    pub fn profile(&self, chain_id: u64) -> Option<&ChainProfile> {
        self.chains.iter().find(|p| p.chain_id == chain_id)
    }

    /// Returns the single chain configured for fee-token payment, if any.
    pub fn fee_token_chain(&self) -> Option<&ChainProfile> {
        self.chains
            .iter()
            .find(|p| p.sponsorship == SponsorshipMode::FeeToken)
    }

    /// Built-in profile table: every supported chain, simultaneously
    /// active. Operators override this with a TOML file per environment.
    pub fn defaults() -> Self {
        let chains = vec![
            ChainProfile {
                chain_id: 1,
                name: "Ethereum".to_string(),
                native_currency_symbol: "ETH".to_string(),
                rpc_url: "https://eth.llamarpc.com".to_string(),
                explorer_url: "https://etherscan.io".to_string(),
                bundler_url: "https://api.pimlico.io/v2/1/rpc".to_string(),
                sponsorship: SponsorshipMode::FeeToken,
                fee_token: Some(parse_addr(USDC_MAINNET)),
                fee_collector: Some(parse_addr(FEE_PAYMASTER)),
                deployment: default_deployment(),
            },
            ChainProfile {
                chain_id: 100,
                name: "Gnosis".to_string(),
                native_currency_symbol: "xDAI".to_string(),
                rpc_url: "https://rpc.gnosischain.com".to_string(),
                explorer_url: "https://gnosisscan.io".to_string(),
                bundler_url: "https://api.pimlico.io/v2/100/rpc".to_string(),
                sponsorship: SponsorshipMode::Sponsor,
                fee_token: None,
                fee_collector: None,
                deployment: default_deployment(),
            },
            ChainProfile {
                chain_id: 8453,
                name: "Base".to_string(),
                native_currency_symbol: "ETH".to_string(),
                rpc_url: "https://mainnet.base.org".to_string(),
                explorer_url: "https://basescan.org".to_string(),
                bundler_url: "https://api.pimlico.io/v2/8453/rpc".to_string(),
                sponsorship: SponsorshipMode::Sponsor,
                fee_token: None,
                fee_collector: None,
                deployment: default_deployment(),
            },
            ChainProfile {
                chain_id: 10,
                name: "Optimism".to_string(),
                native_currency_symbol: "ETH".to_string(),
                rpc_url: "https://mainnet.optimism.io".to_string(),
                explorer_url: "https://optimistic.etherscan.io".to_string(),
                bundler_url: "https://api.pimlico.io/v2/10/rpc".to_string(),
                sponsorship: SponsorshipMode::Sponsor,
                fee_token: None,
                fee_collector: None,
                deployment: default_deployment(),
            },
            ChainProfile {
                chain_id: 42161,
                name: "Arbitrum".to_string(),
                native_currency_symbol: "ETH".to_string(),
                rpc_url: "https://arb1.arbitrum.io/rpc".to_string(),
                explorer_url: "https://arbiscan.io".to_string(),
                bundler_url: "https://api.pimlico.io/v2/42161/rpc".to_string(),
                sponsorship: SponsorshipMode::Sponsor,
                fee_token: None,
                fee_collector: None,
                deployment: default_deployment(),
            },
            ChainProfile {
                chain_id: 43114,
                name: "Avalanche".to_string(),
                native_currency_symbol: "AVAX".to_string(),
                rpc_url: "https://api.avax.network/ext/bc/C/rpc".to_string(),
                explorer_url: "https://snowtrace.io".to_string(),
                bundler_url: "https://api.pimlico.io/v2/43114/rpc".to_string(),
                sponsorship: SponsorshipMode::None,
                fee_token: None,
                fee_collector: None,
                deployment: default_deployment(),
            },
        ];
        WalletConfig { chains }
    }
}

// ============================================================================
// BUILT-IN CONTRACT CONSTANTS
// ============================================================================

/// USDC on Ethereum mainnet, the fee token on the bootstrap chain.
const USDC_MAINNET: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

/// The operator's ERC-20 fee-collecting paymaster.
const FEE_PAYMASTER: &str = "0x777777777777aec03fd955926dbf81597e66834c";

/// Deterministic v1.3.0 deployment addresses, identical on every
/// supported chain.
const PROXY_FACTORY: &str = "0xa6b71e26c5e0845f74c812102ca7114b6a896ab2";
const SINGLETON_L2: &str = "0x3e5c63644e683549055b9be8653de26e0b4cd36e";
const FALLBACK_HANDLER: &str = "0xf48f2b2d2a534e402487b3ee7c18c33aec0fe5e4";

/// Single-owner account-abstraction constants (v1.4.1 factory line).
const ACCOUNT_FACTORY: &str = "0x4e1dcf7ad4e460cfd30791ccc4f9c8a4f820ec67";
const WEBAUTHN_VERIFIER: &str = "0xa86e0054c51e4894d88762a017ecc5e5235f5dba";

/// Init-code hash of the single-owner account, pinned from the account
/// factory at integration time.
const ACCOUNT_INIT_CODE_HASH: &str =
    "0x76733d705f71b79841c0ee960a0ca47e81d39a1e3b1bc860b2f6b1b74f2c1910";

/// Proxy creation bytecode, pinned from the proxy factory's
/// `proxyCreationCode()` view at integration time.
const PROXY_CREATION_CODE: &str = concat!(
    "0x608060405234801561001057600080fd5b506040516101e63803806101e68339",
    "818101604052602081101561003357600080fd5b810190808051906020019092919",
    "0505050600073ffffffffffffffffffffffffffffffffffffffff168173ffffffff",
    "ffffffffffffffffffffffffffffffff161415610073576040517f08c379a000000",
    "000000000000000000000000000000000000000000000000000815260040180806",
    "02001828103825260228152602001806101c46022913960400191505060405180",
    "910390fd5b806000806101000a81548173ffffffffffffffffffffffffffffffff",
    "ffffffff021916908373ffffffffffffffffffffffffffffffffffffffff160217",
    "9055505060ab806101196000396000f3fe608060405273ffffffffffffffffffff",
    "ffffffffffffffffffff600054167fa619486e000000000000000000000000000000",
    "0000000000000000000000000060003514156050578060005260206000f35b3660",
    "008037600080366000845af43d6000803e60008114156070573d6000fd5b3d6000",
    "f3fea264697066735822122003d1488ee65e08fa41e58e888a9865554c535f2c77",
    "126a82cb4c0f917f31441364736f6c63430007060033496e76616c69642073696e",
    "676c65746f6e20616464726573732070726f7669646564"
);

fn parse_addr(hex: &str) -> Address {
    Address::from_hex(hex).expect("built-in address constant")
}

fn parse_word(hex: &str) -> [u8; 32] {
    let bytes = hex::decode(hex.strip_prefix("0x").unwrap_or(hex))
        .expect("built-in hash constant");
    <[u8; 32]>::try_from(bytes.as_slice()).expect("built-in hash constant")
}

fn default_deployment() -> SafeDeployment {
    SafeDeployment {
        proxy_factory: parse_addr(PROXY_FACTORY),
        singleton: parse_addr(SINGLETON_L2),
        fallback_handler: parse_addr(FALLBACK_HANDLER),
        proxy_creation_code: hex::decode(&PROXY_CREATION_CODE[2..])
            .expect("built-in bytecode constant"),
        account_factory: parse_addr(ACCOUNT_FACTORY),
        account_init_code_hash: parse_word(ACCOUNT_INIT_CODE_HASH),
        webauthn_verifier: parse_addr(WEBAUTHN_VERIFIER),
    }
}
