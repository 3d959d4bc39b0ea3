//! Protocol topology: package ids, shared objects and coin types.
//!
//! Defaults match the Creek Finance testnet deployment.

use creek_chain::OracleObjects;
use serde::{Deserialize, Serialize};

/// Package and shared object identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Package exposing the XAUM and USDC test faucets
    #[serde(default = "default_faucet_package")]
    pub faucet_package: String,

    /// Shared mint object for XAUM claims
    #[serde(default = "default_xaum_object")]
    pub xaum_object: String,

    /// Shared mint object for USDC claims
    #[serde(default = "default_usdc_object")]
    pub usdc_object: String,

    /// Package with the GUSD vault, staking manager and lending entries
    #[serde(default = "default_lending_package")]
    pub lending_package: String,

    /// GUSD/USDC vault
    #[serde(default = "default_gusd_vault")]
    pub gusd_vault: String,

    /// Lending market (shared with the vault)
    #[serde(default = "default_market")]
    pub market: String,

    /// XAUM staking manager
    #[serde(default = "default_staking_manager")]
    pub staking_manager: String,

    /// Lending protocol root object
    #[serde(default = "default_protocol_object")]
    pub protocol_object: String,

    /// Price oracle read by borrow and withdraw
    #[serde(default = "default_price_oracle")]
    pub price_oracle: String,

    /// x_oracle shared object
    #[serde(default = "default_x_oracle")]
    pub x_oracle: String,

    #[serde(default = "default_oracle_package")]
    pub oracle_package: String,

    #[serde(default = "default_rule_package")]
    pub rule_package: String,

    #[serde(default = "default_clock")]
    pub clock: String,

    /// Fully qualified coin types
    #[serde(default)]
    pub coin_types: CoinTypes,
}

const FAUCET_PACKAGE: &str = "0xa03cb0b29e92c6fa9bfb7b9c57ffdba5e23810f20885b4390f724553d32efb8b";

fn default_faucet_package() -> String {
    FAUCET_PACKAGE.to_string()
}
fn default_xaum_object() -> String {
    "0x66984752afbd878aaee450c70142747bb31fca2bb63f0a083d75c361da39adb1".to_string()
}
fn default_usdc_object() -> String {
    "0x77153159c4e3933658293a46187c30ef68a8f98aa48b0ce76ffb0e6d20c0776b".to_string()
}
fn default_lending_package() -> String {
    "0x8cee41afab63e559bc236338bfd7c6b2af07c9f28f285fc8246666a7ce9ae97a".to_string()
}
fn default_gusd_vault() -> String {
    "0x1fc1b07f7c1d06d4d8f0b1d0a2977418ad71df0d531c476273a2143dfeffba0e".to_string()
}
fn default_market() -> String {
    "0x166dd68901d2cb47b55c7cfbb7182316f84114f9e12da9251fd4c4f338e37f5d".to_string()
}
fn default_staking_manager() -> String {
    "0x5c9d26e8310f740353eac0e67c351f71bad8748cf5ac90305ffd32a5f3326990".to_string()
}
fn default_protocol_object() -> String {
    "0x13f4679d0ebd6fc721875af14ee380f45cde02f81d690809ac543901d66f6758".to_string()
}
fn default_price_oracle() -> String {
    "0x3a865c5bc0e47efc505781598396d75b647e4f1218359e89b08682519c3ac060".to_string()
}
fn default_x_oracle() -> String {
    "0x9052b77605c1e2796582e996e0ce60e2780c9a440d8878a319fa37c50ca32530".to_string()
}
fn default_oracle_package() -> String {
    "0xca9b2f66c5ab734939e048d0732e2a09f486402bb009d88f95c27abe8a4872ee".to_string()
}
fn default_rule_package() -> String {
    "0xbd6d8bb7f40ca9921d0c61404cba6dcfa132f184cf8c0f273008a103889eb0e8".to_string()
}
fn default_clock() -> String {
    "0x0000000000000000000000000000000000000000000000000000000000000006".to_string()
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            faucet_package: default_faucet_package(),
            xaum_object: default_xaum_object(),
            usdc_object: default_usdc_object(),
            lending_package: default_lending_package(),
            gusd_vault: default_gusd_vault(),
            market: default_market(),
            staking_manager: default_staking_manager(),
            protocol_object: default_protocol_object(),
            price_oracle: default_price_oracle(),
            x_oracle: default_x_oracle(),
            oracle_package: default_oracle_package(),
            rule_package: default_rule_package(),
            clock: default_clock(),
            coin_types: CoinTypes::default(),
        }
    }
}

impl ProtocolConfig {
    /// Objects the price bundler needs.
    pub fn oracle_objects(&self) -> OracleObjects {
        OracleObjects {
            oracle_package: self.oracle_package.clone(),
            rule_package: self.rule_package.clone(),
            x_oracle: self.x_oracle.clone(),
            clock: self.clock.clone(),
        }
    }
}

/// Move type tags of every token the bot touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinTypes {
    #[serde(default = "default_sui_type")]
    pub sui: String,
    #[serde(default = "default_usdc_type")]
    pub usdc: String,
    #[serde(default = "default_gusd_type")]
    pub gusd: String,
    #[serde(default = "default_xaum_type")]
    pub xaum: String,
    /// Staking reward token
    #[serde(default = "default_gr_type")]
    pub gr: String,
    /// Staking yield token
    #[serde(default = "default_gy_type")]
    pub gy: String,
}

fn default_sui_type() -> String {
    "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI".to_string()
}
fn default_usdc_type() -> String {
    format!("{}::usdc::USDC", FAUCET_PACKAGE)
}
fn default_gusd_type() -> String {
    "0x5434351f2dcae30c0c4b97420475c5edc966b02fd7d0bbe19ea2220d2f623586::coin_gusd::COIN_GUSD"
        .to_string()
}
fn default_xaum_type() -> String {
    format!("{}::coin_xaum::COIN_XAUM", FAUCET_PACKAGE)
}
fn default_gr_type() -> String {
    "0x5504354cf3dcbaf64201989bc734e97c1d89bba5c7f01ff2704c43192cc2717c::coin_gr::COIN_GR"
        .to_string()
}
fn default_gy_type() -> String {
    "0x0ac2d5ebd2834c0db725eedcc562c60fa8e281b1772493a4d199fd1e70065671::coin_gy::COIN_GY"
        .to_string()
}

impl Default for CoinTypes {
    fn default() -> Self {
        Self {
            sui: default_sui_type(),
            usdc: default_usdc_type(),
            gusd: default_gusd_type(),
            xaum: default_xaum_type(),
            gr: default_gr_type(),
            gy: default_gy_type(),
        }
    }
}
