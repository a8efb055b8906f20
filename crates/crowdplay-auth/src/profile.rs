//! The viewer's account profile.

use serde::{Deserialize, Serialize};

/// Wallet and account details attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    /// Platform-side account identifier, when one is linked.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Spendable balance, in the platform's own currency units.
    #[serde(default)]
    pub balance: Option<f64>,
}

/// A user profile as served by `GET /user/profile`.
///
/// Refreshed on demand and overwritten wholesale — there is no partial
/// merge, so a field absent from the newest response is absent from the
/// cache too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable platform identifier.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Public display name.
    pub username: String,
    /// Whether the email has been verified.
    #[serde(default)]
    pub verified: bool,
    /// Which auth methods the account has enabled (`password`, `otp`, …).
    #[serde(default)]
    pub auth_methods: Vec<String>,
    /// Wallet/account info, when present.
    #[serde(default)]
    pub wallet: Option<WalletInfo>,
}
