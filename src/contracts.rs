//! Raiden contract names, deployment constants and call interfaces.

use alloy::sol;

pub const CONTRACT_ENDPOINT_REGISTRY: &str = "EndpointRegistry";
pub const CONTRACT_SECRET_REGISTRY: &str = "SecretRegistry";
pub const CONTRACT_TOKEN_NETWORK_REGISTRY: &str = "TokenNetworkRegistry";
pub const CONTRACT_CUSTOM_TOKEN: &str = "CustomToken";

/// Key under which the per-token network address is reported.
pub const CONTRACT_TOKEN_NETWORK: &str = "TokenNetwork";

/// Settle timeout bounds in blocks (~2 hours and ~3 months).
pub const DEPLOY_SETTLE_TIMEOUT_MIN: u64 = 500;
pub const DEPLOY_SETTLE_TIMEOUT_MAX: u64 = 555_428;

sol! {
    /// Functions of the TokenNetworkRegistry used after deployment.
    #[derive(Debug)]
    interface TokenNetworkRegistry {
        function createERC20TokenNetwork(address _token_address) external returns (address token_network_address);

        function token_to_token_networks(address token) external view returns (address);
    }
}
