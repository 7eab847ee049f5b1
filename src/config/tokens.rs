use alloy::primitives::{address, Address, U256};

pub const USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const USDBC: Address = address!("d9aAEc86B65D86f6A7B5B1b0c42FFA531710b6CA");
pub const WETH: Address = address!("4200000000000000000000000000000000000006");
pub const AAVE_WETH: Address = address!("D4a0e0b9149BCee3C920d2E00b5dE09138fd8bb7");
pub const AAVE_USDC: Address = address!("4e65fE4DbA92790696d040ac24Aa414708F5c0AB");
pub const MOONWELL_WETH: Address = address!("628ff693426583D9a7FB391E54366292F509D457");

/// Tokens the swap venues rotate through.
pub const SWAP_TOKENS: &[Address] = &[WETH, USDC, USDBC];

/// Native-token floor below which an account needs a refuel before it can
/// keep paying gas on Base.
pub const MIN_GAS_WEI: u128 = 1_000_000_000_000_000;

pub fn decimals(token: Address) -> u8 {
    match token {
        t if t == USDC || t == USDBC || t == AAVE_USDC => 6,
        _ => 18,
    }
}

/// Static reference prices; only relative ordering matters for the
/// highest-balance selection, so a coarse quote is enough.
pub fn usd_price(token: Address) -> f64 {
    match token {
        t if t == WETH || t == AAVE_WETH || t == MOONWELL_WETH => 3_500.0,
        t if t == USDC || t == USDBC || t == AAVE_USDC => 1.0,
        _ => 0.0,
    }
}

/// Balance scaled into USD terms: balance * price / 10^decimals.
pub fn normalized_usd(balance: U256, token: Address) -> f64 {
    let raw = u128::try_from(balance).unwrap_or(u128::MAX) as f64;
    raw * usd_price(token) / 10f64.powi(i32::from(decimals(token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_usd_respects_decimals() {
        // 1 WETH at 18 decimals vs 1 USDC at 6 decimals.
        let one_eth = U256::from(10u128.pow(18));
        let one_usdc = U256::from(10u128.pow(6));
        assert_eq!(normalized_usd(one_eth, WETH), 3_500.0);
        assert_eq!(normalized_usd(one_usdc, USDC), 1.0);
    }

    #[test]
    fn test_unknown_token_has_zero_value() {
        let token = Address::ZERO;
        assert_eq!(normalized_usd(U256::from(12345u64), token), 0.0);
    }
}
