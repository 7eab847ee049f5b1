use crate::account::Account;
use crate::actions::ActionKind;
use crate::config::settings::ModulesConfig;

/// Kinds eligible for one wallet under the current module switches. A module
/// with several sub-kinds enables them all together; an empty result is valid
/// and left to the caller to reject. Declaration order is fixed so uniform
/// draws are reproducible under a seeded generator.
pub fn resolve_capabilities(modules: &ModulesConfig, account: &Account) -> Vec<ActionKind> {
    let mut kinds = Vec::new();
    if modules.uniswap {
        kinds.push(ActionKind::Uniswap);
    }
    if modules.pancake {
        kinds.push(ActionKind::Pancake);
    }
    if modules.woofi {
        kinds.push(ActionKind::Woofi);
    }
    if modules.openocean {
        kinds.push(ActionKind::OpenOcean);
    }
    if modules.odos {
        kinds.push(ActionKind::Odos);
    }
    if modules.refuel {
        kinds.push(ActionKind::Refuel);
    }
    if modules.zora {
        kinds.push(ActionKind::Zora);
    }
    if modules.nft2me {
        kinds.push(ActionKind::Nft2Me);
    }
    // Name registration needs a configured target in addition to the flag.
    if modules.basenames && !account.base_name.is_empty() {
        kinds.push(ActionKind::BaseName);
    }
    if modules.stargate {
        kinds.push(ActionKind::Stargate);
    }
    if modules.dmail {
        kinds.push(ActionKind::Dmail);
    }
    if modules.aave {
        kinds.push(ActionKind::AaveEthDeposit);
        kinds.push(ActionKind::AaveEthWithdraw);
        kinds.push(ActionKind::AaveUsdcSupply);
        kinds.push(ActionKind::AaveUsdcWithdraw);
    }
    if modules.moonwell {
        kinds.push(ActionKind::MoonwellDeposit);
        kinds.push(ActionKind::MoonwellWithdraw);
    }
    if modules.collector {
        kinds.push(ActionKind::Collector);
    }
    kinds
}
