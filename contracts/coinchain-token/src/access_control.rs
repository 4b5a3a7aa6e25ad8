//! Role membership with per-role member counts.

use soroban_sdk::{Address, Env};

use crate::types::{DataKey, Role, RoleKey, BALANCE_BUMP_AMOUNT, BALANCE_LIFETIME_THRESHOLD};

fn member_key(role: Role, account: &Address) -> DataKey {
    DataKey::RoleMember(RoleKey {
        role,
        account: account.clone(),
    })
}

pub fn has_role(env: &Env, account: &Address, role: Role) -> bool {
    let key = member_key(role, account);
    env.storage().persistent().get(&key).unwrap_or(false)
}

pub fn role_member_count(env: &Env, role: Role) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::RoleCount(role))
        .unwrap_or(0)
}

/// Adds `account` to `role`. Returns false if it already held the role.
pub fn grant_role(env: &Env, account: &Address, role: Role) -> bool {
    if has_role(env, account, role) {
        return false;
    }

    let key = member_key(role, account);
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
    env.storage()
        .instance()
        .set(&DataKey::RoleCount(role), &(role_member_count(env, role) + 1));
    true
}

/// Removes `account` from `role`. Returns false if it did not hold the role.
pub fn revoke_role(env: &Env, account: &Address, role: Role) -> bool {
    if !has_role(env, account, role) {
        return false;
    }

    env.storage().persistent().remove(&member_key(role, account));
    env.storage()
        .instance()
        .set(&DataKey::RoleCount(role), &(role_member_count(env, role) - 1));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoinchainToken;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn test_grant_and_revoke_track_member_count() {
        let env = Env::default();
        let contract_id = env.register(CoinchainToken, ());
        let alice = Address::generate(&env);
        let bob = Address::generate(&env);

        env.as_contract(&contract_id, || {
            assert_eq!(role_member_count(&env, Role::Minter), 0);
            assert!(grant_role(&env, &alice, Role::Minter));
            assert!(!grant_role(&env, &alice, Role::Minter));
            assert!(grant_role(&env, &bob, Role::Minter));
            assert_eq!(role_member_count(&env, Role::Minter), 2);
            assert!(has_role(&env, &alice, Role::Minter));
            assert!(!has_role(&env, &alice, Role::Operator));

            assert!(revoke_role(&env, &alice, Role::Minter));
            assert!(!revoke_role(&env, &alice, Role::Minter));
            assert_eq!(role_member_count(&env, Role::Minter), 1);
            assert!(!has_role(&env, &alice, Role::Minter));
        });
    }
}
