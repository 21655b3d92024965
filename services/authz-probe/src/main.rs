//! authz-probe 入口
//!
//! 加载配置与场景，为每个调用方打印一份权限探测报告

use authz_probe::{Probe, Scenario};
use fsrbac_auth_core::{PrincipalResolver, TokenService};
use fsrbac_authz::Principal;
use fsrbac_bootstrap::{RuntimeConfig, build_engine, build_token_service, init_runtime};
use fsrbac_errors::AppResult;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = RuntimeConfig::default().load()?;
    let metrics = init_runtime(&config)?;

    let engine = build_engine(&config)?;
    let scenario = Scenario::from_path(&config.probe.scenario_path)?;
    info!(
        permissions = engine.permissions().len(),
        principals = scenario.principals.len(),
        resources = scenario.resources.len(),
        "Probe starting"
    );

    let principals = match build_token_service(&config) {
        Some(tokens) => resolve_via_tokens(&scenario, &tokens)?,
        None => scenario.principals.clone(),
    };

    let probe = Probe::new(&engine, &scenario);
    for report in probe.run_all(&principals) {
        println!("{}", report);
    }

    if let Some(handle) = metrics {
        println!("\n{}", handle.render());
    }

    Ok(())
}

fn resolve_via_tokens(scenario: &Scenario, tokens: &TokenService) -> AppResult<Vec<Principal>> {
    let resolver: &dyn PrincipalResolver = tokens;
    scenario.resolve_principals(resolver, |principal| {
        tokens.generate_access_token(
            &principal.name,
            principal.roles.iter().cloned().collect(),
            principal.groups.iter().cloned().collect(),
        )
    })
}
