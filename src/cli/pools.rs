use super::ui;
use crate::core::pipeline::{Pipeline, RunReport};
use crate::core::pool::PoolRecord;
use crate::core::view::{FilterChain, FilterToken, SortColumn};
use anyhow::Result;
use comfy_table::Cell;
use tracing::warn;

/// Options of the `pools` command.
#[derive(Debug, Default, Clone)]
pub struct PoolsOptions {
    pub hide_tokens: Vec<String>,
    pub hide_chains: Vec<String>,
    /// Each entry is applied as a column header click.
    pub sort: Vec<SortColumn>,
}

/// Renders the pools table. The claim column only appears when an account
/// is active.
pub fn display_pools_table(pools: &[&PoolRecord], with_account: bool) -> String {
    let mut table = ui::new_styled_table();

    let mut header = vec![
        ui::header_cell("Pool"),
        ui::header_cell("TVL"),
        ui::header_cell("APR"),
        ui::header_cell("Staking APR"),
        ui::header_cell("Total APR"),
    ];
    if with_account {
        header.push(ui::header_cell("Your Balance"));
        header.push(ui::header_cell("Rewards"));
    }
    table.set_header(header);

    for pool in pools {
        let mut row = vec![
            Cell::new(format!("{}\n{}", pool.display_name, pool.display_subtitle)),
            ui::value_cell(&pool.tvl_formatted),
            ui::value_cell(&pool.apr_formatted),
            ui::value_cell(&pool.staking_apr_formatted),
            ui::highlight_cell(&pool.total_apr_formatted),
        ];
        if with_account {
            row.push(ui::value_cell(&pool.user_balance_formatted));
            row.push(ui::claim_cell(pool.can_claim));
        }
        table.add_row(row);
    }

    table.to_string()
}

fn filter_line<'a>(label: &str, entries: impl Iterator<Item = (&'a str, bool)>) -> String {
    let entries: Vec<String> = entries
        .map(|(name, enabled)| {
            if enabled {
                name.to_string()
            } else {
                ui::style_text(name, ui::StyleType::Subtle)
            }
        })
        .collect();
    format!("{label}: {}", entries.join(", "))
}

/// Lists the token and chain filters, dimming the disabled ones.
pub fn display_filters(tokens: &[FilterToken], chains: &[FilterChain]) -> String {
    let tokens = filter_line(
        "Tokens",
        tokens.iter().map(|f| (f.token.symbol.as_str(), f.enabled)),
    );
    let chains = filter_line(
        "Chains",
        chains.iter().map(|f| (f.chain.name.as_str(), f.enabled)),
    );
    format!("{tokens}\n{chains}")
}

/// Formats stage failures for display below a table. Empty if none.
pub fn display_failures(report: &RunReport) -> String {
    let mut output = String::new();
    for (stage, error) in &report.stage_failures {
        output.push_str(&ui::style_text(
            &format!("Could not load {stage} data: {error}"),
            ui::StyleType::Error,
        ));
        output.push('\n');
    }
    if report.failed > 0 {
        output.push_str(&ui::style_text(
            &format!("{} pool lookups failed, run with --verbose for details", report.failed),
            ui::StyleType::Subtle,
        ));
        output.push('\n');
    }
    output
}

/// Applies hide filters and sort clicks to a started pipeline.
pub fn apply_options(pipeline: &mut Pipeline, options: &PoolsOptions) {
    for symbol in &options.hide_tokens {
        let enabled = pipeline
            .filter_tokens()
            .iter()
            .any(|f| &f.token.symbol == symbol && f.enabled);
        if enabled {
            pipeline.toggle_filter_token(symbol);
        } else if !pipeline.filter_tokens().iter().any(|f| &f.token.symbol == symbol) {
            warn!("No pools for token {}, nothing to hide", symbol);
        }
    }

    for slug in &options.hide_chains {
        let enabled = pipeline
            .filter_chains()
            .iter()
            .any(|f| &f.chain.slug == slug && f.enabled);
        if enabled {
            pipeline.toggle_filter_chain(slug);
        } else if !pipeline.filter_chains().iter().any(|f| &f.chain.slug == slug) {
            warn!("No pools on chain {}, nothing to hide", slug);
        }
    }

    for column in &options.sort {
        pipeline.toggle_column_sort(*column);
    }
}

pub async fn run(pipeline: &mut Pipeline, options: &PoolsOptions) -> Result<()> {
    let pb = ui::new_spinner("Fetching pool data...");
    let report = pipeline.start().await;
    pb.finish_and_clear();

    apply_options(pipeline, options);

    let pools = pipeline.all_pools();
    println!("{}", ui::style_text("Pools", ui::StyleType::Title));
    println!("{}\n", display_filters(pipeline.filter_tokens(), pipeline.filter_chains()));
    if pools.is_empty() {
        println!("No pools to display.");
    } else {
        println!("{}", display_pools_table(&pools, pipeline.account().is_some()));
    }

    let failures = display_failures(&report);
    if !failures.is_empty() {
        ui::print_separator();
        print!("{failures}");
    }
    Ok(())
}
