use super::pools::display_failures;
use super::ui;
use crate::core::format::format_usd;
use crate::core::pipeline::Pipeline;
use crate::core::pool::PoolRecord;
use anyhow::{Result, bail};
use comfy_table::Cell;

/// Renders the account's positions with a total at the bottom.
pub fn display_positions(account: &str, pools: &[&PoolRecord]) -> String {
    let mut output = format!(
        "Account: {}\n\n",
        ui::style_text(account, ui::StyleType::Title)
    );

    if pools.is_empty() {
        output.push_str("No liquidity positions found.");
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pool"),
        ui::header_cell("Balance"),
        ui::header_cell("Total APR"),
        ui::header_cell("Rewards"),
        ui::header_cell("Link"),
    ]);

    for pool in pools {
        let link = if pool.can_claim {
            &pool.claim_link
        } else {
            &pool.deposit_link
        };
        table.add_row(vec![
            Cell::new(&pool.display_name),
            ui::highlight_cell(&pool.user_balance_formatted),
            ui::value_cell(&pool.total_apr_formatted),
            ui::claim_cell(pool.can_claim),
            Cell::new(link),
        ]);
    }
    output.push_str(&table.to_string());

    let total: f64 = pools.iter().map(|p| p.user_balance_raw).sum();
    output.push_str(&format!("\n\nTotal: {}", format_usd(total)));
    output
}

pub async fn run(pipeline: &mut Pipeline) -> Result<()> {
    let Some(account) = pipeline.account().map(str::to_string) else {
        bail!("No account given, pass --account or set `account` in the config");
    };

    let pb = ui::new_spinner("Fetching positions...");
    let report = pipeline.start().await;
    pb.finish_and_clear();

    println!("{}", display_positions(&account, &pipeline.user_pools()));

    let failures = display_failures(&report);
    if !failures.is_empty() {
        ui::print_separator();
        print!("{failures}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pool::{ChainModel, TokenModel};

    fn position(symbol: &str, balance: f64, can_claim: bool) -> PoolRecord {
        let mut record = PoolRecord::new(
            TokenModel {
                symbol: symbol.to_string(),
                decimals: 18,
                image_url: String::new(),
            },
            ChainModel {
                slug: "gnosis".to_string(),
                name: "Gnosis".to_string(),
            },
        );
        record.user_balance_raw = balance;
        record.user_balance_formatted = format_usd(balance);
        record.can_claim = can_claim;
        record
    }

    #[test]
    fn test_display_positions() {
        let dai = position("DAI", 1500.5, true);
        let eth = position("ETH", 20.0, false);

        let output = display_positions("0xabc", &[&dai, &eth]);
        assert!(output.contains("DAI Gnosis Pool"));
        assert!(output.contains("$1,500.5"));
        assert!(output.contains("/stake?token=DAI&sourceNetwork=gnosis"));
        assert!(output.contains("/pool/deposit?token=ETH&sourceNetwork=gnosis"));
        assert!(output.contains("Total: $1,520.5"));
    }

    #[test]
    fn test_display_no_positions() {
        let output = display_positions("0xabc", &[]);
        assert!(output.contains("No liquidity positions found."));
    }
}
