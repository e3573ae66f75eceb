use std::path::Path;

use anyhow::Context;
use rust_xlsxwriter::Workbook;
use serde::Serialize;

use crate::compare::{consumption_comparison, ConsumptionDelta};
use crate::ports::port_label;
use crate::store::Network;

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Restrict rows to VLANs whose name classifies to this port label.
    pub port: Option<String>,
    /// Restrict rows to VLANs that have reported down on at least one day.
    pub down_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageCell {
    pub megabytes: u32,
    pub down: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<ConsumptionDelta>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageRow {
    pub number: u32,
    pub name: String,
    pub port: String,
    /// One entry per table date; `None` where the VLAN has no reading.
    pub cells: Vec<Option<UsageCell>>,
    pub total_gb: f64,
}

/// Row-per-VLAN, column-per-date projection of a network, plus totals.
/// Pure presentation over the store; carries no extra invariants.
#[derive(Debug, Clone, Serialize)]
pub struct UsageTable {
    pub network: String,
    /// Descending; the most recent date comes first.
    pub dates: Vec<String>,
    pub rows: Vec<UsageRow>,
    pub daily_totals_gb: Vec<f64>,
    pub grand_total_gb: f64,
}

pub fn usage_table(network: &Network, opts: &TableOptions) -> UsageTable {
    let mut dates = network.dates.clone();
    dates.sort_by(|a, b| b.cmp(a));

    let rows: Vec<UsageRow> = network
        .vlans
        .values()
        .filter(|vlan| match &opts.port {
            Some(port) => port_label(&vlan.name) == *port,
            None => true,
        })
        .filter(|vlan| !opts.down_only || vlan.days.values().any(|day| day.status.is_down()))
        .map(|vlan| {
            let cells: Vec<Option<UsageCell>> = dates
                .iter()
                .map(|date| {
                    vlan.days.get(date).map(|day| UsageCell {
                        megabytes: day.megabytes,
                        down: day.status.is_down(),
                        change: consumption_comparison(vlan, date, &network.dates),
                    })
                })
                .collect();
            let total_mb: u64 = vlan.days.values().map(|day| u64::from(day.megabytes)).sum();
            UsageRow {
                number: vlan.number,
                name: vlan.name.clone(),
                port: port_label(&vlan.name),
                cells,
                total_gb: to_gb(total_mb),
            }
        })
        .collect();

    let daily_totals_gb: Vec<f64> = dates
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let mb: u64 = rows
                .iter()
                .filter_map(|row| row.cells[i].as_ref())
                .map(|cell| u64::from(cell.megabytes))
                .sum();
            to_gb(mb)
        })
        .collect();
    let grand_total_mb: u64 = rows
        .iter()
        .flat_map(|row| row.cells.iter().flatten())
        .map(|cell| u64::from(cell.megabytes))
        .sum();

    UsageTable {
        network: network.name.clone(),
        dates,
        rows,
        daily_totals_gb,
        grand_total_gb: to_gb(grand_total_mb),
    }
}

impl UsageTable {
    pub fn to_markdown(&self) -> String {
        let mut s = String::new();

        s.push_str("| # | VLAN | Name | Port |");
        for date in &self.dates {
            s.push_str(&format!(" {date} |"));
        }
        s.push_str(" Total (GB) |\n");

        s.push_str("|---|---|---|---|");
        for _ in &self.dates {
            s.push_str("---|");
        }
        s.push_str("---|\n");

        for (i, row) in self.rows.iter().enumerate() {
            s.push_str(&format!(
                "| {} | V{} | {} | {} |",
                i + 1,
                row.number,
                row.name,
                row.port
            ));
            for cell in &row.cells {
                match cell {
                    Some(cell) if cell.down => s.push_str(&format!(" {} ❌ |", cell.megabytes)),
                    Some(cell) => s.push_str(&format!(" {} |", cell.megabytes)),
                    None => s.push_str(" - |"),
                }
            }
            s.push_str(&format!(" {:.2} |\n", row.total_gb));
        }

        s.push_str("| | | Daily total (GB) | |");
        for total in &self.daily_totals_gb {
            s.push_str(&format!(" {total:.2} |"));
        }
        s.push_str(&format!(" {:.2} |\n", self.grand_total_gb));

        s
    }
}

/// Spreadsheet projection of the same table: a header row, one row per VLAN,
/// and a totals row.
pub fn write_xlsx(table: &UsageTable, path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let mut col: u16 = 0;
    for header in ["#", "VLAN", "Name", "Port"] {
        worksheet
            .write_string(0, col, header)
            .context("write header")?;
        col += 1;
    }
    for date in &table.dates {
        worksheet
            .write_string(0, col, date)
            .context("write date header")?;
        col += 1;
    }
    worksheet
        .write_string(0, col, "Total (GB)")
        .context("write header")?;

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_number(r, 0, (i + 1) as f64).context("write row index")?;
        worksheet
            .write_string(r, 1, format!("V{}", row.number))
            .context("write vlan number")?;
        worksheet.write_string(r, 2, &row.name).context("write name")?;
        worksheet.write_string(r, 3, &row.port).context("write port")?;
        for (j, cell) in row.cells.iter().enumerate() {
            let c = 4 + j as u16;
            match cell {
                Some(cell) => worksheet
                    .write_number(r, c, f64::from(cell.megabytes))
                    .context("write reading")?,
                None => worksheet.write_string(r, c, "-").context("write empty cell")?,
            };
        }
        worksheet
            .write_number(r, 4 + table.dates.len() as u16, row.total_gb)
            .context("write row total")?;
    }

    let totals_row = (table.rows.len() + 1) as u32;
    worksheet
        .write_string(totals_row, 2, "Daily total (GB)")
        .context("write totals label")?;
    for (j, total) in table.daily_totals_gb.iter().enumerate() {
        worksheet
            .write_number(totals_row, 4 + j as u16, *total)
            .context("write daily total")?;
    }
    worksheet
        .write_number(totals_row, 4 + table.dates.len() as u16, table.grand_total_gb)
        .context("write grand total")?;

    workbook
        .save(path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn to_gb(megabytes: u64) -> f64 {
    (megabytes as f64 / 1024.0 * 100.0).round() / 100.0
}
